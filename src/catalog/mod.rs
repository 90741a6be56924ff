//! Versioned catalog snapshots of materials and services

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::traits::CatalogProvider;
use crate::types::*;
use crate::utils::{validate_dimension, validate_non_negative_amount};

/// Immutable snapshot of the catalog at a given version
///
/// Revising a price produces a new snapshot; drafts and orders priced against an
/// older snapshot keep the values they copied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    version: u64,
    materials: BTreeMap<String, Material>,
    services: BTreeMap<String, Service>,
}

impl Catalog {
    /// Start building a catalog snapshot
    pub fn builder(version: u64) -> CatalogBuilder {
        CatalogBuilder {
            version,
            materials: Vec::new(),
            services: Vec::new(),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// New snapshot, one version later, with a material's unit price replaced
    pub fn with_material_price(&self, key: &str, unit_price: Money) -> CoreResult<Catalog> {
        validate_non_negative_amount(&unit_price, "Material unit price")?;
        let mut next = self.clone();
        let material = next
            .materials
            .get_mut(key)
            .ok_or_else(|| CoreError::Reference(format!("material '{}'", key)))?;
        material.unit_price = unit_price;
        next.version += 1;

        tracing::info!(material = key, version = next.version, "Catalog revised");
        Ok(next)
    }

    /// New snapshot, one version later, with a service's unit price replaced
    pub fn with_service_price(&self, key: &str, unit_price: Money) -> CoreResult<Catalog> {
        validate_non_negative_amount(&unit_price, "Service unit price")?;
        let mut next = self.clone();
        let service = next
            .services
            .get_mut(key)
            .ok_or_else(|| CoreError::Reference(format!("service '{}'", key)))?;
        service.unit_price = unit_price;
        next.version += 1;

        tracing::info!(service = key, version = next.version, "Catalog revised");
        Ok(next)
    }
}

impl CatalogProvider for Catalog {
    fn get_material(&self, key: &str) -> CoreResult<&Material> {
        self.materials
            .get(key)
            .ok_or_else(|| CoreError::Reference(format!("material '{}'", key)))
    }

    fn get_service(&self, key: &str) -> CoreResult<&Service> {
        self.services
            .get(key)
            .ok_or_else(|| CoreError::Reference(format!("service '{}'", key)))
    }

    fn list_materials(&self) -> Vec<&Material> {
        self.materials.values().collect()
    }

    fn list_services(&self) -> Vec<&Service> {
        self.services.values().collect()
    }
}

/// Builder validating definitions before they become a snapshot
#[derive(Debug)]
pub struct CatalogBuilder {
    version: u64,
    materials: Vec<Material>,
    services: Vec<Service>,
}

impl CatalogBuilder {
    /// Add a material definition
    pub fn material(mut self, material: Material) -> Self {
        self.materials.push(material);
        self
    }

    /// Add a service definition
    pub fn service(mut self, service: Service) -> Self {
        self.services.push(service);
        self
    }

    /// Validate every definition and build the snapshot
    pub fn build(self) -> CoreResult<Catalog> {
        let mut materials = BTreeMap::new();
        for material in self.materials {
            validate_material(&material)?;
            if materials.contains_key(&material.key) {
                return Err(CoreError::Validation(format!(
                    "Material '{}' is defined twice",
                    material.key
                )));
            }
            materials.insert(material.key.clone(), material);
        }

        let mut services = BTreeMap::new();
        for service in self.services {
            if service.key.trim().is_empty() || is_no_service(&service.key) {
                return Err(CoreError::Validation(format!(
                    "'{}' is not a usable service key",
                    service.key
                )));
            }
            validate_non_negative_amount(&service.unit_price, "Service unit price")?;
            if services.contains_key(&service.key) {
                return Err(CoreError::Validation(format!(
                    "Service '{}' is defined twice",
                    service.key
                )));
            }
            services.insert(service.key.clone(), service);
        }

        tracing::debug!(
            version = self.version,
            materials = materials.len(),
            services = services.len(),
            "Catalog snapshot built"
        );

        Ok(Catalog {
            version: self.version,
            materials,
            services,
        })
    }
}

fn validate_material(material: &Material) -> CoreResult<()> {
    if material.key.trim().is_empty() {
        return Err(CoreError::Validation(
            "Material key cannot be empty".to_string(),
        ));
    }
    validate_non_negative_amount(&material.unit_price, "Material unit price")?;
    if let Some(waste) = &material.waste_unit_price {
        validate_non_negative_amount(waste, "Waste unit price")?;
    }
    for width in &material.width_variants {
        validate_dimension(*width, "Width variant")?;
    }
    if material.is_width_constrained() && material.category != PricingCategory::Area {
        return Err(CoreError::Validation(format!(
            "Material '{}' has width variants but is not priced by area",
            material.key
        )));
    }
    Ok(())
}

/// Small catalog covering every pricing category, for demos and tests
pub fn sample_catalog() -> CoreResult<Catalog> {
    Catalog::builder(1)
        .material(
            Material::new(
                "banner",
                "Banner",
                BigDecimal::from(55000),
                PricingCategory::Area,
            )
            .with_width_variants(vec![1.0, 1.6, 2.2, 3.2])
            .with_waste_unit_price(BigDecimal::from(20000)),
        )
        .material(Material::new(
            "lightbox",
            "Fabric light box",
            BigDecimal::from(1_200_000),
            PricingCategory::Lightbox,
        ))
        .material(Material::new(
            "letters",
            "Channel letters",
            BigDecimal::from(9000),
            PricingCategory::Linear,
        ))
        .material(
            Material::new(
                "badge",
                "Badge",
                BigDecimal::from(35000),
                PricingCategory::PerUnit,
            )
            .with_waste_unit_price(BigDecimal::from(1000)),
        )
        .service(Service::new(
            "installation",
            "Installation",
            BigDecimal::from(150000),
            ServicePricing::Fixed,
        ))
        .service(Service::new(
            "removal",
            "Removal",
            BigDecimal::from(10000),
            ServicePricing::PerArea,
        ))
        .build()
}
