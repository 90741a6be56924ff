//! Line item capture for an order that has not been saved yet

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::pricing::engine::{PricingEngine, PricingOptions};
use crate::traits::CatalogProvider;
use crate::types::*;
use crate::utils::{validate_dimension, validate_quantity};

/// Tolerance when comparing a piece width with its roll width
const WIDTH_TOLERANCE: f64 = 1e-9;

/// User input for one new line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemRequest {
    pub material_key: String,
    pub width: f64,
    pub height: f64,
    pub quantity: u32,
    /// Roll width picked from the material's variants
    pub material_width: Option<f64>,
    pub assembly_service_key: Option<String>,
    pub disassembly_service_key: Option<String>,
}

impl LineItemRequest {
    /// Create a request without width variant or services
    pub fn new(material_key: impl Into<String>, width: f64, height: f64, quantity: u32) -> Self {
        Self {
            material_key: material_key.into(),
            width,
            height,
            quantity,
            material_width: None,
            assembly_service_key: None,
            disassembly_service_key: None,
        }
    }

    /// Request for an item priced per piece
    pub fn per_unit(material_key: impl Into<String>, quantity: u32) -> Self {
        Self::new(material_key, 0.0, 0.0, quantity)
    }

    /// Request for letters priced by height in centimetres
    pub fn linear(material_key: impl Into<String>, height_cm: f64, quantity: u32) -> Self {
        Self::new(material_key, 0.0, height_cm, quantity)
    }

    pub fn material_width(mut self, width: f64) -> Self {
        self.material_width = Some(width);
        self
    }

    pub fn assembly(mut self, service_key: impl Into<String>) -> Self {
        self.assembly_service_key = Some(service_key.into());
        self
    }

    pub fn disassembly(mut self, service_key: impl Into<String>) -> Self {
        self.disassembly_service_key = Some(service_key.into());
        self
    }
}

/// Items being assembled into an order, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    items: Vec<LineItem>,
    next_id: u64,
}

impl OrderDraft {
    /// Create an empty draft
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a request against the catalog and append it as a visible item
    ///
    /// Material prices are copied onto the item here and never looked up again.
    pub fn add_line_item(
        &mut self,
        catalog: &dyn CatalogProvider,
        request: LineItemRequest,
    ) -> CoreResult<u64> {
        let material = catalog.get_material(&request.material_key)?;
        let category = material.category;

        validate_quantity(request.quantity)?;
        if category.requires_area() {
            validate_dimension(request.width, "Width")?;
        }
        if category.requires_height() {
            validate_dimension(request.height, "Height")?;
        }

        let frozen_material_width = match category {
            PricingCategory::Area => resolve_material_width(material, &request)?,
            PricingCategory::Lightbox | PricingCategory::Linear | PricingCategory::PerUnit => 0.0,
        };

        for key in [
            request.assembly_service_key.as_deref(),
            request.disassembly_service_key.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|key| !is_no_service(key))
        {
            catalog.get_service(key)?;
        }

        self.next_id += 1;
        let item = LineItem {
            id: self.next_id,
            category,
            material_name: material.display_name.clone(),
            width: request.width,
            height: request.height,
            quantity: request.quantity,
            visible: true,
            frozen_material_unit_price: material.unit_price.clone(),
            frozen_material_width,
            frozen_waste_unit_price: material.waste_unit_price.clone(),
            assembly_service_key: request.assembly_service_key,
            disassembly_service_key: request.disassembly_service_key,
        };

        tracing::debug!(
            item_id = item.id,
            material = %request.material_key,
            category = ?category,
            "Line item added"
        );

        self.items.push(item);
        Ok(self.next_id)
    }

    /// Flip an item's visibility and return the new flag
    pub fn toggle_visibility(&mut self, item_id: u64) -> CoreResult<bool> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| CoreError::Reference(format!("line item {}", item_id)))?;
        item.visible = !item.visible;
        Ok(item.visible)
    }

    /// Remove an item, keeping the order of the others
    pub fn remove_line_item(&mut self, item_id: u64) -> CoreResult<LineItem> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == item_id)
            .ok_or_else(|| CoreError::Reference(format!("line item {}", item_id)))?;
        Ok(self.items.remove(index))
    }

    pub fn get(&self, item_id: u64) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    /// All items, visible or not, in insertion order
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn visible_items(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter().filter(|item| item.visible)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Discard every item
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Price the current items
    pub fn price(
        &self,
        catalog: &dyn CatalogProvider,
        discount_percent: &BigDecimal,
        options: PricingOptions,
    ) -> CoreResult<CostBreakdown> {
        PricingEngine::new(options).price(&self.items, catalog, discount_percent)
    }
}

fn resolve_material_width(material: &Material, request: &LineItemRequest) -> CoreResult<f64> {
    if !material.is_width_constrained() {
        return Ok(request.material_width.unwrap_or(request.width).max(request.width));
    }

    let selected = request.material_width.ok_or_else(|| {
        CoreError::Validation(format!(
            "Material '{}' requires one of the widths {:?}",
            material.key, material.width_variants
        ))
    })?;
    let variant = material.width_variant(selected).ok_or_else(|| {
        CoreError::Validation(format!(
            "Width {} is not offered for material '{}'",
            selected, material.key
        ))
    })?;

    if request.width > variant + WIDTH_TOLERANCE {
        return Err(CoreError::Validation(format!(
            "Width {} exceeds the selected material width {}",
            request.width, variant
        )));
    }
    Ok(variant)
}
