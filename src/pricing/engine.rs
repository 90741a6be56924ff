//! Pricing formulas per category and order-level aggregation

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::traits::CatalogProvider;
use crate::types::*;
use crate::utils::{clamp_percent, money_from_f64, money_to_f64, percentage_of, round_for_display};

/// Knobs that change how items are priced or displayed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingOptions {
    /// Bill per-unit items for their nominal waste price
    pub per_unit_waste: bool,
    /// Decimals kept when areas are shown in per-line tables
    pub area_display_decimals: u32,
}

impl Default for PricingOptions {
    fn default() -> Self {
        Self {
            per_unit_waste: false,
            area_display_decimals: 2,
        }
    }
}

/// Priced row for one line item, for tables and exports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePricing {
    pub item_id: u64,
    pub category: PricingCategory,
    pub material_name: String,
    pub visible: bool,
    pub print_area: f64,
    pub material_used: f64,
    pub waste: f64,
    pub material_cost: Money,
    pub waste_cost: Money,
    pub service_cost: Money,
    pub line_total: Money,
}

/// Full-precision figures for one item
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct ItemCost {
    print_area: f64,
    material_used: f64,
    waste: f64,
    material_cost: f64,
    waste_cost: f64,
    service_cost: f64,
}

impl ItemCost {
    fn add(&mut self, other: &ItemCost) {
        self.print_area += other.print_area;
        self.material_used += other.material_used;
        self.waste += other.waste;
        self.material_cost += other.material_cost;
        self.waste_cost += other.waste_cost;
        self.service_cost += other.service_cost;
    }
}

/// Pure pricing over line items and a catalog snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct PricingEngine {
    options: PricingOptions,
}

impl PricingEngine {
    pub fn new(options: PricingOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> PricingOptions {
        self.options
    }

    /// Aggregate the cost of all visible items and apply the order discount
    ///
    /// The discount is clamped to [0, 100]. Components are summed in full precision
    /// and rounded to whole currency units once. A cost that is not finite fails with
    /// [`CoreError::Validation`].
    pub fn price(
        &self,
        items: &[LineItem],
        catalog: &dyn CatalogProvider,
        discount_percent: &BigDecimal,
    ) -> CoreResult<CostBreakdown> {
        let mut totals = ItemCost::default();
        for item in items.iter().filter(|item| item.visible) {
            totals.add(&self.cost_item(item, catalog)?);
        }

        let material_cost = money_from_f64(totals.material_cost)?;
        let waste_cost = money_from_f64(totals.waste_cost)?;
        let service_cost = money_from_f64(totals.service_cost)?;
        let total_cost = &material_cost + &waste_cost + &service_cost;

        let discount_percent = clamp_percent(discount_percent);
        let discount_amount = (&total_cost * &discount_percent) / BigDecimal::from(100);
        let final_cost = &total_cost - &discount_amount;

        tracing::debug!(
            items = items.len(),
            total_cost = %total_cost,
            discount_amount = %discount_amount,
            final_cost = %final_cost,
            "Order priced"
        );

        Ok(CostBreakdown {
            total_print_area: totals.print_area,
            total_material_used: totals.material_used,
            total_waste: totals.waste,
            waste_percentage: percentage_of(totals.waste, totals.material_used),
            material_cost,
            waste_cost,
            service_cost,
            total_cost,
            discount_percent,
            discount_amount,
            final_cost,
        })
    }

    /// One row per item, hidden items included, in insertion order
    pub fn price_lines(
        &self,
        items: &[LineItem],
        catalog: &dyn CatalogProvider,
    ) -> CoreResult<Vec<LinePricing>> {
        let decimals = self.options.area_display_decimals;
        items
            .iter()
            .map(|item| {
                let cost = self.cost_item(item, catalog)?;
                let material_cost = money_from_f64(cost.material_cost)?;
                let waste_cost = money_from_f64(cost.waste_cost)?;
                let service_cost = money_from_f64(cost.service_cost)?;
                Ok(LinePricing {
                    item_id: item.id,
                    category: item.category,
                    material_name: item.material_name.clone(),
                    visible: item.visible,
                    print_area: round_for_display(cost.print_area, decimals),
                    material_used: round_for_display(cost.material_used, decimals),
                    waste: round_for_display(cost.waste, decimals),
                    line_total: &material_cost + &waste_cost + &service_cost,
                    material_cost,
                    waste_cost,
                    service_cost,
                })
            })
            .collect()
    }

    fn cost_item(&self, item: &LineItem, catalog: &dyn CatalogProvider) -> CoreResult<ItemCost> {
        let unit_price = money_to_f64(&item.frozen_material_unit_price)?;
        let waste_price = match &item.frozen_waste_unit_price {
            Some(price) => money_to_f64(price)?,
            None => 0.0,
        };
        let quantity = f64::from(item.quantity);

        let mut cost = match item.category {
            PricingCategory::Area => {
                let print_area = item.width * item.height * quantity;
                let material_used = item.frozen_material_width * item.height * quantity;
                let waste = (material_used - print_area).abs();
                ItemCost {
                    print_area,
                    material_used,
                    waste,
                    material_cost: print_area * unit_price,
                    waste_cost: waste * waste_price,
                    service_cost: 0.0,
                }
            }
            PricingCategory::Lightbox => {
                let print_area = item.width * item.height * quantity;
                ItemCost {
                    print_area,
                    material_used: print_area,
                    material_cost: print_area * unit_price,
                    ..ItemCost::default()
                }
            }
            PricingCategory::Linear => ItemCost {
                material_cost: item.height * quantity * unit_price,
                ..ItemCost::default()
            },
            PricingCategory::PerUnit => ItemCost {
                material_cost: quantity * unit_price,
                waste_cost: if self.options.per_unit_waste {
                    quantity * waste_price
                } else {
                    0.0
                },
                ..ItemCost::default()
            },
        };

        for key in item.service_keys() {
            let service = catalog.get_service(key)?;
            let service_price = money_to_f64(&service.unit_price)?;
            cost.service_cost += match service.pricing {
                ServicePricing::Fixed => service_price,
                ServicePricing::PerArea => cost.print_area * service_price,
            };
        }

        Ok(cost)
    }
}

/// Price items with default options
pub fn price(
    items: &[LineItem],
    catalog: &dyn CatalogProvider,
    discount_percent: &BigDecimal,
) -> CoreResult<CostBreakdown> {
    PricingEngine::default().price(items, catalog, discount_percent)
}
