//! Core types and data structures for pricing and payment reconciliation

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Monetary amount in whole currency units
pub type Money = BigDecimal;

/// Formula family a line item is priced under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingCategory {
    /// Banners, vinyl, canvas: priced by printed area, billed for material waste
    Area,
    /// Light boxes and fabric boxes: priced by area, no waste concept
    Lightbox,
    /// Letters priced by height in centimetres
    Linear,
    /// Badges, statues, bolts: priced per piece
    PerUnit,
}

impl PricingCategory {
    /// Whether items of this category need a width and a height
    pub fn requires_area(&self) -> bool {
        matches!(self, PricingCategory::Area | PricingCategory::Lightbox)
    }

    /// Whether items of this category need a height
    pub fn requires_height(&self) -> bool {
        !matches!(self, PricingCategory::PerUnit)
    }
}

/// How a service surcharge is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServicePricing {
    /// Flat amount per line item
    Fixed,
    /// Unit price multiplied by the item's print area
    PerArea,
}

/// Material definition from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub key: String,
    pub display_name: String,
    /// Price per m² (area, light-box), per cm of height (linear) or per piece
    pub unit_price: Money,
    /// Declared pricing category, copied onto every line item using this material
    pub category: PricingCategory,
    /// Roll widths this material is sold in; empty when unconstrained
    #[serde(default)]
    pub width_variants: Vec<f64>,
    pub waste_unit_price: Option<Money>,
}

impl Material {
    /// Create a new material without width variants or waste pricing
    pub fn new(
        key: impl Into<String>,
        display_name: impl Into<String>,
        unit_price: Money,
        category: PricingCategory,
    ) -> Self {
        Self {
            key: key.into(),
            display_name: display_name.into(),
            unit_price,
            category,
            width_variants: Vec::new(),
            waste_unit_price: None,
        }
    }

    /// Restrict the material to the given roll widths
    pub fn with_width_variants(mut self, widths: Vec<f64>) -> Self {
        self.width_variants = widths;
        self
    }

    /// Set the price billed per unit of wasted material
    pub fn with_waste_unit_price(mut self, price: Money) -> Self {
        self.waste_unit_price = Some(price);
        self
    }

    /// Whether line items must pick one of the listed widths
    pub fn is_width_constrained(&self) -> bool {
        !self.width_variants.is_empty()
    }

    /// Find the listed variant matching `width`, tolerating float noise from user input
    pub fn width_variant(&self, width: f64) -> Option<f64> {
        self.width_variants
            .iter()
            .copied()
            .find(|variant| (variant - width).abs() < 1e-9)
    }
}

/// Service definition from the catalog (assembly, disassembly, installation...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub key: String,
    pub display_name: String,
    pub unit_price: Money,
    pub pricing: ServicePricing,
}

impl Service {
    /// Create a new service
    pub fn new(
        key: impl Into<String>,
        display_name: impl Into<String>,
        unit_price: Money,
        pricing: ServicePricing,
    ) -> Self {
        Self {
            key: key.into(),
            display_name: display_name.into(),
            unit_price,
            pricing,
        }
    }
}

/// One priced unit within a draft order
///
/// Material prices are value copies taken when the item was added. Items never point
/// back into the catalog, so later catalog revisions cannot reprice them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: u64,
    pub category: PricingCategory,
    pub material_name: String,
    /// Metres for area and light-box items
    pub width: f64,
    /// Metres for area and light-box items, centimetres for linear items
    pub height: f64,
    pub quantity: u32,
    pub visible: bool,
    pub frozen_material_unit_price: Money,
    /// Roll width consumed per piece of an area item; 0 for every other category
    pub frozen_material_width: f64,
    pub frozen_waste_unit_price: Option<Money>,
    pub assembly_service_key: Option<String>,
    pub disassembly_service_key: Option<String>,
}

impl LineItem {
    /// Service keys attached to this item, skipping the "none" placeholder
    pub fn service_keys(&self) -> impl Iterator<Item = &str> {
        [
            self.assembly_service_key.as_deref(),
            self.disassembly_service_key.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|key| !is_no_service(key))
    }
}

/// Whether a service key is the "no service selected" placeholder
pub fn is_no_service(key: &str) -> bool {
    key.trim().is_empty() || key.eq_ignore_ascii_case("none")
}

/// Aggregated cost of all visible line items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// m²
    pub total_print_area: f64,
    /// m²
    pub total_material_used: f64,
    /// m²
    pub total_waste: f64,
    pub waste_percentage: f64,
    pub material_cost: Money,
    pub waste_cost: Money,
    pub service_cost: Money,
    pub total_cost: Money,
    /// Discount actually applied, after clamping to [0, 100]
    pub discount_percent: BigDecimal,
    pub discount_amount: Money,
    pub final_cost: Money,
}

/// Payment channel used for a ledger entry or an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    DigitalWallet,
    BankTransfer,
}

/// Nature of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Advance,
    Payment,
}

/// Approval state of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Pending,
    Approved,
    Rejected,
}

impl EntryStatus {
    /// Initial status of an order entry recorded by an actor with the given privilege
    pub fn initial_for(privilege: Privilege) -> Self {
        match privilege {
            Privilege::Manager => EntryStatus::Approved,
            Privilege::Staff => EntryStatus::Pending,
        }
    }

    /// Approved and rejected entries can never change again
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EntryStatus::Pending)
    }

    /// Whether moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: EntryStatus) -> bool {
        matches!(
            (self, next),
            (EntryStatus::Pending, EntryStatus::Approved)
                | (EntryStatus::Pending, EntryStatus::Rejected)
        )
    }
}

/// Privilege of the actor recording a payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Privilege {
    /// Payments recorded by managers count immediately
    Manager,
    /// Payments recorded by staff wait for manager approval
    Staff,
}

/// Which kind of record a ledger belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentKind {
    Order,
    Expense,
}

/// Customer order with its frozen cost snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub customer_name: String,
    /// `final_cost` of `breakdown`, frozen when the order was saved
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    /// Advance captured at creation; always counts toward the paid total
    pub baseline_advance: Money,
    pub breakdown: CostBreakdown,
    pub items: Vec<LineItem>,
    pub remaining_balance: Money,
    pub created_at: NaiveDateTime,
}

/// Business expense paid off in installments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub description: String,
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    pub baseline_advance: Money,
    pub remaining_balance: Money,
    pub created_at: NaiveDateTime,
}

/// Record owning a payment ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Parent {
    Order(Order),
    Expense(Expense),
}

impl Parent {
    pub fn id(&self) -> &str {
        match self {
            Parent::Order(order) => &order.id,
            Parent::Expense(expense) => &expense.id,
        }
    }

    pub fn kind(&self) -> ParentKind {
        match self {
            Parent::Order(_) => ParentKind::Order,
            Parent::Expense(_) => ParentKind::Expense,
        }
    }

    pub fn total_amount(&self) -> &Money {
        match self {
            Parent::Order(order) => &order.total_amount,
            Parent::Expense(expense) => &expense.total_amount,
        }
    }

    pub fn baseline_advance(&self) -> &Money {
        match self {
            Parent::Order(order) => &order.baseline_advance,
            Parent::Expense(expense) => &expense.baseline_advance,
        }
    }

    pub fn payment_method(&self) -> PaymentMethod {
        match self {
            Parent::Order(order) => order.payment_method,
            Parent::Expense(expense) => expense.payment_method,
        }
    }

    pub fn remaining_balance(&self) -> &Money {
        match self {
            Parent::Order(order) => &order.remaining_balance,
            Parent::Expense(expense) => &expense.remaining_balance,
        }
    }

    pub fn created_at(&self) -> NaiveDateTime {
        match self {
            Parent::Order(order) => order.created_at,
            Parent::Expense(expense) => expense.created_at,
        }
    }

    /// Replace the stored remaining balance
    pub fn set_remaining_balance(&mut self, balance: Money) {
        match self {
            Parent::Order(order) => order.remaining_balance = balance,
            Parent::Expense(expense) => expense.remaining_balance = balance,
        }
    }
}

/// One recorded monetary movement against an order or expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: String,
    pub parent_id: String,
    pub parent_kind: ParentKind,
    pub amount: Money,
    pub kind: EntryKind,
    pub method: PaymentMethod,
    pub status: EntryStatus,
    pub description: Option<String>,
    pub entry_date: NaiveDate,
    pub created_at: NaiveDateTime,
    /// Synthetic row standing for the parent's baseline advance; never stored
    #[serde(default)]
    pub baseline: bool,
}

/// Errors that can occur in the pricing and ledger core
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Unknown reference: {0}")]
    Reference(String),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;
