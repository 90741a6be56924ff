//! Ledger entry construction and the requests that create ledger parents

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// Suffix marking the synthetic row that stands for a baseline advance
const BASELINE_SUFFIX: &str = ":baseline";

/// ID of the synthetic baseline advance row of a parent
pub fn baseline_entry_id(parent_id: &str) -> String {
    format!("{}{}", parent_id, BASELINE_SUFFIX)
}

/// Parent ID when the entry ID names a synthetic baseline advance row
pub fn baseline_parent_id(entry_id: &str) -> Option<&str> {
    entry_id.strip_suffix(BASELINE_SUFFIX)
}

/// Payment details supplied by the user recording an entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEntry {
    pub amount: Money,
    pub kind: EntryKind,
    pub method: PaymentMethod,
    pub description: Option<String>,
    pub entry_date: NaiveDate,
}

impl NewEntry {
    /// Create a new entry request
    pub fn new(amount: Money, kind: EntryKind, method: PaymentMethod, entry_date: NaiveDate) -> Self {
        Self {
            amount,
            kind,
            method,
            description: None,
            entry_date,
        }
    }

    /// An installment payment
    pub fn payment(amount: Money, method: PaymentMethod, entry_date: NaiveDate) -> Self {
        Self::new(amount, EntryKind::Payment, method, entry_date)
    }

    /// An additional advance recorded after creation
    pub fn advance(amount: Money, method: PaymentMethod, entry_date: NaiveDate) -> Self {
        Self::new(amount, EntryKind::Advance, method, entry_date)
    }

    /// Set the free-text description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl LedgerEntry {
    /// Build a stored entry for `parent`
    ///
    /// Order entries start approved only when a manager records them. Expense entries
    /// have no approval workflow and are approved from the start.
    pub fn record(parent: &Parent, new_entry: NewEntry, privilege: Privilege) -> Self {
        let status = match parent.kind() {
            ParentKind::Order => EntryStatus::initial_for(privilege),
            ParentKind::Expense => EntryStatus::Approved,
        };
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            parent_id: parent.id().to_string(),
            parent_kind: parent.kind(),
            amount: new_entry.amount,
            kind: new_entry.kind,
            method: new_entry.method,
            status,
            description: new_entry.description,
            entry_date: new_entry.entry_date,
            created_at: chrono::Utc::now().naive_utc(),
            baseline: false,
        }
    }

    /// Read-only row representing the parent's baseline advance, if there is one
    pub fn baseline_for(parent: &Parent) -> Option<Self> {
        if *parent.baseline_advance() <= BigDecimal::from(0) {
            return None;
        }
        Some(Self {
            id: baseline_entry_id(parent.id()),
            parent_id: parent.id().to_string(),
            parent_kind: parent.kind(),
            amount: parent.baseline_advance().clone(),
            kind: EntryKind::Advance,
            method: parent.payment_method(),
            status: EntryStatus::Approved,
            description: Some("Advance at creation".to_string()),
            entry_date: parent.created_at().date(),
            created_at: parent.created_at(),
            baseline: true,
        })
    }
}

/// Everything needed to turn a priced draft into an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub customer_name: String,
    pub payment_method: PaymentMethod,
    pub baseline_advance: Money,
    pub discount_percent: BigDecimal,
}

impl OrderRequest {
    pub fn new(customer_name: impl Into<String>, payment_method: PaymentMethod) -> Self {
        Self {
            customer_name: customer_name.into(),
            payment_method,
            baseline_advance: BigDecimal::from(0),
            discount_percent: BigDecimal::from(0),
        }
    }

    pub fn advance(mut self, amount: Money) -> Self {
        self.baseline_advance = amount;
        self
    }

    pub fn discount(mut self, percent: BigDecimal) -> Self {
        self.discount_percent = percent;
        self
    }
}

/// Everything needed to record an expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRequest {
    pub description: String,
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    pub baseline_advance: Money,
}

impl ExpenseRequest {
    pub fn new(
        description: impl Into<String>,
        total_amount: Money,
        payment_method: PaymentMethod,
    ) -> Self {
        Self {
            description: description.into(),
            total_amount,
            payment_method,
            baseline_advance: BigDecimal::from(0),
        }
    }

    pub fn advance(mut self, amount: Money) -> Self {
        self.baseline_advance = amount;
        self
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    fn breakdown(total: i64) -> CostBreakdown {
        CostBreakdown {
            total_print_area: 0.0,
            total_material_used: 0.0,
            total_waste: 0.0,
            waste_percentage: 0.0,
            material_cost: BigDecimal::from(total),
            waste_cost: BigDecimal::from(0),
            service_cost: BigDecimal::from(0),
            total_cost: BigDecimal::from(total),
            discount_percent: BigDecimal::from(0),
            discount_amount: BigDecimal::from(0),
            final_cost: BigDecimal::from(total),
        }
    }

    pub(crate) fn order(id: &str, total: i64, advance: i64) -> Parent {
        Parent::Order(Order {
            id: id.to_string(),
            customer_name: "Test customer".to_string(),
            total_amount: BigDecimal::from(total),
            payment_method: PaymentMethod::Cash,
            baseline_advance: BigDecimal::from(advance),
            breakdown: breakdown(total),
            items: Vec::new(),
            remaining_balance: BigDecimal::from(total - advance),
            created_at: chrono::Utc::now().naive_utc(),
        })
    }

    pub(crate) fn expense(id: &str, total: i64, advance: i64) -> Parent {
        Parent::Expense(Expense {
            id: id.to_string(),
            description: "Test expense".to_string(),
            total_amount: BigDecimal::from(total),
            payment_method: PaymentMethod::BankTransfer,
            baseline_advance: BigDecimal::from(advance),
            remaining_balance: BigDecimal::from(total - advance),
            created_at: chrono::Utc::now().naive_utc(),
        })
    }

    pub(crate) fn entry(parent_id: &str, amount: i64, status: EntryStatus) -> LedgerEntry {
        LedgerEntry {
            id: uuid::Uuid::new_v4().to_string(),
            parent_id: parent_id.to_string(),
            parent_kind: ParentKind::Order,
            amount: BigDecimal::from(amount),
            kind: EntryKind::Payment,
            method: PaymentMethod::Cash,
            status,
            description: None,
            entry_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            created_at: chrono::Utc::now().naive_utc(),
            baseline: false,
        }
    }
}
