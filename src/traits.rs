//! Traits for catalog lookup, storage abstraction and extensibility

use async_trait::async_trait;
use bigdecimal::BigDecimal;

use crate::types::*;

/// Read-only source of material and service definitions
///
/// Implementations are treated as snapshots: one pricing call never sees a price
/// change half way through.
pub trait CatalogProvider: Send + Sync {
    /// Get a material by key, failing with [`CoreError::Reference`] when unknown
    fn get_material(&self, key: &str) -> CoreResult<&Material>;

    /// Get a service by key, failing with [`CoreError::Reference`] when unknown
    fn get_service(&self, key: &str) -> CoreResult<&Service>;

    /// All materials, ordered by key
    fn list_materials(&self) -> Vec<&Material>;

    /// All services, ordered by key
    fn list_services(&self) -> Vec<&Service>;
}

/// Storage abstraction for orders, expenses and their payment ledgers
///
/// The core never performs I/O itself. Any backend (SQL, document store, in-memory)
/// plugs in by implementing these methods.
#[async_trait]
pub trait LedgerStorage: Send + Sync {
    /// Save a new order or expense
    async fn save_parent(&mut self, parent: &Parent) -> CoreResult<()>;

    /// Get an order or expense by ID
    async fn load_parent(&self, parent_id: &str) -> CoreResult<Option<Parent>>;

    /// All stored entries of a parent, in no particular order
    async fn load_ledger(&self, parent_id: &str) -> CoreResult<Vec<LedgerEntry>>;

    /// Get a single ledger entry by ID
    async fn get_ledger_entry(&self, entry_id: &str) -> CoreResult<Option<LedgerEntry>>;

    /// Append a new entry to its parent's ledger
    async fn append_ledger_entry(&mut self, entry: &LedgerEntry) -> CoreResult<()>;

    /// Overwrite the status of an existing entry
    async fn update_ledger_entry_status(
        &mut self,
        entry_id: &str,
        status: EntryStatus,
    ) -> CoreResult<()>;

    /// Remove an entry from its parent's ledger
    async fn delete_ledger_entry(&mut self, entry_id: &str) -> CoreResult<()>;

    /// Persist a freshly reconciled remaining balance
    async fn update_parent_balance(
        &mut self,
        parent_id: &str,
        remaining_balance: &BigDecimal,
    ) -> CoreResult<()>;
}

/// Trait for implementing custom ledger entry validation rules
pub trait EntryValidator: Send + Sync {
    /// Validate an entry before it is appended
    fn validate_entry(&self, entry: &LedgerEntry) -> CoreResult<()>;
}

/// Default entry validator: amounts must be strictly positive
pub struct DefaultEntryValidator;

impl EntryValidator for DefaultEntryValidator {
    fn validate_entry(&self, entry: &LedgerEntry) -> CoreResult<()> {
        crate::utils::validate_positive_amount(&entry.amount, "Entry amount")
    }
}
