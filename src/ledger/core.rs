//! Payment ledger orchestrator that couples every mutation with reconciliation

use bigdecimal::BigDecimal;

use crate::config::EngineConfig;
use crate::ledger::entry::*;
use crate::pricing::{OrderDraft, PricingEngine};
use crate::reconciliation::{reconcile, ReconciliationReport};
use crate::traits::*;
use crate::types::*;
use crate::utils::{
    validate_advance, validate_description, validate_discount_percent, validate_positive_amount,
    StrictEntryValidator,
};

/// Longest accepted customer name or expense description
const MAX_NAME_LEN: usize = 200;

/// How to take back a ledger change whose balance could not be persisted
enum Undo {
    Append(String),
    Status(String),
    Delete(LedgerEntry),
}

/// Ledger of orders, expenses and their payment entries
///
/// Every mutation re-derives the parent's remaining balance from the complete entry
/// set and persists it. If that fails, the mutation is reverted before the error is
/// returned, so callers can retry the whole operation.
pub struct PaymentLedger<S: LedgerStorage> {
    storage: S,
    validator: Box<dyn EntryValidator>,
    pricing: PricingEngine,
}

impl<S: LedgerStorage> PaymentLedger<S> {
    /// Create a new ledger with the given storage backend
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            validator: Box::new(DefaultEntryValidator),
            pricing: PricingEngine::default(),
        }
    }

    /// Create a new ledger with a custom entry validator
    pub fn with_validator(storage: S, validator: Box<dyn EntryValidator>) -> Self {
        Self {
            storage,
            validator,
            pricing: PricingEngine::default(),
        }
    }

    /// Create a ledger whose validation and pricing follow the configuration
    pub fn from_config(storage: S, config: &EngineConfig) -> Self {
        let validator: Box<dyn EntryValidator> = if config.ledger.strict_validation {
            Box::new(StrictEntryValidator::new(config.ledger.max_description_len))
        } else {
            Box::new(DefaultEntryValidator)
        };
        Self {
            storage,
            validator,
            pricing: PricingEngine::new(config.pricing_options()),
        }
    }

    /// Access the storage backend
    pub fn storage(&self) -> &S {
        &self.storage
    }

    // Parent operations
    /// Price the draft, save it as an order and clear the draft
    pub async fn create_order(
        &mut self,
        request: OrderRequest,
        draft: &mut OrderDraft,
        catalog: &dyn CatalogProvider,
    ) -> CoreResult<Order> {
        validate_description(&request.customer_name, MAX_NAME_LEN)?;
        validate_discount_percent(&request.discount_percent)?;
        if draft.visible_items().next().is_none() {
            return Err(CoreError::Validation(
                "Order must contain at least one visible line item".to_string(),
            ));
        }

        let breakdown = self
            .pricing
            .price(draft.items(), catalog, &request.discount_percent)?;
        validate_advance(&request.baseline_advance, &breakdown.final_cost)?;

        let mut order = Order {
            id: uuid::Uuid::new_v4().to_string(),
            customer_name: request.customer_name.trim().to_string(),
            total_amount: breakdown.final_cost.clone(),
            payment_method: request.payment_method,
            baseline_advance: request.baseline_advance,
            breakdown,
            items: draft.items().to_vec(),
            remaining_balance: BigDecimal::from(0),
            created_at: chrono::Utc::now().naive_utc(),
        };
        order.remaining_balance = reconcile(&Parent::Order(order.clone()), &[]);

        self.storage
            .save_parent(&Parent::Order(order.clone()))
            .await?;
        draft.clear();

        tracing::info!(
            order_id = %order.id,
            total = %order.total_amount,
            advance = %order.baseline_advance,
            "Order created"
        );
        Ok(order)
    }

    /// Record an expense that will be paid off through its ledger
    pub async fn record_expense(&mut self, request: ExpenseRequest) -> CoreResult<Expense> {
        validate_description(&request.description, MAX_NAME_LEN)?;
        validate_positive_amount(&request.total_amount, "Expense total")?;
        validate_advance(&request.baseline_advance, &request.total_amount)?;

        let mut expense = Expense {
            id: uuid::Uuid::new_v4().to_string(),
            description: request.description.trim().to_string(),
            total_amount: request.total_amount,
            payment_method: request.payment_method,
            baseline_advance: request.baseline_advance,
            remaining_balance: BigDecimal::from(0),
            created_at: chrono::Utc::now().naive_utc(),
        };
        expense.remaining_balance = reconcile(&Parent::Expense(expense.clone()), &[]);

        self.storage
            .save_parent(&Parent::Expense(expense.clone()))
            .await?;

        tracing::info!(
            expense_id = %expense.id,
            total = %expense.total_amount,
            "Expense recorded"
        );
        Ok(expense)
    }

    /// Get an order or expense by ID
    pub async fn get_parent(&self, parent_id: &str) -> CoreResult<Option<Parent>> {
        self.storage.load_parent(parent_id).await
    }

    /// Get an order or expense by ID, returning an error if not found
    pub async fn get_parent_required(&self, parent_id: &str) -> CoreResult<Parent> {
        self.storage
            .load_parent(parent_id)
            .await?
            .ok_or_else(|| CoreError::Reference(format!("parent '{}'", parent_id)))
    }

    // Entry operations
    /// Record a payment against an order or expense
    ///
    /// `privilege` decides whether an order entry is approved right away or waits for a
    /// manager. Expense entries are always approved.
    pub async fn add_entry(
        &mut self,
        parent_id: &str,
        new_entry: NewEntry,
        privilege: Privilege,
    ) -> CoreResult<LedgerEntry> {
        let parent = self.get_parent_required(parent_id).await?;
        let entry = LedgerEntry::record(&parent, new_entry, privilege);
        self.validator.validate_entry(&entry)?;

        self.storage.append_ledger_entry(&entry).await?;
        let remaining = self
            .reconcile_or_undo(&parent, Undo::Append(entry.id.clone()))
            .await?;

        tracing::info!(
            parent_id,
            entry_id = %entry.id,
            amount = %entry.amount,
            status = ?entry.status,
            remaining = %remaining,
            "Ledger entry added"
        );
        Ok(entry)
    }

    /// Get a stored entry by ID, returning an error if not found
    pub async fn get_entry_required(&self, entry_id: &str) -> CoreResult<LedgerEntry> {
        self.storage
            .get_ledger_entry(entry_id)
            .await?
            .ok_or_else(|| CoreError::Reference(format!("ledger entry '{}'", entry_id)))
    }

    /// Move a pending order entry to approved or rejected
    pub async fn set_status(
        &mut self,
        entry_id: &str,
        status: EntryStatus,
    ) -> CoreResult<LedgerEntry> {
        if let Some(parent_id) = baseline_parent_id(entry_id) {
            self.get_parent_required(parent_id).await?;
            return Err(CoreError::InvalidTransition(
                "the baseline advance has no approval workflow".to_string(),
            ));
        }

        let mut entry = self.get_entry_required(entry_id).await?;
        let parent = self.get_parent_required(&entry.parent_id).await?;

        if parent.kind() == ParentKind::Expense {
            return Err(CoreError::InvalidTransition(format!(
                "expense entry '{}' has no approval workflow",
                entry_id
            )));
        }
        if !entry.status.can_transition_to(status) {
            tracing::warn!(
                entry_id,
                from = ?entry.status,
                to = ?status,
                "Rejected ledger status change"
            );
            return Err(CoreError::InvalidTransition(format!(
                "entry '{}' cannot move from {:?} to {:?}",
                entry_id, entry.status, status
            )));
        }

        self.storage
            .update_ledger_entry_status(entry_id, status)
            .await?;
        let remaining = self
            .reconcile_or_undo(&parent, Undo::Status(entry_id.to_string()))
            .await?;
        entry.status = status;

        tracing::info!(
            entry_id,
            status = ?status,
            remaining = %remaining,
            "Ledger entry status changed"
        );
        Ok(entry)
    }

    /// Approve a pending entry
    pub async fn approve(&mut self, entry_id: &str) -> CoreResult<LedgerEntry> {
        self.set_status(entry_id, EntryStatus::Approved).await
    }

    /// Reject a pending entry
    pub async fn reject(&mut self, entry_id: &str) -> CoreResult<LedgerEntry> {
        self.set_status(entry_id, EntryStatus::Rejected).await
    }

    /// Delete an entry in any status; the baseline advance cannot be deleted
    pub async fn delete_entry(&mut self, entry_id: &str) -> CoreResult<LedgerEntry> {
        if let Some(parent_id) = baseline_parent_id(entry_id) {
            self.get_parent_required(parent_id).await?;
            return Err(CoreError::InvalidTransition(
                "the baseline advance cannot be deleted".to_string(),
            ));
        }

        let entry = self.get_entry_required(entry_id).await?;
        let parent = self.get_parent_required(&entry.parent_id).await?;

        self.storage.delete_ledger_entry(entry_id).await?;
        let remaining = self
            .reconcile_or_undo(&parent, Undo::Delete(entry.clone()))
            .await?;

        tracing::info!(
            entry_id,
            parent_id = %entry.parent_id,
            remaining = %remaining,
            "Ledger entry deleted"
        );
        Ok(entry)
    }

    // Balances and reporting
    /// Remaining balance recomputed from the current entry set, without persisting it
    pub async fn remaining_balance(&self, parent_id: &str) -> CoreResult<Money> {
        let parent = self.get_parent_required(parent_id).await?;
        let entries = self.storage.load_ledger(parent_id).await?;
        Ok(reconcile(&parent, &entries))
    }

    /// Recompute and persist the remaining balance, e.g. after a failed write
    pub async fn reconcile_parent(&mut self, parent_id: &str) -> CoreResult<Money> {
        let parent = self.get_parent_required(parent_id).await?;
        self.persist_balance(&parent).await
    }

    /// Baseline advance followed by stored entries, oldest first
    pub async fn history(&self, parent_id: &str) -> CoreResult<Vec<LedgerEntry>> {
        let parent = self.get_parent_required(parent_id).await?;
        let mut entries = self.storage.load_ledger(parent_id).await?;
        entries.sort_by(|a, b| {
            a.entry_date
                .cmp(&b.entry_date)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });

        let mut history = Vec::with_capacity(entries.len() + 1);
        history.extend(LedgerEntry::baseline_for(&parent));
        history.extend(entries);
        Ok(history)
    }

    /// Totals by status and payment method plus the remaining balance
    pub async fn summary(&self, parent_id: &str) -> CoreResult<ReconciliationReport> {
        let parent = self.get_parent_required(parent_id).await?;
        let entries = self.storage.load_ledger(parent_id).await?;
        Ok(ReconciliationReport::build(&parent, &entries))
    }

    async fn persist_balance(&mut self, parent: &Parent) -> CoreResult<Money> {
        let entries = self.storage.load_ledger(parent.id()).await?;
        let remaining = reconcile(parent, &entries);
        self.storage
            .update_parent_balance(parent.id(), &remaining)
            .await?;
        Ok(remaining)
    }

    async fn reconcile_or_undo(&mut self, parent: &Parent, undo: Undo) -> CoreResult<Money> {
        let err = match self.persist_balance(parent).await {
            Ok(remaining) => return Ok(remaining),
            Err(err) => err,
        };

        tracing::warn!(
            parent_id = parent.id(),
            error = %err,
            "Balance update failed, reverting ledger change"
        );
        let reverted = match undo {
            Undo::Append(entry_id) => self.storage.delete_ledger_entry(&entry_id).await,
            Undo::Status(entry_id) => {
                self.storage
                    .update_ledger_entry_status(&entry_id, EntryStatus::Pending)
                    .await
            }
            Undo::Delete(entry) => self.storage.append_ledger_entry(&entry).await,
        };
        if let Err(revert_err) = reverted {
            tracing::error!(
                parent_id = parent.id(),
                error = %revert_err,
                "Could not revert ledger change"
            );
        }
        Err(err)
    }
}
