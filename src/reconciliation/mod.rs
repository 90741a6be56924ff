//! Reconciliation of an order's or expense's remaining balance
//!
//! The balance is always derived from the parent record and the complete current set of
//! ledger entries. Nothing is adjusted incrementally, so any sequence of add, approve,
//! reject and delete operations that ends in the same entry set ends in the same balance.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::*;
use crate::utils::floor_at_zero;

/// Whether `entry` counts toward the paid total of a parent of the given kind
///
/// Expenses have no approval workflow, so all of their entries count. Synthetic
/// baseline rows never count here: the advance is read from the parent itself.
pub fn counts_toward_balance(parent_kind: ParentKind, entry: &LedgerEntry) -> bool {
    if entry.baseline {
        return false;
    }
    match parent_kind {
        ParentKind::Expense => true,
        ParentKind::Order => entry.status == EntryStatus::Approved,
    }
}

/// Baseline advance plus every counted entry of the parent
pub fn paid_total(parent: &Parent, entries: &[LedgerEntry]) -> Money {
    let counted: BigDecimal = entries
        .iter()
        .filter(|entry| entry.parent_id == parent.id())
        .filter(|entry| counts_toward_balance(parent.kind(), entry))
        .map(|entry| &entry.amount)
        .sum();
    parent.baseline_advance() + counted
}

/// Amount still owed on the parent, never below zero
pub fn reconcile(parent: &Parent, entries: &[LedgerEntry]) -> Money {
    floor_at_zero(parent.total_amount() - paid_total(parent, entries))
}

/// Detailed view of a parent's ledger, for history screens and exports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub parent_id: String,
    pub parent_kind: ParentKind,
    pub total_amount: Money,
    pub baseline_advance: Money,
    /// Counted entries, baseline advance excluded
    pub approved_total: Money,
    pub pending_total: Money,
    pub rejected_total: Money,
    /// Counted entries per payment method; the baseline advance is filed under the
    /// parent's own payment method
    pub paid_by_method: BTreeMap<PaymentMethod, Money>,
    pub paid_total: Money,
    pub remaining_balance: Money,
    /// Paid beyond the total; the remaining balance is floored at zero instead
    pub overpaid: Money,
    pub is_settled: bool,
    pub entry_count: usize,
}

impl ReconciliationReport {
    /// Build a report from the parent and its full entry set
    pub fn build(parent: &Parent, entries: &[LedgerEntry]) -> Self {
        let zero = BigDecimal::from(0);
        let kind = parent.kind();
        let own: Vec<&LedgerEntry> = entries
            .iter()
            .filter(|entry| entry.parent_id == parent.id() && !entry.baseline)
            .collect();

        let mut approved_total = zero.clone();
        let mut pending_total = zero.clone();
        let mut rejected_total = zero.clone();
        let mut paid_by_method: BTreeMap<PaymentMethod, Money> = BTreeMap::new();

        if *parent.baseline_advance() > zero {
            *paid_by_method
                .entry(parent.payment_method())
                .or_insert_with(|| zero.clone()) += parent.baseline_advance();
        }

        for entry in &own {
            if counts_toward_balance(kind, entry) {
                approved_total += &entry.amount;
                *paid_by_method
                    .entry(entry.method)
                    .or_insert_with(|| zero.clone()) += &entry.amount;
            } else if entry.status == EntryStatus::Rejected {
                rejected_total += &entry.amount;
            } else {
                pending_total += &entry.amount;
            }
        }

        let paid_total = parent.baseline_advance() + &approved_total;
        let remaining_balance = reconcile(parent, entries);
        let overpaid = floor_at_zero(&paid_total - parent.total_amount());

        Self {
            parent_id: parent.id().to_string(),
            parent_kind: kind,
            total_amount: parent.total_amount().clone(),
            baseline_advance: parent.baseline_advance().clone(),
            approved_total,
            pending_total,
            rejected_total,
            paid_by_method,
            paid_total,
            is_settled: remaining_balance == zero,
            remaining_balance,
            overpaid,
            entry_count: own.len(),
        }
    }
}
