//! In-memory storage implementation for testing

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::traits::*;
use crate::types::*;

/// In-memory storage implementation for testing and development
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    parents: Arc<RwLock<HashMap<String, Parent>>>,
    entries: Arc<RwLock<HashMap<String, LedgerEntry>>>,
    fail_balance_updates: Arc<AtomicBool>,
}

fn read<T>(lock: &RwLock<T>) -> CoreResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| CoreError::Storage("storage lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> CoreResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| CoreError::Storage("storage lock poisoned".to_string()))
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> CoreResult<()> {
        write(&self.parents)?.clear();
        write(&self.entries)?.clear();
        Ok(())
    }

    /// Make every following `update_parent_balance` call fail, to exercise
    /// the unit-of-work compensation in tests
    pub fn set_fail_balance_updates(&self, fail: bool) {
        self.fail_balance_updates.store(fail, Ordering::SeqCst);
    }

    /// Number of stored ledger entries across all parents
    pub fn entry_count(&self) -> CoreResult<usize> {
        Ok(read(&self.entries)?.len())
    }
}

#[async_trait]
impl LedgerStorage for MemoryStorage {
    async fn save_parent(&mut self, parent: &Parent) -> CoreResult<()> {
        let mut parents = write(&self.parents)?;
        if parents.contains_key(parent.id()) {
            return Err(CoreError::Storage(format!(
                "Parent '{}' already exists",
                parent.id()
            )));
        }
        parents.insert(parent.id().to_string(), parent.clone());
        Ok(())
    }

    async fn load_parent(&self, parent_id: &str) -> CoreResult<Option<Parent>> {
        Ok(read(&self.parents)?.get(parent_id).cloned())
    }

    async fn load_ledger(&self, parent_id: &str) -> CoreResult<Vec<LedgerEntry>> {
        Ok(read(&self.entries)?
            .values()
            .filter(|entry| entry.parent_id == parent_id)
            .cloned()
            .collect())
    }

    async fn get_ledger_entry(&self, entry_id: &str) -> CoreResult<Option<LedgerEntry>> {
        Ok(read(&self.entries)?.get(entry_id).cloned())
    }

    async fn append_ledger_entry(&mut self, entry: &LedgerEntry) -> CoreResult<()> {
        if !read(&self.parents)?.contains_key(&entry.parent_id) {
            return Err(CoreError::Reference(format!(
                "parent '{}'",
                entry.parent_id
            )));
        }
        write(&self.entries)?.insert(entry.id.clone(), entry.clone());
        Ok(())
    }

    async fn update_ledger_entry_status(
        &mut self,
        entry_id: &str,
        status: EntryStatus,
    ) -> CoreResult<()> {
        match write(&self.entries)?.get_mut(entry_id) {
            Some(entry) => {
                entry.status = status;
                Ok(())
            }
            None => Err(CoreError::Reference(format!("ledger entry '{}'", entry_id))),
        }
    }

    async fn delete_ledger_entry(&mut self, entry_id: &str) -> CoreResult<()> {
        if write(&self.entries)?.remove(entry_id).is_some() {
            Ok(())
        } else {
            Err(CoreError::Reference(format!("ledger entry '{}'", entry_id)))
        }
    }

    async fn update_parent_balance(
        &mut self,
        parent_id: &str,
        remaining_balance: &BigDecimal,
    ) -> CoreResult<()> {
        if self.fail_balance_updates.load(Ordering::SeqCst) {
            return Err(CoreError::Storage(format!(
                "balance update for '{}' rejected",
                parent_id
            )));
        }
        match write(&self.parents)?.get_mut(parent_id) {
            Some(parent) => {
                parent.set_remaining_balance(remaining_balance.clone());
                Ok(())
            }
            None => Err(CoreError::Reference(format!("parent '{}'", parent_id))),
        }
    }
}
