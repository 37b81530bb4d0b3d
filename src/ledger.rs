//! Legacy per-user transaction ledger
//!
//! An older screen kept its own transaction list in a record keyed by user
//! id, with its own category vocabulary and support for editing and
//! deleting entries. It is deliberately NOT synchronized with the unified
//! engine snapshot; the two stores share no consistency guarantee.

use crate::persist::{read_json_record, write_json_record};
use crate::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Income,
    Expense,
}

/// Category vocabulary of the legacy screen; independent of the engine's
/// keyword classifier.
pub const INCOME_CATEGORIES: &[&str] = &["Salary", "Freelance", "Investment", "Other Income"];
pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Food",
    "Transportation",
    "Entertainment",
    "Shopping",
    "Bills",
    "Healthcare",
    "Education",
    "Other",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub kind: EntryKind,
    pub category: String,
    pub amount: i64,
    pub description: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct LedgerDraft {
    pub kind: EntryKind,
    pub category: String,
    pub amount: i64,
    pub description: String,
    pub date: NaiveDate,
}

/// Trait for per-user ledger persistence
pub trait LedgerStore: Send + Sync {
    fn load(&self, user_id: Uuid) -> Result<Vec<LedgerEntry>>;
    fn save(&self, user_id: Uuid, entries: &[LedgerEntry]) -> Result<()>;
}

impl<S: LedgerStore> LedgerStore for std::sync::Arc<S> {
    fn load(&self, user_id: Uuid) -> Result<Vec<LedgerEntry>> {
        (**self).load(user_id)
    }

    fn save(&self, user_id: Uuid, entries: &[LedgerEntry]) -> Result<()> {
        (**self).save(user_id, entries)
    }
}

/// In-memory ledger store for tests
#[derive(Default)]
pub struct MemoryLedgerStore {
    by_user: Mutex<HashMap<Uuid, Vec<LedgerEntry>>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn load(&self, user_id: Uuid) -> Result<Vec<LedgerEntry>> {
        Ok(self
            .by_user
            .lock()
            .expect("ledger map poisoned")
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    fn save(&self, user_id: Uuid, entries: &[LedgerEntry]) -> Result<()> {
        self.by_user
            .lock()
            .expect("ledger map poisoned")
            .insert(user_id, entries.to_vec());
        Ok(())
    }
}

/// File-backed ledger store: one `transactions_<user>.json` per user
pub struct JsonFileLedgerStore {
    dir: PathBuf,
}

impl JsonFileLedgerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, user_id: Uuid) -> PathBuf {
        self.dir.join(format!("transactions_{}.json", user_id))
    }
}

impl LedgerStore for JsonFileLedgerStore {
    fn load(&self, user_id: Uuid) -> Result<Vec<LedgerEntry>> {
        Ok(read_json_record(&self.path_for(user_id))?.unwrap_or_default())
    }

    fn save(&self, user_id: Uuid, entries: &[LedgerEntry]) -> Result<()> {
        write_json_record(&self.path_for(user_id), &entries.to_vec())
    }
}

/// One user's ledger, loaded into memory and written back on every change.
pub struct TransactionLedger {
    user_id: Uuid,
    entries: Vec<LedgerEntry>,
    store: Box<dyn LedgerStore>,
}

impl TransactionLedger {
    pub fn open(user_id: Uuid, store: Box<dyn LedgerStore>) -> Self {
        let entries = store.load(user_id).unwrap_or_default();
        Self {
            user_id,
            entries,
            store,
        }
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn add(&mut self, draft: LedgerDraft) -> Result<Uuid> {
        let entry = LedgerEntry {
            id: Uuid::new_v4(),
            kind: draft.kind,
            category: draft.category,
            amount: draft.amount,
            description: draft.description,
            date: draft.date,
        };
        let id = entry.id;
        self.entries.push(entry);
        self.store.save(self.user_id, &self.entries)?;
        Ok(id)
    }

    /// Replace an entry in place, keeping its id. Returns false when the
    /// id is unknown.
    pub fn update(&mut self, id: Uuid, draft: LedgerDraft) -> Result<bool> {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
            return Ok(false);
        };
        entry.kind = draft.kind;
        entry.category = draft.category;
        entry.amount = draft.amount;
        entry.description = draft.description;
        entry.date = draft.date;
        self.store.save(self.user_id, &self.entries)?;
        Ok(true)
    }

    /// Delete an entry. The only deletion anywhere in the system.
    pub fn remove(&mut self, id: Uuid) -> Result<bool> {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        if self.entries.len() == before {
            return Ok(false);
        }
        self.store.save(self.user_id, &self.entries)?;
        Ok(true)
    }

    pub fn income_total(&self) -> i64 {
        self.total_of(EntryKind::Income)
    }

    pub fn expense_total(&self) -> i64 {
        self.total_of(EntryKind::Expense)
    }

    pub fn balance(&self) -> i64 {
        self.income_total() - self.expense_total()
    }

    fn total_of(&self, kind: EntryKind) -> i64 {
        self.entries
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.amount)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn draft(kind: EntryKind, category: &str, amount: i64) -> LedgerDraft {
        LedgerDraft {
            kind,
            category: category.to_string(),
            amount,
            description: format!("{} entry", category),
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        }
    }

    #[test]
    fn test_add_edit_delete() {
        let mut ledger =
            TransactionLedger::open(Uuid::new_v4(), Box::new(MemoryLedgerStore::new()));

        let id = ledger.add(draft(EntryKind::Expense, "Food", 250)).unwrap();
        assert_eq!(ledger.entries().len(), 1);

        assert!(ledger
            .update(id, draft(EntryKind::Expense, "Bills", 300))
            .unwrap());
        assert_eq!(ledger.entries()[0].category, "Bills");
        assert_eq!(ledger.entries()[0].amount, 300);
        assert_eq!(ledger.entries()[0].id, id);

        assert!(ledger.remove(id).unwrap());
        assert!(ledger.entries().is_empty());
        assert!(!ledger.remove(id).unwrap());
    }

    #[test]
    fn test_unknown_id_update_is_refused() {
        let mut ledger =
            TransactionLedger::open(Uuid::new_v4(), Box::new(MemoryLedgerStore::new()));
        assert!(!ledger
            .update(Uuid::new_v4(), draft(EntryKind::Income, "Salary", 100))
            .unwrap());
    }

    #[test]
    fn test_totals_and_balance() {
        let mut ledger =
            TransactionLedger::open(Uuid::new_v4(), Box::new(MemoryLedgerStore::new()));
        ledger.add(draft(EntryKind::Income, "Salary", 20000)).unwrap();
        ledger.add(draft(EntryKind::Income, "Freelance", 3000)).unwrap();
        ledger.add(draft(EntryKind::Expense, "Food", 4500)).unwrap();

        assert_eq!(ledger.income_total(), 23000);
        assert_eq!(ledger.expense_total(), 4500);
        assert_eq!(ledger.balance(), 18500);
    }

    #[test]
    fn test_ledgers_are_isolated_per_user() {
        let store = Arc::new(MemoryLedgerStore::new());
        let user_a = Uuid::new_v4();
        let user_b = Uuid::new_v4();

        let mut ledger_a = TransactionLedger::open(user_a, Box::new(store.clone()));
        ledger_a.add(draft(EntryKind::Expense, "Food", 100)).unwrap();

        let ledger_b = TransactionLedger::open(user_b, Box::new(store.clone()));
        assert!(ledger_b.entries().is_empty());

        let reopened_a = TransactionLedger::open(user_a, Box::new(store));
        assert_eq!(reopened_a.entries().len(), 1);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let user = Uuid::new_v4();

        let mut ledger = TransactionLedger::open(
            user,
            Box::new(JsonFileLedgerStore::new(dir.path())),
        );
        ledger.add(draft(EntryKind::Expense, "Education", 1200)).unwrap();

        let reopened =
            TransactionLedger::open(user, Box::new(JsonFileLedgerStore::new(dir.path())));
        assert_eq!(reopened.entries(), ledger.entries());
    }
}
