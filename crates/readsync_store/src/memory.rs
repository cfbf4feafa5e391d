//! In-memory store.

use crate::error::{StoreError, StoreResult};
use crate::model::{Account, AccountId, CatalogItem, OwnershipLink};
use crate::store::{CatalogStore, CatalogTxn};
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Default)]
struct Tables {
    accounts: HashMap<AccountId, Account>,
    items: HashMap<String, CatalogItem>,
    links: BTreeSet<OwnershipLink>,
}

impl Tables {
    fn replace_account(&mut self, account: &Account) -> StoreResult<()> {
        let existing = self
            .accounts
            .get_mut(&account.id())
            .ok_or(StoreError::AccountNotFound(account.id()))?;

        if existing.device_serial() != account.device_serial() {
            return Err(StoreError::Conflict(format!(
                "device serial of account {} cannot change",
                account.id()
            )));
        }

        *existing = account.clone();
        Ok(())
    }
}

/// A [`CatalogStore`] that keeps every table in memory.
///
/// Suitable for:
/// - Unit and integration tests
/// - Embedding the client in a process that snapshots records itself
///
/// # Thread Safety
///
/// Reads share a lock. A transaction holds the write lock for its whole
/// duration and works on a staged copy of the tables, which replaces the
/// live tables only when the closure succeeds. Transactions are therefore
/// serialized, which also makes item creation an atomic insert-if-absent.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of catalog items.
    pub fn item_count(&self) -> usize {
        self.tables.read().items.len()
    }

    /// Returns the number of ownership links across all accounts.
    pub fn link_count(&self) -> usize {
        self.tables.read().links.len()
    }
}

impl CatalogStore for MemoryStore {
    fn create_account(&self, account: Account) -> StoreResult<Account> {
        let mut tables = self.tables.write();
        let stored = tables.accounts.entry(account.id()).or_insert(account);
        Ok(stored.clone())
    }

    fn load_account(&self, id: AccountId) -> StoreResult<Option<Account>> {
        Ok(self.tables.read().accounts.get(&id).cloned())
    }

    fn save_account(&self, account: &Account) -> StoreResult<()> {
        self.tables.write().replace_account(account)
    }

    fn active_accounts(&self) -> StoreResult<Vec<AccountId>> {
        let tables = self.tables.read();
        let mut ids: Vec<AccountId> = tables
            .accounts
            .values()
            .filter(|account| account.is_active())
            .map(Account::id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn catalog_item(&self, asin: &str) -> StoreResult<Option<CatalogItem>> {
        Ok(self.tables.read().items.get(asin).cloned())
    }

    fn linked_items(&self, account_id: AccountId) -> StoreResult<Vec<String>> {
        Ok(self
            .tables
            .read()
            .links
            .iter()
            .filter(|link| link.account_id == account_id)
            .map(|link| link.asin.clone())
            .collect())
    }

    fn transaction<R, E, F>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut dyn CatalogTxn) -> Result<R, E>,
        E: From<StoreError>,
    {
        let mut live = self.tables.write();
        let mut txn = MemoryTxn {
            staged: live.clone(),
        };

        match f(&mut txn) {
            Ok(value) => {
                *live = txn.staged;
                Ok(value)
            }
            Err(err) => {
                tracing::debug!("memory store transaction rolled back");
                Err(err)
            }
        }
    }
}

struct MemoryTxn {
    staged: Tables,
}

impl CatalogTxn for MemoryTxn {
    fn get_or_create_item(&mut self, item: CatalogItem) -> StoreResult<(CatalogItem, bool)> {
        if let Some(existing) = self.staged.items.get(&item.asin) {
            return Ok((existing.clone(), false));
        }
        self.staged.items.insert(item.asin.clone(), item.clone());
        Ok((item, true))
    }

    fn ensure_link(&mut self, account_id: AccountId, asin: &str) -> StoreResult<bool> {
        if !self.staged.accounts.contains_key(&account_id) {
            return Err(StoreError::AccountNotFound(account_id));
        }
        if !self.staged.items.contains_key(asin) {
            return Err(StoreError::Conflict(format!(
                "cannot link unknown item {asin}"
            )));
        }
        Ok(self.staged.links.insert(OwnershipLink {
            account_id,
            asin: asin.to_string(),
        }))
    }

    fn remove_link(&mut self, account_id: AccountId, asin: &str) -> StoreResult<bool> {
        Ok(self.staged.links.remove(&OwnershipLink {
            account_id,
            asin: asin.to_string(),
        }))
    }

    fn save_account(&mut self, account: &Account) -> StoreResult<()> {
        self.staged.replace_account(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const SERIAL: &str = "0123456789abcdef0123456789abcdef01234567";

    fn store_with_account(id: u64) -> MemoryStore {
        let store = MemoryStore::new();
        store
            .create_account(Account::new(AccountId::new(id), SERIAL))
            .unwrap();
        store
    }

    fn titled(asin: &str, title: &str) -> CatalogItem {
        CatalogItem {
            title: Some(title.into()),
            ..CatalogItem::new(asin)
        }
    }

    #[test]
    fn create_account_is_get_or_create() {
        let store = store_with_account(1);
        let other_serial = "f".repeat(40);

        let stored = store
            .create_account(Account::new(AccountId::new(1), other_serial))
            .unwrap();
        assert_eq!(stored.device_serial(), SERIAL);
    }

    #[test]
    fn save_unknown_account_fails() {
        let store = MemoryStore::new();
        let account = Account::new(AccountId::new(9), SERIAL);
        let result = store.save_account(&account);
        assert!(matches!(result, Err(StoreError::AccountNotFound(_))));
    }

    #[test]
    fn save_account_rejects_serial_change() {
        let store = store_with_account(1);
        let replacement = Account::new(AccountId::new(1), "e".repeat(40));
        let result = store.save_account(&replacement);
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[test]
    fn active_accounts_only_lists_registered() {
        let store = store_with_account(1);
        store
            .create_account(Account::new(AccountId::new(2), SERIAL))
            .unwrap();

        let mut account = store.load_account(AccountId::new(2)).unwrap().unwrap();
        account.complete_registration("token", "a2V5");
        store.save_account(&account).unwrap();

        assert_eq!(store.active_accounts().unwrap(), vec![AccountId::new(2)]);
    }

    #[test]
    fn first_write_wins_on_items() {
        let store = store_with_account(1);

        store
            .transaction(|txn| {
                let (_, created) = txn.get_or_create_item(titled("A1", "First"))?;
                assert!(created);
                let (item, created) = txn.get_or_create_item(titled("A1", "Second"))?;
                assert!(!created);
                assert_eq!(item.title.as_deref(), Some("First"));
                Ok::<_, StoreError>(())
            })
            .unwrap();

        let item = store.catalog_item("A1").unwrap().unwrap();
        assert_eq!(item.title.as_deref(), Some("First"));
    }

    #[test]
    fn links_are_idempotent() {
        let store = store_with_account(1);
        let id = AccountId::new(1);

        let (first, second) = store
            .transaction(|txn| {
                txn.get_or_create_item(CatalogItem::new("A1"))?;
                let first = txn.ensure_link(id, "A1")?;
                let second = txn.ensure_link(id, "A1")?;
                Ok::<_, StoreError>((first, second))
            })
            .unwrap();

        assert!(first);
        assert!(!second);
        assert_eq!(store.link_count(), 1);
    }

    #[test]
    fn removing_absent_link_is_noop() {
        let store = store_with_account(1);
        let removed = store
            .transaction(|txn| txn.remove_link(AccountId::new(1), "missing"))
            .unwrap();
        assert!(!removed);
    }

    #[test]
    fn failed_transaction_leaves_no_trace() {
        let store = store_with_account(1);
        let id = AccountId::new(1);

        let result: StoreResult<()> = store.transaction(|txn| {
            txn.get_or_create_item(CatalogItem::new("A1"))?;
            txn.ensure_link(id, "A1")?;
            Err(StoreError::Backend("simulated failure".into()))
        });

        assert!(result.is_err());
        assert_eq!(store.item_count(), 0);
        assert!(store.linked_items(id).unwrap().is_empty());
    }

    #[test]
    fn concurrent_first_sight_creates_one_item() {
        let store = Arc::new(MemoryStore::new());
        for id in 0..8 {
            store
                .create_account(Account::new(AccountId::new(id), SERIAL))
                .unwrap();
        }

        let handles: Vec<_> = (0..8)
            .map(|id| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store
                        .transaction(|txn| {
                            let (_, created) =
                                txn.get_or_create_item(titled("SHARED", &format!("from {id}")))?;
                            txn.ensure_link(AccountId::new(id), "SHARED")?;
                            Ok::<_, StoreError>(created)
                        })
                        .unwrap()
                })
            })
            .collect();

        let created: usize = handles
            .into_iter()
            .map(|h| usize::from(h.join().unwrap()))
            .sum();

        assert_eq!(created, 1);
        assert_eq!(store.item_count(), 1);
        assert_eq!(store.link_count(), 8);
    }
}
