//! Persistence interface.

use crate::error::{StoreError, StoreResult};
use crate::model::{Account, AccountId, CatalogItem};

/// Persistence for accounts, catalog items and ownership links.
///
/// # Invariants
///
/// - `create_account` is get-or-create: an existing account is returned
///   unchanged, so its device serial is never replaced.
/// - `transaction` is all-or-nothing. If the closure returns `Err`, none
///   of the writes it staged become visible.
/// - Catalog item creation is an atomic insert-if-absent. Two concurrent
///   first sightings of one ASIN resolve to a single item.
///
/// # Implementors
///
/// - [`crate::MemoryStore`] - in-process reference store
pub trait CatalogStore: Send + Sync {
    /// Inserts `account` unless an account with the same ID exists, and
    /// returns the stored record.
    fn create_account(&self, account: Account) -> StoreResult<Account>;

    /// Loads an account.
    fn load_account(&self, id: AccountId) -> StoreResult<Option<Account>>;

    /// Overwrites an existing account.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AccountNotFound`] if the account was never
    /// created, or [`StoreError::Conflict`] if the device serial differs
    /// from the stored one.
    fn save_account(&self, account: &Account) -> StoreResult<()>;

    /// Lists the IDs of all active accounts.
    fn active_accounts(&self) -> StoreResult<Vec<AccountId>>;

    /// Looks up a catalog item.
    fn catalog_item(&self, asin: &str) -> StoreResult<Option<CatalogItem>>;

    /// Lists the ASINs linked to an account, sorted.
    fn linked_items(&self, account_id: AccountId) -> StoreResult<Vec<String>>;

    /// Runs `f` against a transaction and commits only if it succeeds.
    fn transaction<R, E, F>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut dyn CatalogTxn) -> Result<R, E>,
        E: From<StoreError>;
}

/// Writes staged inside [`CatalogStore::transaction`].
pub trait CatalogTxn {
    /// Returns the item with `item.asin`, creating it from `item` if absent.
    ///
    /// An existing item keeps its descriptive fields. The boolean is true
    /// when the item was created by this call.
    fn get_or_create_item(&mut self, item: CatalogItem) -> StoreResult<(CatalogItem, bool)>;

    /// Links `asin` to the account. Returns true if the link was new.
    fn ensure_link(&mut self, account_id: AccountId, asin: &str) -> StoreResult<bool>;

    /// Unlinks `asin` from the account. Returns true if a link was removed.
    fn remove_link(&mut self, account_id: AccountId, asin: &str) -> StoreResult<bool>;

    /// Overwrites an existing account as part of the transaction.
    fn save_account(&mut self, account: &Account) -> StoreResult<()>;
}
