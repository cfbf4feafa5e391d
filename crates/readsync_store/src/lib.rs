//! # ReadSync Store
//!
//! Account and catalog models plus the persistence interface used by the
//! ReadSync client.
//!
//! The sync client never talks to a database directly. Everything it
//! persists goes through [`CatalogStore`], which exposes explicit
//! load/save calls and an all-or-nothing [`CatalogStore::transaction`]
//! for applying a sync delta.
//!
//! ## Records
//!
//! - [`Account`] - one device binding per end user
//! - [`CatalogItem`] - descriptive metadata keyed by ASIN, first write wins
//! - [`OwnershipLink`] - "this account's catalog includes this item"
//!
//! ## Example
//!
//! ```rust
//! use readsync_store::{Account, AccountId, CatalogItem, CatalogStore, MemoryStore, StoreError};
//!
//! let store = MemoryStore::new();
//! let account = store
//!     .create_account(Account::new(AccountId::new(7), "ab".repeat(20)))
//!     .unwrap();
//!
//! store
//!     .transaction(|txn| {
//!         txn.get_or_create_item(CatalogItem::new("B000FA5ZEG"))?;
//!         txn.ensure_link(account.id(), "B000FA5ZEG")?;
//!         Ok::<_, StoreError>(())
//!     })
//!     .unwrap();
//!
//! assert_eq!(store.linked_items(account.id()).unwrap(), vec!["B000FA5ZEG"]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod memory;
mod model;
mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use model::{Account, AccountId, CatalogItem, OwnershipLink};
pub use store::{CatalogStore, CatalogTxn};
