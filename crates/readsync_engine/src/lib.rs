//! # ReadSync Engine
//!
//! Device registration and catalog sync for ReadSync accounts.
//!
//! This crate provides:
//! - Registration of a device against the remote service
//! - Lazy conversion of the delivered device key
//! - The per-account sync state machine
//! - Transactional application of sync deltas to a [`CatalogStore`]
//! - An HTTP client abstraction with a blocking `ureq` implementation
//!
//! ## Account lifecycle
//!
//! ```text
//! Unregistered --register--> Registered --key conversion--> Ready
//!                                                            |  ^
//!                                                       sync |  | delta applied,
//!                                                            v  | checkpoint advanced
//!                                                          Syncing
//! ```
//!
//! ## Key Invariants
//!
//! - Registration either fully updates the account or leaves it untouched
//! - The checkpoint advances in the same transaction that applies the delta
//! - At most one operation runs per account at a time
//! - Network failures surface immediately as typed errors; no retries
//!
//! [`CatalogStore`]: readsync_store::CatalogStore

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod applier;
mod config;
mod error;
mod http;
mod locks;
mod mock;
mod state;

pub use applier::{apply_delta, DeltaSummary};
pub use config::ClientConfig;
pub use error::{SyncError, SyncResult};
pub use http::{HttpClient, HttpRequest, HttpResponse, Method, UreqClient};
pub use mock::MockHttpClient;
pub use state::{AccountState, SyncEngine, SyncOutcome, SyncStats};
