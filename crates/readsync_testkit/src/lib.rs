//! # ReadSync Testkit
//!
//! Test utilities for ReadSync.
//!
//! This crate provides:
//! - A process-wide RSA device key and its delivered (base64 DER) form
//! - Builders for registration and sync response documents
//! - Account fixtures in each lifecycle state
//! - Property-based generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use readsync_testkit::prelude::*;
//!
//! let body = SyncResponseBuilder::new("2020-01-01T00:00:00Z")
//!     .add(MetaData::new("A1").title("Walden"))
//!     .remove("A2")
//!     .build();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod accounts;
pub mod generators;
pub mod keys;
pub mod responses;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::accounts::*;
    pub use crate::generators::*;
    pub use crate::keys::*;
    pub use crate::responses::*;
}

pub use accounts::*;
pub use generators::*;
pub use keys::*;
pub use responses::*;
