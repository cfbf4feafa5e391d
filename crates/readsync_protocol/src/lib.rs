//! # ReadSync Protocol
//!
//! Device registration, request signing and sync delta codecs for the
//! Whispernet-style metadata sync service.
//!
//! This crate provides:
//! - Device serial generation and the fixed device profile
//! - Registration response parsing and its error taxonomy
//! - Conversion of the delivered PKCS#8 DER key to PEM
//! - The signed digest header carried by every sync request
//! - Sync request paths and sync response (delta) parsing
//!
//! This is a pure protocol crate with no I/O operations. Every function
//! that depends on time takes the timestamp as an argument.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod keys;
mod profile;
mod registration;
mod serial;
mod signing;
mod sync;
mod xml;

pub use error::{ProtocolError, ProtocolResult};
pub use keys::{convert_account_key, convert_key, signing_key_from_pem};
pub use profile::{Credentials, DeviceProfile};
pub use registration::{parse_registration_response, Registration};
pub use serial::generate_device_serial;
pub use signing::{
    canonical_string, format_timestamp, sign_header, sign_with_key, verify_header,
    TIMESTAMP_FORMAT,
};
pub use sync::{
    parse_sync_response, sync_request_path, SyncResponse, PUBLICATION_DATE_FORMAT,
};
