//! Record types persisted through the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an account (one per end user).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(u64);

impl AccountId {
    /// Creates an account ID from its raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A device binding for one end user.
///
/// # Invariants
///
/// - The device serial is fixed at construction and never changes.
/// - The authentication token and the delivered private key are set
///   together by [`Account::complete_registration`].
/// - The signing-ready key is only present on a registered account.
/// - The checkpoint only moves through [`Account::advance_checkpoint`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    device_serial: String,
    private_key: Option<String>,
    signing_key_pem: Option<String>,
    adp_token: Option<String>,
    last_sync: Option<String>,
    active: bool,
    added: DateTime<Utc>,
    updated: DateTime<Utc>,
}

impl Account {
    /// Creates a new, inactive account bound to `device_serial`.
    pub fn new(id: AccountId, device_serial: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            device_serial: device_serial.into(),
            private_key: None,
            signing_key_pem: None,
            adp_token: None,
            last_sync: None,
            active: false,
            added: now,
            updated: now,
        }
    }

    /// Returns the account ID.
    pub fn id(&self) -> AccountId {
        self.id
    }

    /// Returns the 40 hex character device serial.
    pub fn device_serial(&self) -> &str {
        &self.device_serial
    }

    /// Returns the private key as delivered by registration (base64 DER).
    pub fn delivered_key(&self) -> Option<&str> {
        self.private_key.as_deref()
    }

    /// Returns the PEM encoded signing key, if it has been converted.
    pub fn signing_key_pem(&self) -> Option<&str> {
        self.signing_key_pem.as_deref()
    }

    /// Returns the authentication token.
    pub fn adp_token(&self) -> Option<&str> {
        self.adp_token.as_deref()
    }

    /// Returns the last applied sync checkpoint.
    pub fn last_sync(&self) -> Option<&str> {
        self.last_sync.as_deref()
    }

    /// Returns true once registration has succeeded.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Creation time.
    pub fn added(&self) -> DateTime<Utc> {
        self.added
    }

    /// Last modification time.
    pub fn updated(&self) -> DateTime<Utc> {
        self.updated
    }

    /// Returns true if both the token and the delivered key are present.
    pub fn is_registered(&self) -> bool {
        self.adp_token.is_some() && self.private_key.is_some()
    }

    /// Records a successful registration.
    ///
    /// Any previously converted signing key belonged to the old device key
    /// and is dropped.
    pub fn complete_registration(
        &mut self,
        adp_token: impl Into<String>,
        private_key: impl Into<String>,
    ) {
        self.adp_token = Some(adp_token.into());
        self.private_key = Some(private_key.into());
        self.signing_key_pem = None;
        self.active = true;
        self.touch();
    }

    /// Caches the signing-ready key.
    pub fn set_signing_key(&mut self, pem: impl Into<String>) {
        self.signing_key_pem = Some(pem.into());
        self.touch();
    }

    /// Moves the checkpoint to the marker returned by the server.
    pub fn advance_checkpoint(&mut self, checkpoint: impl Into<String>) {
        self.last_sync = Some(checkpoint.into());
        self.touch();
    }

    fn touch(&mut self) {
        self.updated = Utc::now();
    }
}

// Key material and the token never end up in logs.
impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |present: bool| if present { "<redacted>" } else { "<none>" };
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("device_serial", &self.device_serial)
            .field("private_key", &redact(self.private_key.is_some()))
            .field("signing_key_pem", &redact(self.signing_key_pem.is_some()))
            .field("adp_token", &redact(self.adp_token.is_some()))
            .field("last_sync", &self.last_sync)
            .field("active", &self.active)
            .finish()
    }
}

/// Descriptive metadata for one catalog entry, keyed by ASIN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Unique external identifier.
    pub asin: String,
    /// Title.
    pub title: Option<String>,
    /// Primary author.
    pub author: Option<String>,
    /// Publisher.
    pub publisher: Option<String>,
    /// Publication date.
    pub publication_date: Option<DateTime<Utc>>,
}

impl CatalogItem {
    /// Creates an item with only its identifier set.
    pub fn new(asin: impl Into<String>) -> Self {
        Self {
            asin: asin.into(),
            title: None,
            author: None,
            publisher: None,
            publication_date: None,
        }
    }
}

/// Records that an account's catalog includes an item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OwnershipLink {
    /// Owning account.
    pub account_id: AccountId,
    /// Linked item.
    pub asin: String,
}
