//! Account fixtures.

use crate::keys::{delivered_key, test_key_pem};
use readsync_store::{Account, AccountId};

/// Serial used by fixture accounts.
pub const TEST_SERIAL: &str = "da39a3ee5e6b4b0d3255bfef95601890afd80709";

/// Token used by fixture accounts.
pub const TEST_TOKEN: &str = "{enc:dGVzdA==}{key:a2V5}{iv:aXY=}{name:QURQVG9rZW5FbmNyeXB0aW9uS2V5}";

/// A freshly created, unregistered account.
pub fn new_account(id: u64) -> Account {
    Account::new(AccountId::new(id), TEST_SERIAL)
}

/// A registered account whose key has not been converted.
pub fn registered_account(id: u64) -> Account {
    let mut account = new_account(id);
    account.complete_registration(TEST_TOKEN, delivered_key());
    account
}

/// A registered account with a cached signing key.
pub fn ready_account(id: u64) -> Account {
    let mut account = registered_account(id);
    account.set_signing_key(test_key_pem());
    account
}
