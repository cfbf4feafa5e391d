//! Request signing.
//!
//! Every sync request carries a digest header:
//!
//! ```text
//! canonical = {METHOD}\n{PATH}\n{TIMESTAMP}\n{BODY}\n{ADP_TOKEN}
//! header    = base64(RSA-PKCS1-v1.5(SHA-256(canonical))) ":" TIMESTAMP
//! ```
//!
//! The padded block holds the bare SHA-256 digest (no DigestInfo prefix).
//! Timestamps are UTC with second precision, `YYYY-MM-DDTHH:MM:SSZ`.

use crate::error::{ProtocolError, ProtocolResult};
use crate::keys::signing_key_from_pem;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use readsync_store::Account;
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

/// `strftime` format of the signing timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Formats a signing timestamp.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Builds the string whose digest is signed.
pub fn canonical_string(
    method: &str,
    path: &str,
    timestamp: &str,
    body: &str,
    adp_token: &str,
) -> String {
    format!("{method}\n{path}\n{timestamp}\n{body}\n{adp_token}")
}

/// Signs a request with an already loaded key and returns the header value.
pub fn sign_with_key(
    key: &RsaPrivateKey,
    adp_token: &str,
    method: &str,
    path: &str,
    body: &str,
    timestamp: &DateTime<Utc>,
) -> ProtocolResult<String> {
    let timestamp = format_timestamp(timestamp);
    let digest = Sha256::digest(canonical_string(method, path, &timestamp, body, adp_token));
    let signature = key
        .sign(Pkcs1v15Sign::new_unprefixed(), &digest)
        .map_err(|e| ProtocolError::Signing(e.to_string()))?;
    Ok(format!("{}:{}", STANDARD.encode(signature), timestamp))
}

/// Signs a request on behalf of `account` and returns the digest header
/// value `<base64-signature>:<timestamp>`.
///
/// The caller supplies `timestamp`, normally `Utc::now()` taken right
/// before sending. For identical inputs the output is identical.
///
/// # Errors
///
/// Returns [`ProtocolError::Signing`] if the account has no token, has
/// no converted signing key, or the cached key does not decode.
pub fn sign_header(
    account: &Account,
    method: &str,
    path: &str,
    body: &str,
    timestamp: &DateTime<Utc>,
) -> ProtocolResult<String> {
    let adp_token = account.adp_token().ok_or_else(|| {
        ProtocolError::Signing(format!("account {} is not registered", account.id()))
    })?;
    let pem = account.signing_key_pem().ok_or_else(|| {
        ProtocolError::Signing(format!(
            "account {} has no signing key, convert the device key first",
            account.id()
        ))
    })?;

    let key = signing_key_from_pem(pem)?;
    sign_with_key(&key, adp_token, method, path, body, timestamp)
}

/// Checks a digest header against the public half of the device key.
///
/// Returns the timestamp carried by the header.
///
/// # Errors
///
/// Returns [`ProtocolError::Signing`] if the header is malformed or the
/// signature does not match the request.
pub fn verify_header(
    public_key: &RsaPublicKey,
    header: &str,
    adp_token: &str,
    method: &str,
    path: &str,
    body: &str,
) -> ProtocolResult<String> {
    let (signature, timestamp) = header
        .split_once(':')
        .ok_or_else(|| ProtocolError::Signing("digest header lacks a timestamp".into()))?;
    let signature = STANDARD
        .decode(signature)
        .map_err(|e| ProtocolError::Signing(format!("signature is not base64: {e}")))?;

    let digest = Sha256::digest(canonical_string(method, path, timestamp, body, adp_token));
    public_key
        .verify(Pkcs1v15Sign::new_unprefixed(), &digest, &signature)
        .map_err(|_| ProtocolError::Signing("signature does not match request".into()))?;

    Ok(timestamp.to_string())
}
