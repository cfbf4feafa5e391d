//! Device key fixtures.
//!
//! Key generation is slow, so one key is generated per test binary and
//! shared.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::sync::OnceLock;

/// Modulus size of the fixture key.
pub const TEST_KEY_BITS: usize = 1024;

/// Returns the shared device key.
pub fn test_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| {
        RsaPrivateKey::new(&mut rand::thread_rng(), TEST_KEY_BITS)
            .expect("Failed to generate test key")
    })
}

/// Returns the public half of the shared device key.
pub fn test_public_key() -> RsaPublicKey {
    test_key().to_public_key()
}

/// The shared key as the service delivers it: base64 of PKCS#8 DER.
pub fn delivered_key() -> String {
    let der = test_key()
        .to_pkcs8_der()
        .expect("Failed to encode test key");
    STANDARD.encode(der.as_bytes())
}

/// The shared key as PKCS#8 PEM.
pub fn test_key_pem() -> String {
    test_key()
        .to_pkcs8_pem(LineEnding::LF)
        .expect("Failed to encode test key")
        .as_str()
        .to_owned()
}
