//! Device serial generation.

use sha1::{Digest, Sha1};
use uuid::Uuid;

/// Generates a device serial: the SHA-1 hex digest of a random UUID's
/// simple (dashless) form.
///
/// The result is always 40 lowercase hexadecimal characters.
pub fn generate_device_serial() -> String {
    let id = Uuid::new_v4();
    let digest = Sha1::digest(id.simple().to_string().as_bytes());
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn is_serial(s: &str) -> bool {
        s.len() == 40 && s.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
    }

    #[test]
    fn ten_thousand_serials_are_unique() {
        let serials: HashSet<String> = (0..10_000).map(|_| generate_device_serial()).collect();
        assert_eq!(serials.len(), 10_000);
        assert!(serials.iter().all(|s| is_serial(s)));
    }

    proptest! {
        #[test]
        fn serial_is_forty_lowercase_hex(_seed in any::<u64>()) {
            let serial = generate_device_serial();
            prop_assert!(is_serial(&serial), "bad serial {}", serial);
        }
    }
}
