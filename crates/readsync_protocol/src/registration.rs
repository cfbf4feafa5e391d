//! Registration response parsing.

use crate::error::{ProtocolError, ProtocolResult};
use crate::xml::parse_document;
use std::fmt;

/// What a successful registration delivers.
#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    /// Authentication token sent with every sync request.
    pub adp_token: String,
    /// Device private key: base64 of an unencrypted PKCS#8 DER container.
    pub device_private_key: String,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("adp_token", &"<redacted>")
            .field("device_private_key", &"<redacted>")
            .finish()
    }
}

/// Interprets the body of a `200 OK` registration response.
///
/// # Errors
///
/// - [`ProtocolError::Authentication`] if the service reports
///   `customer_not_found`, either as the root tag or as a child of it
/// - [`ProtocolError::ErrorResponse`] if the root tag is `error`
/// - [`ProtocolError::Malformed`] if the document cannot be parsed or
///   lacks `adp_token` / `device_private_key`
pub fn parse_registration_response(body: &[u8]) -> ProtocolResult<Registration> {
    let root = parse_document(body)?;

    if root.name == "customer_not_found" || root.child("customer_not_found").is_some() {
        return Err(ProtocolError::Authentication(
            "invalid username or password".into(),
        ));
    }

    if root.name == "error" {
        let detail = root.text.trim();
        return Err(ProtocolError::ErrorResponse(if detail.is_empty() {
            "unknown error".into()
        } else {
            detail.to_string()
        }));
    }

    let adp_token = root
        .find_text("adp_token")
        .ok_or_else(|| ProtocolError::malformed("registration response lacks adp_token"))?;
    let device_private_key = root.find_text("device_private_key").ok_or_else(|| {
        ProtocolError::malformed("registration response lacks device_private_key")
    })?;

    Ok(Registration {
        adp_token: adp_token.to_string(),
        device_private_key: device_private_key.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_success_document() {
        let body = b"<response>\
            <adp_token>{enc:abc}{key:def}</adp_token>\
            <device_private_key>MIIBVQ==</device_private_key>\
            </response>";
        let registration = parse_registration_response(body).unwrap();
        assert_eq!(registration.adp_token, "{enc:abc}{key:def}");
        assert_eq!(registration.device_private_key, "MIIBVQ==");
    }

    #[test]
    fn customer_not_found_root_is_authentication_error() {
        let result = parse_registration_response(b"<customer_not_found/>");
        assert!(matches!(result, Err(ProtocolError::Authentication(_))));
    }

    #[test]
    fn customer_not_found_child_is_authentication_error() {
        let result = parse_registration_response(b"<response><customer_not_found/></response>");
        assert!(matches!(result, Err(ProtocolError::Authentication(_))));
    }

    #[test]
    fn error_root_is_error_response() {
        let result = parse_registration_response(b"<error/>");
        assert_eq!(
            result.unwrap_err(),
            ProtocolError::ErrorResponse("unknown error".into())
        );
    }

    #[test]
    fn missing_fields_are_malformed() {
        let result = parse_registration_response(b"<response><adp_token>t</adp_token></response>");
        assert!(matches!(result, Err(ProtocolError::Malformed(_))));

        let result = parse_registration_response(b"not xml at all <");
        assert!(matches!(result, Err(ProtocolError::Malformed(_))));
    }

    #[test]
    fn debug_hides_secrets() {
        let registration = Registration {
            adp_token: "token-value".into(),
            device_private_key: "key-value".into(),
        };
        let rendered = format!("{:?}", registration);
        assert!(!rendered.contains("token-value"));
        assert!(!rendered.contains("key-value"));
    }
}
