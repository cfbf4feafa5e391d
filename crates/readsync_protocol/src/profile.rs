//! Device profile and credentials sent during registration.

use crate::error::{ProtocolError, ProtocolResult};
use serde::Serialize;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// The fixed description of the client device presented to the
/// registration endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceProfile {
    /// Device type code.
    pub device_type: String,
    /// Display name template. The service expands the placeholders.
    pub device_name: String,
    /// Product ID.
    pub pid: String,
    /// Format tag for the delivered device key.
    pub cert_format: String,
    /// Client software version.
    pub software_version: String,
    /// OS version.
    pub os_version: String,
    /// Device model string.
    pub device_model: String,
}

#[derive(Serialize)]
struct RegistrationQuery<'a> {
    #[serde(rename = "deviceType")]
    device_type: &'a str,
    #[serde(rename = "deviceSerialNumber")]
    device_serial_number: &'a str,
    #[serde(rename = "deviceName")]
    device_name: &'a str,
    pid: &'a str,
    #[serde(rename = "certFormat")]
    cert_format: &'a str,
    #[serde(rename = "softwareVersion")]
    software_version: &'a str,
    os_version: &'a str,
    device_model: &'a str,
}

impl DeviceProfile {
    /// Builds the URL-encoded registration query string for a device.
    pub fn registration_query(&self, device_serial: &str) -> ProtocolResult<String> {
        let query = RegistrationQuery {
            device_type: &self.device_type,
            device_serial_number: device_serial,
            device_name: &self.device_name,
            pid: &self.pid,
            cert_format: &self.cert_format,
            software_version: &self.software_version,
            os_version: &self.os_version,
            device_model: &self.device_model,
        };
        serde_urlencoded::to_string(&query).map_err(|e| ProtocolError::Encoding(e.to_string()))
    }
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            device_type: "A3VNNDO1I14V03".into(),
            device_name: "%FIRST_NAME%'s %DUPE_STRATEGY_1ST% ReadSync Client".into(),
            pid: "9D184DE1".into(),
            cert_format: "B64/PKCS#8".into(),
            software_version: "81170056".into(),
            os_version: "2.2".into(),
            device_model: "Nexus One HTTP/1.1".into(),
        }
    }
}

/// User credentials for registration. Wiped from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    /// Creates a credential pair.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Returns the email address.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Encodes the `application/x-www-form-urlencoded` request body.
    pub fn form_body(&self) -> ProtocolResult<Zeroizing<String>> {
        let fields = [("email", self.email.as_str()), ("password", self.password.as_str())];
        serde_urlencoded::to_string(fields)
            .map(Zeroizing::new)
            .map_err(|e| ProtocolError::Encoding(e.to_string()))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_query_uses_wire_names() {
        let serial = "a".repeat(40);
        let query = DeviceProfile::default().registration_query(&serial).unwrap();

        assert!(query.starts_with("deviceType=A3VNNDO1I14V03&"));
        assert!(query.contains(&format!("deviceSerialNumber={serial}")));
        assert!(query.contains("pid=9D184DE1"));
        assert!(query.contains("certFormat=B64%2FPKCS%238"));
        assert!(query.contains("softwareVersion=81170056"));
        assert!(query.contains("os_version=2.2"));
        assert!(query.contains("device_model=Nexus+One+HTTP%2F1.1"));
        assert!(query.contains("deviceName=%25FIRST_NAME%25%27s+"));
    }

    #[test]
    fn form_body_encodes_credentials() {
        let credentials = Credentials::new("reader@example.com", "p&ss word");
        let body = credentials.form_body().unwrap();
        assert_eq!(body.as_str(), "email=reader%40example.com&password=p%26ss+word");
    }

    #[test]
    fn debug_hides_password() {
        let credentials = Credentials::new("reader@example.com", "hunter2");
        let rendered = format!("{:?}", credentials);
        assert!(rendered.contains("reader@example.com"));
        assert!(!rendered.contains("hunter2"));
    }
}
