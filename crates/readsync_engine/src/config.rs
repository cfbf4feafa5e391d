//! Configuration for the sync engine.

use readsync_protocol::DeviceProfile;
use std::time::Duration;

/// Endpoints and client identity used by the engine.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// URL scheme for both endpoints.
    pub scheme: String,
    /// Host of the registration endpoint.
    pub registration_host: String,
    /// Path of the registration endpoint.
    pub registration_path: String,
    /// Host of the sync endpoint.
    pub sync_host: String,
    /// Path of the sync endpoint.
    pub sync_path: String,
    /// User-Agent sent with every request.
    pub user_agent: String,
    /// Device profile presented at registration.
    pub device_profile: DeviceProfile,
    /// Request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Creates a configuration pointing at the production service.
    pub fn new() -> Self {
        Self {
            scheme: "https".into(),
            registration_host: "firs-ta-g7g.amazon.com".into(),
            registration_path: "/FirsProxy/registerDevice".into(),
            sync_host: "todo-ta-g7g.amazon.com".into(),
            sync_path: "/FionaTodoListProxy/syncMetaData".into(),
            user_agent: "Dalvik/1.2.0".into(),
            device_profile: DeviceProfile::default(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets the URL scheme.
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Sets the registration host.
    pub fn with_registration_host(mut self, host: impl Into<String>) -> Self {
        self.registration_host = host.into();
        self
    }

    /// Sets the sync host.
    pub fn with_sync_host(mut self, host: impl Into<String>) -> Self {
        self.sync_host = host.into();
        self
    }

    /// Sets the User-Agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the device profile.
    pub fn with_device_profile(mut self, profile: DeviceProfile) -> Self {
        self.device_profile = profile;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full registration URL for an encoded device profile query.
    pub fn registration_url(&self, query: &str) -> String {
        format!(
            "{}://{}{}?{}",
            self.scheme, self.registration_host, self.registration_path, query
        )
    }

    /// Full sync URL for a path that may carry a query string.
    pub fn sync_url(&self, path_and_query: &str) -> String {
        format!("{}://{}{}", self.scheme, self.sync_host, path_and_query)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}
