//! Configuration types for the DDNS update endpoint
//!
//! The configuration is supplied by the hosting process (see `ddnsd`) and is
//! read-only for the lifetime of every request. It is passed explicitly into
//! the handler rather than read from ambient process state.

/// Configuration for the update endpoint
///
/// # Security
///
/// The `Debug` implementation does NOT expose the API token or the expected
/// password.
#[derive(Clone, Default)]
pub struct UpdateConfig {
    /// Cloudflare zone identifier
    pub zone_id: String,

    /// Cloudflare API token (Zone:DNS:Edit)
    /// ⚠️ NEVER log this value
    pub api_token: String,

    /// A records to keep pointed at the reported address, in order
    pub dns_entries: Vec<String>,

    /// Basic-auth username the router must present
    pub expected_username: String,

    /// Basic-auth password the router must present
    /// ⚠️ NEVER log this value
    pub expected_password: String,
}

impl std::fmt::Debug for UpdateConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateConfig")
            .field("zone_id", &self.zone_id)
            .field("api_token", &"<REDACTED>")
            .field("dns_entries", &self.dns_entries)
            .field("expected_username", &self.expected_username)
            .field("expected_password", &"<REDACTED>")
            .finish()
    }
}

impl UpdateConfig {
    /// Create a new configuration
    pub fn new(
        zone_id: impl Into<String>,
        api_token: impl Into<String>,
        dns_entries: Vec<String>,
    ) -> Self {
        Self {
            zone_id: zone_id.into(),
            api_token: api_token.into(),
            dns_entries,
            expected_username: String::new(),
            expected_password: String::new(),
        }
    }

    /// Set the Basic-auth credentials the router must present
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.expected_username = username.into();
        self.expected_password = password.into();
        self
    }

    /// Split a comma-separated hostname list
    ///
    /// Entries are trimmed and blank entries dropped, so `"a.com, ,b.com,"`
    /// yields `["a.com", "b.com"]`.
    pub fn parse_dns_entries(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Whether Basic-auth credentials have been configured
    pub fn has_credentials(&self) -> bool {
        !self.expected_username.is_empty() && !self.expected_password.is_empty()
    }

    /// Validate that DNS updates can be attempted
    ///
    /// Credentials are not checked here: missing credentials make every
    /// request unauthorized instead.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.zone_id.trim().is_empty() || self.api_token.trim().is_empty() {
            return Err(crate::Error::config("Missing ZONE_ID or CF_API_TOKEN configuration"));
        }

        if self.dns_entries.is_empty() {
            return Err(crate::Error::config("No DNS entries configured"));
        }

        Ok(())
    }
}
