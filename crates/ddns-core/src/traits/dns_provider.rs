// # DNS Provider Trait
//
// Defines the interface for pointing one A record at a new address via a
// provider API.
//
// ## Implementations
//
// - Cloudflare: `ddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::DnsProvider;
//
// let outcome = provider
//     .update_record("zone", "home.example.com", Ipv4Addr::new(203, 0, 113, 5), "token")
//     .await?;
//
// if outcome.updated {
//     println!("{} moved from {:?}", outcome.hostname, outcome.current_ip);
// }
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Outcome of updating one hostname during one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordUpdateOutcome {
    /// The hostname whose A record was targeted
    pub hostname: String,
    /// The address the router reported
    pub requested_ip: Ipv4Addr,
    /// The record's value before this request, if it was read
    pub current_ip: Option<String>,
    /// Whether a write was issued
    pub updated: bool,
    /// Failure description, if the update failed
    pub error: Option<String>,
}

impl RecordUpdateOutcome {
    /// Record already had the requested address (no write issued)
    pub fn unchanged(hostname: impl Into<String>, ip: Ipv4Addr) -> Self {
        Self {
            hostname: hostname.into(),
            requested_ip: ip,
            current_ip: Some(ip.to_string()),
            updated: false,
            error: None,
        }
    }

    /// Record was rewritten from `previous` to `ip`
    pub fn updated(hostname: impl Into<String>, ip: Ipv4Addr, previous: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            requested_ip: ip,
            current_ip: Some(previous.into()),
            updated: true,
            error: None,
        }
    }

    /// Update failed; nothing is known about the record's value
    pub fn failed(hostname: impl Into<String>, ip: Ipv4Addr, error: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            requested_ip: ip,
            current_ip: None,
            updated: false,
            error: Some(error.into()),
        }
    }

    /// Whether the hostname now points at the requested address
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Trait for DNS provider implementations
///
/// # Thread Safety
///
/// Implementations must be thread-safe: the orchestrator calls
/// `update_record` for every configured hostname concurrently.
///
/// # Contract
///
/// - Exactly one lookup and at most one write per call
/// - No retries, no backoff, no caching between calls
/// - No write when the record already holds the requested address
/// - Failures are returned as [`crate::Error::RecordLookupFailed`] or
///   [`crate::Error::RecordUpdateFailed`], never panics
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Point the A record `hostname` in `zone_id` at `new_ip`
    ///
    /// # Idempotency
    ///
    /// Calling this repeatedly with the same IP is safe: every call after the
    /// first successful one returns an outcome with `updated == false`.
    ///
    /// # Returns
    ///
    /// - `Ok(RecordUpdateOutcome)`: The record holds `new_ip`
    /// - `Err(Error)`: Lookup or write failed
    async fn update_record(
        &self,
        zone_id: &str,
        hostname: &str,
        new_ip: Ipv4Addr,
        api_token: &str,
    ) -> Result<RecordUpdateOutcome, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
