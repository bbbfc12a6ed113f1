// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare implementation of `DnsProvider` for the
// DDNS update endpoint.
//
// ## Behavior
//
// - ✅ One lookup and at most one write per hostname per request
// - ✅ No write when the record already holds the requested address
// - ✅ PATCH only the `content` field (name, TTL, proxy flag untouched)
// - ✅ HTTP timeout configured (30 seconds)
// - ✅ Specific error messages for HTTP status codes (401/403, 404, 429, 5xx)
// - ✅ Dry-run mode for safe testing
// - ❌ NO retry logic (a failed update is reported, the router polls again)
// - ❌ NO AAAA records
//
// ## Security Requirements
//
// - API token NEVER appears in logs or Debug output
// - API token is passed per call, from the endpoint configuration
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List DNS Records: GET `/zones/:zone_id/dns_records?type=A&name=...`
// - Patch DNS Record: PATCH `/zones/:zone_id/dns_records/:record_id`

pub mod models;

use async_trait::async_trait;
use ddns_core::traits::{DnsProvider, RecordUpdateOutcome};
use ddns_core::{Error, Result};
use models::{ApiEnvelope, DnsRecord, RecordPatch};
use reqwest::StatusCode;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Cloudflare DNS provider
///
/// Stateless apart from the pooled HTTP client, so one instance is shared by
/// every request and every concurrent hostname update.
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform the record lookup
/// - Log the intended PATCH payload
/// - **NOT** actually modify DNS records
#[derive(Clone)]
pub struct CloudflareProvider {
    /// HTTP client for API requests
    client: reqwest::Client,

    /// API base URL, without trailing slash
    base_url: String,

    /// Dry-run mode: if true, look records up but skip PATCH updates
    dry_run: bool,
}

impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("base_url", &self.base_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// # Parameters
    ///
    /// - `dry_run`: If true, perform lookups but skip PATCH updates
    pub fn new(dry_run: bool) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: CLOUDFLARE_API_BASE.to_string(),
            dry_run,
        })
    }

    /// Create a new Cloudflare provider (production/live mode)
    pub fn new_live() -> Result<Self> {
        Self::new(false)
    }

    /// Create a new Cloudflare provider (dry-run mode)
    pub fn new_dry_run() -> Result<Self> {
        Self::new(true)
    }

    /// Point the provider at a different API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Find the A record for a hostname
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records?type=A&name=home.example.com
    /// Authorization: Bearer <token>
    /// ```
    async fn lookup_record(
        &self,
        zone_id: &str,
        hostname: &str,
        api_token: &str,
    ) -> Result<DnsRecord> {
        tracing::debug!("Looking up A record: {}", hostname);

        let url = format!("{}/zones/{}/dns_records", self.base_url, zone_id);
        let response = self
            .client
            .get(&url)
            .query(&[("type", "A"), ("name", hostname)])
            .bearer_auth(api_token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| Error::lookup_failed(hostname, format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(Error::lookup_failed(
                hostname,
                describe_status(status, &error_text),
            ));
        }

        let body = response.text().await.map_err(|e| {
            Error::lookup_failed(hostname, format!("Failed to read response: {}", e))
        })?;
        let envelope: ApiEnvelope<Vec<DnsRecord>> = serde_json::from_str(&body).map_err(|e| {
            Error::lookup_failed(hostname, format!("Failed to parse response: {}", e))
        })?;

        if !envelope.success {
            return Err(Error::lookup_failed(
                hostname,
                format!("API reported failure: {}", envelope.errors_json()),
            ));
        }

        let record = envelope
            .result
            .and_then(|records| records.into_iter().next())
            .ok_or_else(|| {
                Error::lookup_failed(hostname, format!("DNS record not found: {}", body))
            })?;

        tracing::debug!("Found record ID: {}", record.id);
        Ok(record)
    }

    /// Replace the address of one record
    ///
    /// # API Call
    ///
    /// ```http
    /// PATCH /zones/:zone_id/dns_records/:record_id
    /// Authorization: Bearer <token>
    ///
    /// { "content": "203.0.113.5" }
    /// ```
    async fn patch_record(
        &self,
        zone_id: &str,
        record_id: &str,
        hostname: &str,
        new_ip: Ipv4Addr,
        api_token: &str,
    ) -> Result<()> {
        let url = format!("{}/zones/{}/dns_records/{}", self.base_url, zone_id, record_id);
        let payload = RecordPatch {
            content: new_ip.to_string(),
        };

        let response = self
            .client
            .patch(&url)
            .bearer_auth(api_token)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::update_failed(hostname, format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(Error::update_failed(
                hostname,
                describe_status(status, &error_text),
            ));
        }

        let envelope: ApiEnvelope<serde_json::Value> = response.json().await.map_err(|e| {
            Error::update_failed(hostname, format!("Failed to parse response: {}", e))
        })?;

        if !envelope.success {
            return Err(Error::update_failed(
                hostname,
                format!("DNS update failed: {}", envelope.errors_json()),
            ));
        }

        Ok(())
    }
}

/// Turn a non-success status into a readable failure description
fn describe_status(status: StatusCode, body: &str) -> String {
    match status.as_u16() {
        401 | 403 => format!(
            "Authentication failed: Invalid API token or insufficient permissions. Status: {} - {}",
            status, body
        ),
        404 => format!("Zone or record not found. Status: {} - {}", status, body),
        409 => format!(
            "Conflict: Record is being updated by another process. Status: {} - {}",
            status, body
        ),
        429 => format!("Rate limit exceeded. Status: {} - {}", status, body),
        500..=599 => format!("Cloudflare server error (transient): {} - {}", status, body),
        _ => format!("{} - {}", status, body),
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// Point an A record at a new address
    ///
    /// 1. Look the record up by type and exact name
    /// 2. Return unchanged if it already holds `new_ip`
    /// 3. Otherwise PATCH its content (skipped in dry-run mode)
    async fn update_record(
        &self,
        zone_id: &str,
        hostname: &str,
        new_ip: Ipv4Addr,
        api_token: &str,
    ) -> Result<RecordUpdateOutcome> {
        tracing::info!(
            "Updating Cloudflare DNS record: {} -> {} [mode: {}]",
            hostname,
            new_ip,
            if self.dry_run { "DRY-RUN" } else { "LIVE" }
        );

        let record = self.lookup_record(zone_id, hostname, api_token).await?;

        if record.content == new_ip.to_string() {
            tracing::info!(
                "DNS record {} already has IP {}, skipping update",
                hostname,
                new_ip
            );
            return Ok(RecordUpdateOutcome::unchanged(hostname, new_ip));
        }

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PATCH for record {} ({}) with payload: {}",
                record.id,
                hostname,
                serde_json::json!({ "content": new_ip.to_string() })
            );
            return Ok(RecordUpdateOutcome::updated(hostname, new_ip, record.content));
        }

        self.patch_record(zone_id, &record.id, hostname, new_ip, api_token)
            .await?;

        tracing::info!(
            "Updated DNS record {} from {} to {}",
            hostname,
            record.content,
            new_ip
        );
        Ok(RecordUpdateOutcome::updated(hostname, new_ip, record.content))
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_run_mode() {
        let provider_dry = CloudflareProvider::new_dry_run().unwrap();
        let provider_live = CloudflareProvider::new_live().unwrap();

        assert!(provider_dry.is_dry_run(), "Dry-run provider should have dry_run=true");
        assert!(!provider_live.is_dry_run(), "Live provider should have dry_run=false");
    }

    #[test]
    fn test_default_base_url() {
        let provider = CloudflareProvider::new(false).unwrap();
        assert_eq!(provider.base_url(), "https://api.cloudflare.com/client/v4");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let provider = CloudflareProvider::new(false)
            .unwrap()
            .with_base_url("http://127.0.0.1:9999/client/v4/");
        assert_eq!(provider.base_url(), "http://127.0.0.1:9999/client/v4");
    }

    #[test]
    fn test_provider_name() {
        let provider = CloudflareProvider::new(false).unwrap();
        assert_eq!(provider.provider_name(), "cloudflare");
    }

    #[test]
    fn test_debug_output() {
        let provider = CloudflareProvider::new(true).unwrap();
        let debug_str = format!("{:?}", provider);
        assert!(debug_str.contains("CloudflareProvider"));
        assert!(debug_str.contains("dry_run: true"));
    }

    #[test]
    fn test_describe_status() {
        let auth = describe_status(StatusCode::FORBIDDEN, "denied");
        assert!(auth.starts_with("Authentication failed"));
        assert!(auth.contains("denied"));

        let transient = describe_status(StatusCode::BAD_GATEWAY, "upstream");
        assert!(transient.contains("transient"));

        let limited = describe_status(StatusCode::TOO_MANY_REQUESTS, "");
        assert!(limited.starts_with("Rate limit exceeded"));

        let other = describe_status(StatusCode::BAD_REQUEST, "{\"errors\":[]}");
        assert_eq!(other, "400 Bad Request - {\"errors\":[]}");
    }
}
