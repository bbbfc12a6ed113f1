//! Cloudflare API v4 wire types

use serde::{Deserialize, Serialize};

/// Envelope wrapping every Cloudflare API response
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
}

impl<T> ApiEnvelope<T> {
    /// The `errors` array as compact JSON, for error messages
    pub fn errors_json(&self) -> String {
        serde_json::to_string(&self.errors).unwrap_or_else(|_| "[]".to_string())
    }
}

/// A DNS record as returned by `GET /zones/:zone_id/dns_records`
#[derive(Debug, Clone, Deserialize)]
pub struct DnsRecord {
    pub id: String,
    pub content: String,
}

/// Body of `PATCH /zones/:zone_id/dns_records/:record_id`
///
/// Only the address changes; name, TTL and proxy settings are left alone.
#[derive(Debug, Serialize)]
pub struct RecordPatch {
    pub content: String,
}
