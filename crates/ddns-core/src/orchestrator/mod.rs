//! Update orchestration
//!
//! The UpdateOrchestrator is responsible for:
//! - Refusing to touch DNS when the configuration is incomplete
//! - Fanning one validated address out to every configured hostname
//! - Waiting for every update to settle
//! - Reducing the outcomes to a single response token
//!
//! ## Architecture
//!
//! ```text
//!                    ┌────────────────────┐
//!  UpdateRequest ───▶│  validator         │── Rejection ──▶ 405 / 401 / 400
//!                    └────────────────────┘
//!                              │ ReportedIp
//!                              ▼
//!                    ┌────────────────────┐
//!                    │ UpdateOrchestrator │── incomplete config ──▶ 911
//!                    └────────────────────┘
//!                              │ one task per hostname
//!         ┌────────────────────┼────────────────────┐
//!         ▼                    ▼                    ▼
//!  ┌─────────────┐      ┌─────────────┐      ┌─────────────┐
//!  │ DnsProvider │      │ DnsProvider │      │ DnsProvider │
//!  └─────────────┘      └─────────────┘      └─────────────┘
//!         └────────────────────┼────────────────────┘
//!                              ▼  all settled
//!                    good <myip>  |  dnserr
//! ```
//!
//! ## Failure semantics
//!
//! Partial failure is reported as total failure (`dnserr`), but records that
//! were updated stay updated. There is no rollback.

use crate::config::UpdateConfig;
use crate::response::DdnsResponse;
use crate::traits::{DnsProvider, RecordUpdateOutcome};
use crate::validator::{self, ReportedIp, UpdateRequest};
use futures::future::join_all;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Settled outcomes of one fan-out, in configuration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateSummary {
    /// The address that was pushed
    pub ip: Ipv4Addr,
    /// One outcome per configured hostname
    pub outcomes: Vec<RecordUpdateOutcome>,
}

impl UpdateSummary {
    /// Whether every hostname now points at the address
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(RecordUpdateOutcome::is_success)
    }

    /// Outcomes that failed
    pub fn failures(&self) -> impl Iterator<Item = &RecordUpdateOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// Number of records that were actually rewritten
    pub fn updated_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.updated).count()
    }

    /// Reduce to the router-facing response, echoing `myip` on success
    pub fn to_response(&self, myip: &str) -> DdnsResponse {
        if self.all_succeeded() {
            DdnsResponse::Good(myip.to_string())
        } else {
            DdnsResponse::DnsError
        }
    }
}

/// Fans a validated address out to every configured A record
///
/// Cloning is cheap; the provider is shared behind an `Arc`.
#[derive(Clone)]
pub struct UpdateOrchestrator {
    provider: Arc<dyn DnsProvider>,
}

impl std::fmt::Debug for UpdateOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateOrchestrator")
            .field("provider", &self.provider.provider_name())
            .finish()
    }
}

impl UpdateOrchestrator {
    /// Create a new orchestrator around a provider
    pub fn new(provider: Arc<dyn DnsProvider>) -> Self {
        Self { provider }
    }

    /// Handle one inbound request end to end
    ///
    /// Always produces a response; nothing escapes as an error.
    pub async fn handle(&self, request: &UpdateRequest, config: &UpdateConfig) -> DdnsResponse {
        match validator::validate(request, config) {
            Ok(reported) => self.respond(config, &reported).await,
            Err(rejection) => rejection.into(),
        }
    }

    /// Update every configured hostname and map the result to a response
    pub async fn respond(&self, config: &UpdateConfig, reported: &ReportedIp) -> DdnsResponse {
        if let Err(e) = config.validate() {
            error!("{}", e);
            return DdnsResponse::ConfigError;
        }

        let summary = self.update_all(config, reported.addr).await;

        if summary.all_succeeded() {
            info!(
                "Successfully updated {} DNS records to {} ({} changed)",
                summary.outcomes.len(),
                reported.addr,
                summary.updated_count()
            );
        } else {
            let failures: Vec<_> = summary.failures().collect();
            error!("Failed to update {} DNS records", failures.len());
            for failure in failures {
                error!(
                    "  {}: {}",
                    failure.hostname,
                    failure.error.as_deref().unwrap_or("unknown error")
                );
            }
        }

        summary.to_response(&reported.raw)
    }

    /// Dispatch one update per configured hostname and wait for all of them
    ///
    /// Every update runs as its own task. A failing or panicking update never
    /// cancels its siblings; it becomes a failed outcome instead.
    pub async fn update_all(&self, config: &UpdateConfig, ip: Ipv4Addr) -> UpdateSummary {
        let handles: Vec<_> = config
            .dns_entries
            .iter()
            .map(|hostname| {
                let provider = Arc::clone(&self.provider);
                let zone_id = config.zone_id.clone();
                let api_token = config.api_token.clone();
                let hostname = hostname.clone();

                tokio::spawn(async move {
                    debug!("Dispatching update for {}", hostname);
                    match provider
                        .update_record(&zone_id, &hostname, ip, &api_token)
                        .await
                    {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            warn!("Update for {} failed: {}", hostname, e);
                            RecordUpdateOutcome::failed(hostname, ip, e.to_string())
                        }
                    }
                })
            })
            .collect();

        let outcomes = join_all(handles)
            .await
            .into_iter()
            .zip(&config.dns_entries)
            .map(|(joined, hostname)| {
                joined.unwrap_or_else(|e| {
                    error!("Update task for {} did not complete: {}", hostname, e);
                    RecordUpdateOutcome::failed(
                        hostname.clone(),
                        ip,
                        format!("update task failed: {}", e),
                    )
                })
            })
            .collect();

        UpdateSummary { ip, outcomes }
    }
}
