//! Test doubles and common utilities for contract tests
//!
//! `MockDnsProvider` keeps an in-memory zone and counts lookups and writes,
//! so tests can assert how many provider calls a request caused.

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::traits::{DnsProvider, RecordUpdateOutcome};
use ddns_core::{UpdateConfig, UpdateRequest};
use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Barrier;

pub const USERNAME: &str = "router";
pub const PASSWORD: &str = "s3cret";

/// A mock DnsProvider backed by an in-memory zone
#[derive(Clone, Default)]
pub struct MockDnsProvider {
    /// Current A record values by hostname
    records: Arc<Mutex<HashMap<String, String>>>,
    /// Hostnames whose lookup fails
    failing_lookups: Arc<Mutex<HashSet<String>>>,
    /// Hostnames whose write fails
    failing_writes: Arc<Mutex<HashSet<String>>>,
    /// Hostnames whose update is delayed
    delays: Arc<Mutex<HashMap<String, Duration>>>,
    /// All calls wait here before proceeding, if set
    barrier: Arc<Mutex<Option<Arc<Barrier>>>>,
    lookup_count: Arc<AtomicUsize>,
    write_count: Arc<AtomicUsize>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record with its current value
    pub fn with_record(self, hostname: &str, content: &str) -> Self {
        self.records
            .lock()
            .unwrap()
            .insert(hostname.to_string(), content.to_string());
        self
    }

    pub fn fail_lookup_for(self, hostname: &str) -> Self {
        self.failing_lookups
            .lock()
            .unwrap()
            .insert(hostname.to_string());
        self
    }

    pub fn fail_write_for(self, hostname: &str) -> Self {
        self.failing_writes
            .lock()
            .unwrap()
            .insert(hostname.to_string());
        self
    }

    pub fn delay_for(self, hostname: &str, delay: Duration) -> Self {
        self.delays
            .lock()
            .unwrap()
            .insert(hostname.to_string(), delay);
        self
    }

    /// Make every update wait until `parties` updates are in flight
    pub fn rendezvous(self, parties: usize) -> Self {
        *self.barrier.lock().unwrap() = Some(Arc::new(Barrier::new(parties)));
        self
    }

    pub fn lookup_count(&self) -> usize {
        self.lookup_count.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.write_count.load(Ordering::SeqCst)
    }

    pub fn record(&self, hostname: &str) -> Option<String> {
        self.records.lock().unwrap().get(hostname).cloned()
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn update_record(
        &self,
        _zone_id: &str,
        hostname: &str,
        new_ip: Ipv4Addr,
        _api_token: &str,
    ) -> Result<RecordUpdateOutcome> {
        let barrier = self.barrier.lock().unwrap().clone();
        if let Some(barrier) = barrier {
            barrier.wait().await;
        }

        let delay = self.delays.lock().unwrap().get(hostname).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.lookup_count.fetch_add(1, Ordering::SeqCst);

        if self.failing_lookups.lock().unwrap().contains(hostname) {
            return Err(Error::lookup_failed(hostname, "500 - lookup unavailable"));
        }

        let current = self
            .records
            .lock()
            .unwrap()
            .get(hostname)
            .cloned()
            .ok_or_else(|| Error::lookup_failed(hostname, "DNS record not found"))?;

        if current == new_ip.to_string() {
            return Ok(RecordUpdateOutcome::unchanged(hostname, new_ip));
        }

        if self.failing_writes.lock().unwrap().contains(hostname) {
            return Err(Error::update_failed(hostname, "[{\"code\":1000}]"));
        }

        self.write_count.fetch_add(1, Ordering::SeqCst);
        self.records
            .lock()
            .unwrap()
            .insert(hostname.to_string(), new_ip.to_string());

        Ok(RecordUpdateOutcome::updated(hostname, new_ip, current))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A complete configuration for the given hostnames
pub fn config_for(hostnames: &[&str]) -> UpdateConfig {
    UpdateConfig::new(
        "zone-123",
        "token-abc",
        hostnames.iter().map(|s| s.to_string()).collect(),
    )
    .with_credentials(USERNAME, PASSWORD)
}

/// An authenticated POST carrying `myip`
pub fn authed_update(myip: &str) -> UpdateRequest {
    UpdateRequest::post()
        .with_basic_auth(USERNAME, PASSWORD)
        .with_hostname("ignored.example.com")
        .with_myip(myip)
}
