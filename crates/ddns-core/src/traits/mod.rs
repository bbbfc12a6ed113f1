//! Core traits for the DDNS update endpoint
//!
//! - [`DnsProvider`]: Update A records via provider APIs

pub mod dns_provider;

pub use dns_provider::{DnsProvider, RecordUpdateOutcome};
