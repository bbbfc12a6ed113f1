// # ddns-core
//
// Core library for the DDNS update endpoint.
//
// A router with no static public address reports its current IPv4 address
// over HTTP; this library authenticates the report and pushes the address to
// every configured A record through a DNS provider.
//
// ## Architecture Overview
//
// - **validator**: Method, credential and `myip` checks on an `UpdateRequest`
// - **DnsProvider**: Trait for the lookup-then-patch update of one record
// - **UpdateOrchestrator**: Concurrent fan-out to every hostname, all-settled
// - **DdnsResponse**: The body tokens router firmware understands
//
// ## Design Principles
//
// 1. **Stateless**: Nothing survives a request
// 2. **Transport-agnostic**: No HTTP server types in this crate
// 3. **Explicit configuration**: `UpdateConfig` is passed in, never global
// 4. **Always answer**: Every failure maps to a response token

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod response;
pub mod traits;
pub mod validator;

// Re-export core types for convenience
pub use config::UpdateConfig;
pub use error::{Error, Result};
pub use orchestrator::{UpdateOrchestrator, UpdateSummary};
pub use response::DdnsResponse;
pub use traits::{DnsProvider, RecordUpdateOutcome};
pub use validator::{Rejection, ReportedIp, UpdateRequest};
