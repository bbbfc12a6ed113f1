// # ddnsd - DDNS update endpoint daemon
//
// This daemon is a THIN integration layer:
// - Reading configuration from environment variables
// - Initializing tracing and the runtime
// - Wiring the Cloudflare provider into the update endpoint
// - Serving until SIGTERM/SIGINT
//
// All validation and update logic lives in ddns-core.
//
// ## Configuration
//
// ### DNS
// - `ZONE_ID`: Cloudflare zone ID
// - `CF_API_TOKEN`: Cloudflare API token (Zone:DNS:Edit)
// - `DNS_ENTRIES`: Comma-separated list of A records to update
// - `CF_API_BASE_URL`: API base URL override (optional)
// - `DDNS_MODE`: `dry-run` to look records up without changing them
//
// ### Authentication
// - `DDNS_USERNAME`: Basic-auth username the router sends
// - `DDNS_PASSWORD`: Basic-auth password the router sends
//
// ### Daemon
// - `DDNS_LISTEN_ADDR`: Address to listen on (default 0.0.0.0:8080)
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// Missing DNS settings do not stop the daemon: every authenticated update
// is answered with `911` until they are provided.
//
// ## Example
//
// ```bash
// export ZONE_ID=023e105f4ecef8ad9ca31a8372d0c353
// export CF_API_TOKEN=your_token
// export DNS_ENTRIES=home.example.com,vpn.example.com
// export DDNS_USERNAME=fritzbox
// export DDNS_PASSWORD=change-me
//
// ddnsd
// ```
//
// Router update URL:
// `https://ddns.example.com/?hostname=<domain>&myip=<ipaddr>`

use anyhow::Result;
use ddns_core::{UpdateConfig, UpdateOrchestrator};
use ddns_provider_cloudflare::CloudflareProvider;
use ddns_server::AppState;
use std::env;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Default address to listen on
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Daemon configuration
#[derive(Debug)]
struct Config {
    update: UpdateConfig,
    api_base_url: Option<String>,
    dry_run: bool,
    listen_addr: String,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        let update = UpdateConfig::new(
            env::var("ZONE_ID").unwrap_or_default(),
            env::var("CF_API_TOKEN").unwrap_or_default(),
            UpdateConfig::parse_dns_entries(&env::var("DNS_ENTRIES").unwrap_or_default()),
        )
        .with_credentials(
            env::var("DDNS_USERNAME").unwrap_or_default(),
            env::var("DDNS_PASSWORD").unwrap_or_default(),
        );

        Self {
            update,
            api_base_url: env::var("CF_API_BASE_URL").ok().filter(|s| !s.is_empty()),
            dry_run: env::var("DDNS_MODE")
                .unwrap_or_default()
                .eq_ignore_ascii_case("dry-run"),
            listen_addr: env::var("DDNS_LISTEN_ADDR")
                .unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string()),
            log_level: env::var("DDNS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }

    /// Validate daemon settings
    ///
    /// DNS and credential settings are not fatal here; see
    /// [`Config::report_update_settings`].
    fn validate(&self) -> Result<SocketAddr> {
        let addr: SocketAddr = self.listen_addr.parse().map_err(|e| {
            anyhow::anyhow!(
                "DDNS_LISTEN_ADDR '{}' is not a valid socket address: {}",
                self.listen_addr,
                e
            )
        })?;

        if let Some(ref url) = self.api_base_url
            && !url.starts_with("https://")
            && !url.starts_with("http://")
        {
            anyhow::bail!("CF_API_BASE_URL must use HTTP or HTTPS scheme. Got: {}", url);
        }

        parse_log_level(&self.log_level)?;

        Ok(addr)
    }

    /// Log problems with the DNS and credential settings
    fn report_update_settings(&self) {
        if let Err(e) = self.update.validate() {
            error!("{} - updates will be answered with 911", e);
        }

        if !self.update.has_credentials() {
            error!("DDNS_USERNAME or DDNS_PASSWORD not configured - every update will be rejected");
        }

        for entry in &self.update.dns_entries {
            info!("Managing record: {}", entry);
        }
    }
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "DDNS_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            level
        ),
    }
}

fn main() -> ExitCode {
    let config = Config::from_env();

    let addr = match config.validate() {
        Ok(addr) => addr,
        Err(e) => {
            eprintln!("Configuration validation error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let log_level = parse_log_level(&config.log_level).unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("Starting ddnsd");
    config.report_update_settings();

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        match run_daemon(config, addr).await {
            Ok(()) => DdnsExitCode::CleanShutdown,
            Err(DaemonError::Startup(e)) => {
                error!("Startup error: {}", e);
                DdnsExitCode::ConfigError
            }
            Err(DaemonError::Runtime(e)) => {
                error!("Daemon error: {}", e);
                DdnsExitCode::RuntimeError
            }
        }
    });

    result.into()
}

/// Why the daemon stopped
enum DaemonError {
    Startup(anyhow::Error),
    Runtime(anyhow::Error),
}

/// Run the daemon
async fn run_daemon(config: Config, addr: SocketAddr) -> std::result::Result<(), DaemonError> {
    let mut provider = CloudflareProvider::new(config.dry_run)
        .map_err(|e| DaemonError::Startup(e.into()))?;

    if config.dry_run {
        warn!("Cloudflare provider running in DRY-RUN mode - no changes will be made");
    }

    if let Some(url) = config.api_base_url {
        info!("Using Cloudflare API base URL: {}", url);
        provider = provider.with_base_url(url);
    }

    let state = AppState::new(
        UpdateOrchestrator::new(Arc::new(provider)),
        config.update,
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| DaemonError::Startup(anyhow::anyhow!("Failed to bind {}: {}", addr, e)))?;

    ddns_server::serve(listener, state, shutdown_signal())
        .await
        .map_err(DaemonError::Runtime)?;

    info!("Shutting down daemon");
    Ok(())
}

/// Resolve when a shutdown signal arrives
async fn shutdown_signal() {
    match wait_for_shutdown().await {
        Ok(signal) => info!("Received shutdown signal: {}", signal),
        Err(e) => error!("Shutdown signal error: {}", e),
    }
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let signal = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };

    Ok(signal)
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
