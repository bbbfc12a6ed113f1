//! Request validation
//!
//! Turns an inbound [`UpdateRequest`] into a [`ReportedIp`] or a classified
//! [`Rejection`]. Checks run in this order:
//!
//! 1. Method must be `POST`
//! 2. `Authorization` must carry matching Basic credentials
//! 3. `myip` must be present
//! 4. `myip` must be an IPv4 dotted-quad
//!
//! Validation never fails with an error: every problem is a rejection and
//! decoding failures count as a credential mismatch.

use crate::config::UpdateConfig;
use crate::response::DdnsResponse;
use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use std::net::Ipv4Addr;
use tracing::{debug, error, warn};

/// Base64 decoder for Basic credentials; routers differ on padding
const BASIC_CREDENTIALS: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// An inbound update request, stripped of transport details
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateRequest {
    /// HTTP method (e.g. "POST")
    pub method: String,
    /// `hostname` query parameter (accepted for protocol compatibility, unused)
    pub hostname: Option<String>,
    /// `myip` query parameter
    pub myip: Option<String>,
    /// Raw `Authorization` header
    pub auth_header: Option<String>,
}

impl UpdateRequest {
    /// Create a POST request with no parameters
    pub fn post() -> Self {
        Self {
            method: "POST".to_string(),
            ..Self::default()
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    pub fn with_myip(mut self, myip: impl Into<String>) -> Self {
        self.myip = Some(myip.into());
        self
    }

    pub fn with_auth_header(mut self, header: impl Into<String>) -> Self {
        self.auth_header = Some(header.into());
        self
    }

    /// Set a `Basic` header for the given credentials
    pub fn with_basic_auth(self, username: &str, password: &str) -> Self {
        let encoded = BASIC_CREDENTIALS.encode(format!("{}:{}", username, password));
        self.with_auth_header(format!("Basic {}", encoded))
    }
}

/// An accepted `myip`
///
/// `addr` is what goes to the DNS provider; `raw` is echoed back to the
/// router exactly as it was sent (`010.0.0.1` stays `010.0.0.1`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedIp {
    pub addr: Ipv4Addr,
    pub raw: String,
}

impl ReportedIp {
    /// Accept a dotted-quad, keeping the caller's spelling
    pub fn parse(raw: &str) -> Option<Self> {
        parse_ipv4(raw).map(|addr| Self {
            addr,
            raw: raw.to_string(),
        })
    }
}

/// Why a request was turned away before any DNS work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Method other than POST
    MethodNotAllowed,
    /// Missing, malformed or wrong credentials
    Unauthorized,
    /// `myip` absent
    MissingIp,
    /// `myip` not a dotted-quad
    InvalidIp,
}

impl From<Rejection> for DdnsResponse {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::MethodNotAllowed => DdnsResponse::MethodNotAllowed,
            Rejection::Unauthorized => DdnsResponse::Unauthorized,
            Rejection::MissingIp => DdnsResponse::BadParam,
            Rejection::InvalidIp => DdnsResponse::InvalidIp,
        }
    }
}

/// Validate a request against the configured credentials
pub fn validate(request: &UpdateRequest, config: &UpdateConfig) -> Result<ReportedIp, Rejection> {
    if request.method != "POST" {
        debug!("Rejecting {} request", request.method);
        return Err(Rejection::MethodNotAllowed);
    }

    let authorized = request
        .auth_header
        .as_deref()
        .is_some_and(|header| is_valid_auth(header, config));
    if !authorized {
        warn!(
            "Rejecting request with missing or invalid credentials (header present: {})",
            request.auth_header.is_some()
        );
        return Err(Rejection::Unauthorized);
    }

    let Some(myip) = request.myip.as_deref() else {
        debug!("Rejecting request without myip");
        return Err(Rejection::MissingIp);
    };

    ReportedIp::parse(myip).ok_or_else(|| {
        debug!("Rejecting invalid myip: {:?}", myip);
        Rejection::InvalidIp
    })
}

/// Check a raw `Authorization` header against the configured credentials
///
/// Fails closed: unconfigured credentials, a non-Basic scheme, bad base64,
/// non-UTF-8 payload or a missing `:` all count as a mismatch.
pub fn is_valid_auth(header: &str, config: &UpdateConfig) -> bool {
    if !config.has_credentials() {
        error!("DDNS_USERNAME or DDNS_PASSWORD not configured");
        return false;
    }

    let Some((username, password)) = decode_basic_credentials(header) else {
        return false;
    };

    username == config.expected_username && password == config.expected_password
}

/// Decode `Basic <base64(username:password)>` into its two halves
///
/// The password is everything after the first `:`.
pub fn decode_basic_credentials(header: &str) -> Option<(String, String)> {
    let (scheme, payload) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = match BASIC_CREDENTIALS.decode(payload.trim()) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!("Undecodable Basic credentials: {}", e);
            return None;
        }
    };
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;

    Some((username.to_string(), password.to_string()))
}

/// Parse an IPv4 dotted-quad
///
/// Exactly four groups of one to three ASCII digits, each at most 255.
/// Leading zeros are accepted (`010` is 10), unlike `Ipv4Addr::from_str`.
pub fn parse_ipv4(raw: &str) -> Option<Ipv4Addr> {
    let mut octets = [0u8; 4];
    let mut groups = raw.split('.');

    for octet in octets.iter_mut() {
        let group = groups.next()?;
        if group.is_empty() || group.len() > 3 || !group.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *octet = group.parse::<u8>().ok()?;
    }

    if groups.next().is_some() {
        return None;
    }

    Some(Ipv4Addr::from(octets))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> UpdateConfig {
        UpdateConfig::new("zone", "token", vec!["home.example.com".to_string()])
            .with_credentials("router", "s3cret")
    }

    fn authed() -> UpdateRequest {
        UpdateRequest::post().with_basic_auth("router", "s3cret")
    }

    #[test]
    fn test_parse_ipv4_accepts_dotted_quads() {
        assert_eq!(parse_ipv4("203.0.113.5"), Some(Ipv4Addr::new(203, 0, 113, 5)));
        assert_eq!(parse_ipv4("0.0.0.0"), Some(Ipv4Addr::UNSPECIFIED));
        assert_eq!(parse_ipv4("255.255.255.255"), Some(Ipv4Addr::BROADCAST));
        assert_eq!(parse_ipv4("010.001.000.009"), Some(Ipv4Addr::new(10, 1, 0, 9)));
    }

    #[test]
    fn test_parse_ipv4_rejects_everything_else() {
        for raw in [
            "",
            "1.2.3",
            "1.2.3.4.5",
            "256.1.1.1",
            "1.2.3.999",
            "1..3.4",
            "1.2.3.4.",
            " 1.2.3.4",
            "1.2.3.+4",
            "0001.2.3.4",
            "a.b.c.d",
            "::1",
            "2001:db8::1",
            "١.٢.٣.٤",
        ] {
            assert_eq!(parse_ipv4(raw), None, "{:?} should be rejected", raw);
        }
    }

    #[test]
    fn test_decode_basic_credentials() {
        let header = format!("Basic {}", BASIC_CREDENTIALS.encode("router:pa:ss"));
        assert_eq!(
            decode_basic_credentials(&header),
            Some(("router".to_string(), "pa:ss".to_string()))
        );

        // Unpadded payloads are accepted
        assert_eq!(
            decode_basic_credentials("basic YTpi"),
            Some(("a".to_string(), "b".to_string()))
        );
    }

    #[test]
    fn test_decode_basic_credentials_malformed() {
        assert_eq!(decode_basic_credentials("Basic"), None);
        assert_eq!(decode_basic_credentials("Bearer cm91dGVyOnMzY3JldA=="), None);
        assert_eq!(decode_basic_credentials("Basic !!!not-base64!!!"), None);
        // "routers3cret" has no separator
        assert_eq!(decode_basic_credentials("Basic cm91dGVyczNjcmV0"), None);
    }

    #[test]
    fn test_auth_fails_closed_without_configured_credentials() {
        let config = UpdateConfig::new("zone", "token", vec![]);
        let header = format!("Basic {}", BASIC_CREDENTIALS.encode(":"));
        assert!(!is_valid_auth(&header, &config));
    }

    #[test]
    fn test_validate_order() {
        let config = config();

        let get = authed().with_method("GET").with_myip("bogus");
        assert_eq!(validate(&get, &config), Err(Rejection::MethodNotAllowed));

        let anonymous = UpdateRequest::post().with_myip("bogus");
        assert_eq!(validate(&anonymous, &config), Err(Rejection::Unauthorized));

        let wrong = UpdateRequest::post()
            .with_basic_auth("router", "wrong")
            .with_myip("203.0.113.5");
        assert_eq!(validate(&wrong, &config), Err(Rejection::Unauthorized));

        assert_eq!(validate(&authed(), &config), Err(Rejection::MissingIp));

        let invalid = authed().with_myip("300.0.0.1");
        assert_eq!(validate(&invalid, &config), Err(Rejection::InvalidIp));
    }

    #[test]
    fn test_validate_success_ignores_hostname() {
        let request = authed()
            .with_hostname("whatever.example.com")
            .with_myip("203.0.113.5");
        let reported = validate(&request, &config()).unwrap();
        assert_eq!(reported.addr, Ipv4Addr::new(203, 0, 113, 5));
        assert_eq!(reported.raw, "203.0.113.5");
    }

    #[test]
    fn test_validate_keeps_leading_zeros_for_echo() {
        let request = authed().with_myip("010.000.113.005");
        let reported = validate(&request, &config()).unwrap();
        assert_eq!(reported.addr, Ipv4Addr::new(10, 0, 113, 5));
        assert_eq!(reported.raw, "010.000.113.005");
    }

    #[test]
    fn test_rejection_to_response() {
        assert_eq!(DdnsResponse::from(Rejection::MissingIp).body(), "badparam");
        assert_eq!(DdnsResponse::from(Rejection::Unauthorized).status(), 401);
        assert_eq!(DdnsResponse::from(Rejection::MethodNotAllowed).status(), 405);
        assert_eq!(
            DdnsResponse::from(Rejection::InvalidIp).body(),
            "badparam - Invalid IP address"
        );
    }
}
