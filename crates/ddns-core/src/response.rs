//! Response tokens for the router-facing protocol
//!
//! Router firmware parses the response body, so the exact bodies below are
//! part of the external contract. `911` and `dnserr` share a status code but
//! must stay distinct.

/// Value of the `WWW-Authenticate` header on 401 responses
pub const AUTH_CHALLENGE: &str = "Basic realm=\"DDNS Update\"";

/// Every response the endpoint can produce
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DdnsResponse {
    /// All configured records point at the address, echoed as the router
    /// sent it
    Good(String),
    /// Request method was not POST
    MethodNotAllowed,
    /// Credentials missing, malformed or wrong
    Unauthorized,
    /// `myip` query parameter missing
    BadParam,
    /// `myip` is not an IPv4 dotted-quad
    InvalidIp,
    /// Zone, token or hostname list not configured
    ConfigError,
    /// At least one record could not be updated
    DnsError,
}

impl DdnsResponse {
    /// HTTP status code
    pub fn status(&self) -> u16 {
        match self {
            DdnsResponse::Good(_) => 200,
            DdnsResponse::BadParam | DdnsResponse::InvalidIp => 400,
            DdnsResponse::Unauthorized => 401,
            DdnsResponse::MethodNotAllowed => 405,
            DdnsResponse::ConfigError | DdnsResponse::DnsError => 500,
        }
    }

    /// Response body token
    pub fn body(&self) -> String {
        match self {
            DdnsResponse::Good(ip) => format!("good {}", ip),
            DdnsResponse::MethodNotAllowed => "Method Not Allowed".to_string(),
            DdnsResponse::Unauthorized => "Unauthorized".to_string(),
            DdnsResponse::BadParam => "badparam".to_string(),
            DdnsResponse::InvalidIp => "badparam - Invalid IP address".to_string(),
            DdnsResponse::ConfigError => "911".to_string(),
            DdnsResponse::DnsError => "dnserr".to_string(),
        }
    }

    /// `WWW-Authenticate` value, for 401 only
    pub fn challenge(&self) -> Option<&'static str> {
        match self {
            DdnsResponse::Unauthorized => Some(AUTH_CHALLENGE),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DdnsResponse::Good(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_and_status() {
        let cases = [
            (DdnsResponse::Good("203.0.113.5".to_string()), 200, "good 203.0.113.5"),
            (DdnsResponse::Good("010.0.113.5".to_string()), 200, "good 010.0.113.5"),
            (DdnsResponse::MethodNotAllowed, 405, "Method Not Allowed"),
            (DdnsResponse::Unauthorized, 401, "Unauthorized"),
            (DdnsResponse::BadParam, 400, "badparam"),
            (DdnsResponse::InvalidIp, 400, "badparam - Invalid IP address"),
            (DdnsResponse::ConfigError, 500, "911"),
            (DdnsResponse::DnsError, 500, "dnserr"),
        ];

        for (response, status, body) in cases {
            assert_eq!(response.status(), status, "{:?}", response);
            assert_eq!(response.body(), body, "{:?}", response);
        }
    }

    #[test]
    fn test_challenge_only_on_unauthorized() {
        assert_eq!(
            DdnsResponse::Unauthorized.challenge(),
            Some("Basic realm=\"DDNS Update\"")
        );
        assert_eq!(DdnsResponse::BadParam.challenge(), None);
        assert_eq!(DdnsResponse::DnsError.challenge(), None);
    }
}
