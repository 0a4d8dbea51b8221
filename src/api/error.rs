//! Backend error types

use std::fmt;

/// Errors returned by the anamnese backend client.
///
/// Every variant names the endpoint that failed (e.g. `GET anamneses/{id}`)
/// so notifications and logs can say what was being attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// 401 - no session, or the session expired server-side
    Unauthorized { endpoint: String },
    /// 404 - record does not exist or belongs to another user
    NotFound { endpoint: String },
    /// Connection refused, DNS failure, timeout
    Network { endpoint: String, message: String },
    /// Any other non-success status
    Http {
        endpoint: String,
        status: u16,
        message: String,
    },
    /// Response body did not match the expected shape
    Decode { endpoint: String, message: String },
}

impl ApiError {
    pub fn unauthorized(endpoint: impl Into<String>) -> Self {
        ApiError::Unauthorized {
            endpoint: endpoint.into(),
        }
    }

    pub fn not_found(endpoint: impl Into<String>) -> Self {
        ApiError::NotFound {
            endpoint: endpoint.into(),
        }
    }

    pub fn network(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Network {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    pub fn http(endpoint: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        ApiError::Http {
            endpoint: endpoint.into(),
            status,
            message: message.into(),
        }
    }

    pub fn decode(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Decode {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Map a non-success status to the matching variant
    pub fn from_status(endpoint: impl Into<String>, status: u16, body: &str) -> Self {
        match status {
            401 => ApiError::unauthorized(endpoint),
            404 => ApiError::not_found(endpoint),
            _ => ApiError::http(endpoint, status, detail_message(body)),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    pub fn endpoint(&self) -> &str {
        match self {
            ApiError::Unauthorized { endpoint }
            | ApiError::NotFound { endpoint }
            | ApiError::Network { endpoint, .. }
            | ApiError::Http { endpoint, .. }
            | ApiError::Decode { endpoint, .. } => endpoint,
        }
    }
}

/// The backend reports errors as `{"detail": "..."}`; fall back to the raw body
fn detail_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from))
        .unwrap_or_else(|| body.trim().to_string())
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized { endpoint } => {
                write!(f, "{}: Not authenticated (401)", endpoint)
            }
            ApiError::NotFound { endpoint } => write!(f, "{}: Not found (404)", endpoint),
            ApiError::Network { endpoint, message } => {
                write!(f, "{}: Network error - {}", endpoint, message)
            }
            ApiError::Http {
                endpoint,
                status,
                message,
            } => {
                if message.is_empty() {
                    write!(f, "{}: HTTP {}", endpoint, status)
                } else {
                    write!(f, "{}: HTTP {} - {}", endpoint, status, message)
                }
            }
            ApiError::Decode { endpoint, message } => {
                write!(f, "{}: Unexpected response - {}", endpoint, message)
            }
        }
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert!(ApiError::from_status("GET auth/me", 401, "").is_unauthorized());
        assert!(ApiError::from_status("GET anamneses/x", 404, "").is_not_found());
        assert_eq!(
            ApiError::from_status("POST anamneses", 500, r#"{"detail": "boom"}"#),
            ApiError::http("POST anamneses", 500, "boom")
        );
    }

    #[test]
    fn test_detail_falls_back_to_body() {
        let err = ApiError::from_status("POST anamneses", 502, "Bad Gateway\n");
        assert_eq!(err.to_string(), "POST anamneses: HTTP 502 - Bad Gateway");
    }

    #[test]
    fn test_endpoint() {
        assert_eq!(
            ApiError::network("GET anamneses", "connection refused").endpoint(),
            "GET anamneses"
        );
        assert_eq!(ApiError::decode("GET auth/me", "eof").endpoint(), "GET auth/me");
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ApiError::not_found("GET anamneses/abc").to_string(),
            "GET anamneses/abc: Not found (404)"
        );
        assert_eq!(
            ApiError::http("POST anamneses", 422, "").to_string(),
            "POST anamneses: HTTP 422"
        );
    }
}
