use thiserror::Error;

/// Failures surfaced by the order API client and the sync layer
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    /// Session missing or expired; never retried
    #[error("authentication required: {0}")]
    Auth(String),

    /// Transport failure (`status: None`) or a non-2xx response
    #[error("network error{}: {message}", status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    Network { status: Option<u16>, message: String },

    /// The server answered with something that is not the expected shape
    #[error("unexpected response: {0}")]
    DataIntegrity(String),
}

impl SyncError {
    pub fn network(status: Option<u16>, message: impl Into<String>) -> Self {
        SyncError::Network {
            status,
            message: message.into(),
        }
    }

    /// Only network-class failures are worth another attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, SyncError::Network { .. })
    }

    pub fn is_network(&self) -> bool {
        matches!(self, SyncError::Network { .. })
    }

    /// No HTTP answer at all; a server that answered with an error status is still reachable
    pub fn is_unreachable(&self) -> bool {
        matches!(self, SyncError::Network { status: None, .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            SyncError::Auth(_) => Some(401),
            SyncError::Network { status, .. } => *status,
            SyncError::DataIntegrity(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_network_errors_are_retryable() {
        assert!(SyncError::network(Some(503), "down").is_retryable());
        assert!(SyncError::network(None, "connection refused").is_retryable());
        assert!(!SyncError::Auth("expired".to_string()).is_retryable());
        assert!(!SyncError::DataIntegrity("not an array".to_string()).is_retryable());
    }

    #[test]
    fn only_transport_failures_are_unreachable() {
        assert!(SyncError::network(None, "connection refused").is_unreachable());
        assert!(!SyncError::network(Some(502), "bad gateway").is_unreachable());
        assert!(!SyncError::Auth("expired".to_string()).is_unreachable());
    }

    #[test]
    fn display_includes_http_status_when_known() {
        assert_eq!(
            SyncError::network(Some(500), "boom").to_string(),
            "network error (HTTP 500): boom"
        );
        assert_eq!(SyncError::network(None, "refused").to_string(), "network error: refused");
    }
}
