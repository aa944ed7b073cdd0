use std::time::Duration;

use shared::error::BackendRejection;
use thiserror::Error;

/// Failure of a single backend call, as seen by the view state.
///
/// Kept `Clone` so completions can travel through channels and be replayed in
/// tests; transport errors are flattened to their message for that reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("failed to reach {endpoint}: {message}")]
    Transport {
        endpoint: &'static str,
        message: String,
    },
    #[error("HTTP error! status: {status}")]
    Status {
        endpoint: &'static str,
        status: u16,
        detail: Option<String>,
    },
    #[error("Report generation timeout after {}", budget_text(after))]
    Timeout { after: Duration },
    #[error("{reason}")]
    MalformedPayload {
        endpoint: &'static str,
        reason: String,
    },
}

impl ClientError {
    pub fn transport(endpoint: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Transport {
            endpoint,
            message: err.to_string(),
        }
    }

    pub fn rejected(endpoint: &'static str, rejection: BackendRejection) -> Self {
        Self::Status {
            endpoint,
            status: rejection.status,
            detail: rejection.detail,
        }
    }

    pub fn malformed(endpoint: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedPayload {
            endpoint,
            reason: reason.into(),
        }
    }

    /// Endpoint the failure belongs to; timeouts only ever guard the report.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Transport { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::MalformedPayload { endpoint, .. } => endpoint,
            Self::Timeout { .. } => crate::transport::endpoints::SESSION_REPORT,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

fn budget_text(after: &Duration) -> String {
    match (after.as_secs(), after.subsec_millis()) {
        (0, millis) => format!("{millis}ms"),
        (secs, 0) => format!("{secs}s"),
        _ => format!("{:.1}s", after.as_secs_f32()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_reads_like_a_fetch_failure() {
        let err = ClientError::rejected(
            "/chat",
            BackendRejection::new(500, br#"{"error": "Failed to process chat message"}"#),
        );
        assert_eq!(err.to_string(), "HTTP error! status: 500");
        assert_eq!(err.endpoint(), "/chat");
    }

    #[test]
    fn timeout_mentions_elapsed_budget() {
        let err = ClientError::Timeout {
            after: Duration::from_secs(15),
        };
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "Report generation timeout after 15s");
    }

    #[test]
    fn sub_second_timeouts_print_milliseconds() {
        let short = ClientError::Timeout {
            after: Duration::from_millis(200),
        };
        assert_eq!(short.to_string(), "Report generation timeout after 200ms");
        let fractional = ClientError::Timeout {
            after: Duration::from_millis(2500),
        };
        assert_eq!(fractional.to_string(), "Report generation timeout after 2.5s");
    }
}
