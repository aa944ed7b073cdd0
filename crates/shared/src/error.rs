use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body the backend attaches to non-2xx responses, when it attaches one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Best-effort extraction of the backend's error text from a raw body.
    pub fn detail_from_bytes(bytes: &[u8]) -> Option<String> {
        serde_json::from_slice::<ErrorBody>(bytes)
            .ok()
            .and_then(|body| body.error)
            .map(|message| message.trim().to_string())
            .filter(|message| !message.is_empty())
    }
}

#[derive(Debug, Error)]
#[error("backend rejected request with status {status}")]
pub struct BackendRejection {
    pub status: u16,
    pub detail: Option<String>,
}

impl BackendRejection {
    pub fn new(status: u16, body: &[u8]) -> Self {
        Self {
            status,
            detail: ErrorBody::detail_from_bytes(body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_detail_from_backend_error_body() {
        let rejection = BackendRejection::new(400, br#"{"error": "Invalid AI character"}"#);
        assert_eq!(rejection.status, 400);
        assert_eq!(rejection.detail.as_deref(), Some("Invalid AI character"));
    }

    #[test]
    fn ignores_unstructured_error_bodies() {
        assert_eq!(ErrorBody::detail_from_bytes(b"<html>502</html>"), None);
        assert_eq!(ErrorBody::detail_from_bytes(br#"{"error": "  "}"#), None);
    }
}
