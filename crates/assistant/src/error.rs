use reqwest::StatusCode;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Invalid chat options: {0}")]
    InvalidOptions(String),
    #[error("Authentication failed: {message}")]
    Auth { message: String },
    #[error("Insufficient credits: {message}")]
    InsufficientCredits { message: String },
    #[error("Input flagged by moderation: {message}")]
    Moderation {
        message: String,
        flagged_input: Option<String>,
        reasons: Vec<String>,
    },
    #[error("Upstream request timed out")]
    Timeout,
    #[error("Rate limited: {message}")]
    RateLimit {
        message: String,
        retry_after: Option<u64>,
    },
    #[error("Invalid request ({status}): {message}")]
    InvalidRequest { status: u16, message: String },
    #[error("Upstream provider error: {message}")]
    Provider { message: String },
    #[error("Service unavailable: {message}")]
    ServiceUnavailable { message: String },
    #[error("Network error: {0}")]
    Network(reqwest::Error),
    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),
    #[error("Response did not match the requested schema")]
    SchemaValidation { raw: String },
    #[error("Unexpected upstream status {status}: {message}")]
    Unknown { status: u16, message: String },
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ChatError::Timeout
        } else {
            ChatError::Network(err)
        }
    }
}

// OpenRouter-style error envelope
#[derive(Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
    #[serde(default)]
    metadata: Option<ErrorMetadata>,
}

#[derive(Deserialize, Default)]
struct ErrorMetadata {
    flagged_input: Option<String>,
    #[serde(default)]
    reasons: Vec<String>,
}

impl ChatError {
    pub(crate) fn from_status(status: StatusCode, retry_after: Option<u64>, body: &str) -> Self {
        let detail = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error);

        let message = detail
            .as_ref()
            .and_then(|d| d.message.clone())
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("upstream error")
                        .to_string()
                } else {
                    body.trim().to_string()
                }
            });

        let metadata = detail.and_then(|d| d.metadata).unwrap_or_default();

        match status.as_u16() {
            401 => ChatError::Auth { message },
            402 => ChatError::InsufficientCredits { message },
            403 => ChatError::Moderation {
                message,
                flagged_input: metadata.flagged_input,
                reasons: metadata.reasons,
            },
            408 => ChatError::Timeout,
            429 => ChatError::RateLimit { message, retry_after },
            502 => ChatError::Provider { message },
            503 => ChatError::ServiceUnavailable { message },
            s if status.is_client_error() => ChatError::InvalidRequest { status: s, message },
            s => ChatError::Unknown { status: s, message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_carries_message_and_retry_after() {
        let body = r#"{"error":{"message":"Rate limit exceeded"}}"#;
        let err = ChatError::from_status(StatusCode::TOO_MANY_REQUESTS, Some(12), body);
        match err {
            ChatError::RateLimit { message, retry_after } => {
                assert_eq!(message, "Rate limit exceeded");
                assert_eq!(retry_after, Some(12));
            }
            other => panic!("expected RateLimit, got {:?}", other),
        }
    }

    #[test]
    fn test_moderation_exposes_flagged_input() {
        let body = r#"{"error":{"message":"Input was flagged","metadata":{"flagged_input":"buy illegal things","reasons":["illegal_content"]}}}"#;
        let err = ChatError::from_status(StatusCode::FORBIDDEN, None, body);
        match err {
            ChatError::Moderation { flagged_input, reasons, .. } => {
                assert_eq!(flagged_input.as_deref(), Some("buy illegal things"));
                assert_eq!(reasons, vec!["illegal_content".to_string()]);
            }
            other => panic!("expected Moderation, got {:?}", other),
        }
    }

    #[test]
    fn test_auth_and_credit_statuses() {
        assert!(matches!(
            ChatError::from_status(StatusCode::UNAUTHORIZED, None, ""),
            ChatError::Auth { .. }
        ));
        assert!(matches!(
            ChatError::from_status(StatusCode::PAYMENT_REQUIRED, None, ""),
            ChatError::InsufficientCredits { .. }
        ));
    }

    #[test]
    fn test_other_4xx_maps_to_invalid_request() {
        let err = ChatError::from_status(StatusCode::NOT_FOUND, None, "no such model");
        match err {
            ChatError::InvalidRequest { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "no such model");
            }
            other => panic!("expected InvalidRequest, got {:?}", other),
        }
    }

    #[test]
    fn test_5xx_taxonomy() {
        assert!(matches!(
            ChatError::from_status(StatusCode::BAD_GATEWAY, None, ""),
            ChatError::Provider { .. }
        ));
        assert!(matches!(
            ChatError::from_status(StatusCode::SERVICE_UNAVAILABLE, None, ""),
            ChatError::ServiceUnavailable { .. }
        ));
        assert!(matches!(
            ChatError::from_status(StatusCode::INTERNAL_SERVER_ERROR, None, ""),
            ChatError::Unknown { status: 500, .. }
        ));
    }

    #[test]
    fn test_plain_text_body_becomes_message() {
        let err = ChatError::from_status(StatusCode::TOO_MANY_REQUESTS, None, "slow down");
        match err {
            ChatError::RateLimit { message, retry_after } => {
                assert_eq!(message, "slow down");
                assert_eq!(retry_after, None);
            }
            other => panic!("expected RateLimit, got {:?}", other),
        }
    }
}
