use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Current password is incorrect")]
    InvalidCredential,

    #[error("Session is too old, sign in again")]
    RequiresRecentLogin,

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("Server is offline or unreachable")]
    Offline,

    #[error("Request timed out")]
    Timeout,

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for IntegrationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            IntegrationError::Timeout
        } else if err.is_connect() {
            IntegrationError::Offline
        } else {
            IntegrationError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for IntegrationError {
    fn from(err: serde_json::Error) -> Self {
        IntegrationError::Serialization(err.to_string())
    }
}

/// Error body returned by the auth endpoints: `{ "code": "auth/...", "message": "..." }`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Turn a rejected auth response body into the matching error.
pub fn classify_auth_failure(body: &str) -> IntegrationError {
    let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
    let code = parsed.as_ref().and_then(|b| b.code.as_deref());

    match code {
        Some("auth/wrong-password") | Some("auth/invalid-credential") => {
            IntegrationError::InvalidCredential
        }
        Some("auth/requires-recent-login") => IntegrationError::RequiresRecentLogin,
        _ => {
            let message = parsed
                .and_then(|b| b.message)
                .unwrap_or_else(|| body.to_string());
            IntegrationError::AuthFailed(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_password_codes() {
        for body in [
            r#"{"code":"auth/wrong-password"}"#,
            r#"{"code":"auth/invalid-credential","message":"nope"}"#,
        ] {
            assert!(matches!(
                classify_auth_failure(body),
                IntegrationError::InvalidCredential
            ));
        }
    }

    #[test]
    fn stale_session_code() {
        let err = classify_auth_failure(r#"{"code":"auth/requires-recent-login"}"#);
        assert!(matches!(err, IntegrationError::RequiresRecentLogin));
    }

    #[test]
    fn unknown_code_keeps_message() {
        match classify_auth_failure(r#"{"code":"auth/too-many-requests","message":"slow down"}"#) {
            IntegrationError::AuthFailed(msg) => assert_eq!(msg, "slow down"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn non_json_body_passes_through() {
        match classify_auth_failure("Unauthorized") {
            IntegrationError::AuthFailed(msg) => assert_eq!(msg, "Unauthorized"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn error_display() {
        assert!(IntegrationError::Offline.to_string().contains("offline"));
        assert!(IntegrationError::Timeout.to_string().contains("timed out"));
        let server = IntegrationError::ServerError {
            status: 500,
            message: "Internal".into(),
        };
        assert!(server.to_string().contains("500"));
    }
}
