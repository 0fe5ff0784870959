use std::{error::Error as StdError, fmt};

use axum::http::StatusCode;

use super::ErrorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Login,
    Fetch,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Login => write!(f, "login"),
            Stage::Fetch => write!(f, "data fetch"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Error communicating with external API during {stage}: {message}")]
    UpstreamNetwork {
        stage: Stage,
        message: String,
        timed_out: bool,
    },
    #[error("Authentication failed: {0}")]
    UpstreamAuth(String),
    #[error("{0}")]
    UpstreamShape(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RelayError {
    pub fn network(stage: Stage, error: &reqwest::Error) -> Self {
        let mut message = if error.is_timeout() {
            format!("request timed out ({})", error)
        } else {
            error.to_string()
        };

        let mut source = error.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }

        RelayError::UpstreamNetwork {
            stage,
            message,
            timed_out: error.is_timeout(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RelayError::InvalidInput(_) => ErrorKind::InvalidInput,
            RelayError::UpstreamNetwork { .. } => ErrorKind::UpstreamNetwork,
            RelayError::UpstreamAuth(_) => ErrorKind::UpstreamAuth,
            RelayError::UpstreamShape(_) => ErrorKind::UpstreamShape,
            RelayError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            RelayError::UpstreamAuth(_) => StatusCode::UNAUTHORIZED,
            RelayError::UpstreamNetwork { timed_out: true, .. } => StatusCode::GATEWAY_TIMEOUT,
            RelayError::UpstreamNetwork { .. } | RelayError::UpstreamShape(_) => StatusCode::BAD_GATEWAY,
            RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            RelayError::InvalidInput("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RelayError::UpstreamAuth("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            RelayError::UpstreamNetwork {
                stage: Stage::Login,
                message: "x".into(),
                timed_out: false,
            }
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            RelayError::UpstreamNetwork {
                stage: Stage::Fetch,
                message: "x".into(),
                timed_out: true,
            }
            .status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            RelayError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_network_message_names_stage() {
        let error = RelayError::UpstreamNetwork {
            stage: Stage::Fetch,
            message: "connection reset".into(),
            timed_out: false,
        };

        assert_eq!(
            error.to_string(),
            "Error communicating with external API during data fetch: connection reset"
        );
    }
}
