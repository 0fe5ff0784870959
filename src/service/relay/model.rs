use std::fmt;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::RelayError;

#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    #[cfg(test)]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), RelayError> {
        if self.username.is_empty() {
            return Err(RelayError::InvalidInput("Username is required".into()));
        }
        if self.password.is_empty() {
            return Err(RelayError::InvalidInput("Password is required".into()));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &"<redacted>")
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    UpstreamNetwork,
    UpstreamAuth,
    UpstreamShape,
    Internal,
}

#[derive(Debug, Clone, Serialize)]
pub struct RelayResult {
    pub success: bool,
    pub data: Value,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
    #[serde(skip)]
    pub status: StatusCode,
}

impl RelayResult {
    pub fn success(data: Value, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
            error: None,
            status: StatusCode::OK,
        }
    }
}

impl From<RelayError> for RelayResult {
    fn from(error: RelayError) -> Self {
        Self {
            success: false,
            data: Value::Null,
            message: error.to_string(),
            error: Some(error.kind()),
            status: error.status_code(),
        }
    }
}

/// Body of the portal's listing endpoint. Only the path we republish is modelled.
#[derive(Debug, Deserialize)]
pub struct ListingResponse {
    #[serde(rename = "DadosAdicionais")]
    pub additional_data: AdditionalData,
}

#[derive(Debug, Deserialize)]
pub struct AdditionalData {
    #[serde(rename = "Lista")]
    pub list: Value,
}
