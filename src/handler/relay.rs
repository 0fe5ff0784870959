use std::any::Any;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    service::{Credentials, RelayError, RelayResult},
    state::AppState,
};

impl IntoResponse for RelayResult {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

fn parse_credentials(payload: Result<Json<Credentials>, JsonRejection>) -> Result<Credentials, RelayResult> {
    match payload {
        Ok(Json(credentials)) => Ok(credentials),
        Err(rejection) => {
            // The rejection text can quote body values, so it stays out of the reply and the log.
            warn!("Rejected request body ({})", rejection.status());
            Err(RelayResult::from(RelayError::InvalidInput(
                "Body must be a JSON object with username and password".into(),
            )))
        }
    }
}

/// `POST /scrape-data`
pub async fn scrape_data(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> RelayResult {
    match parse_credentials(payload) {
        Ok(credentials) => state.relay.relay(&credentials).await,
        Err(result) => result,
    }
}

/// `POST /test-login`
pub async fn test_login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> RelayResult {
    match parse_credentials(payload) {
        Ok(credentials) => state.relay.test_login(&credentials).await,
        Err(result) => result,
    }
}

pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    error!("Handler panicked: {}", detail);

    RelayResult::from(RelayError::Internal("An unexpected error occurred".into())).into_response()
}
