mod error;
mod model;

pub use error::{RelayError, Stage};
pub use model::*;

use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use crate::config::UpstreamConfig;

use super::http::{HttpClient, HttpService};

pub const SCRAPE_SUCCESS_MESSAGE: &str = "Data scraped successfully";
pub const LOGIN_SUCCESS_MESSAGE: &str = "Login successful";

/// Logs into the portal with caller-supplied credentials and republishes its tracking list.
///
/// Every call opens its own [`HttpService`], so no cookie ever crosses from one caller to another.
#[derive(Clone)]
pub struct RelayService {
    config: Arc<UpstreamConfig>,
}

impl RelayService {
    /// Fails early if the upstream settings cannot produce a client.
    pub fn new(config: UpstreamConfig) -> Result<Self, RelayError> {
        HttpService::new(&config)?;

        Ok(Self {
            config: Arc::new(config),
        })
    }

    pub async fn relay(&self, credentials: &Credentials) -> RelayResult {
        let request_id = Uuid::new_v4();
        info!("[{}] Scrape requested", request_id);

        let outcome = match self.open_session(credentials) {
            Ok(client) => self.relay_with(&client, credentials, request_id).await,
            Err(e) => Err(e),
        };

        Self::report(
            request_id,
            outcome.map(|data| RelayResult::success(data, SCRAPE_SUCCESS_MESSAGE)),
        )
    }

    pub async fn test_login(&self, credentials: &Credentials) -> RelayResult {
        let request_id = Uuid::new_v4();
        info!("[{}] Login check requested", request_id);

        let outcome = match self.open_session(credentials) {
            Ok(client) => self.login(&client, credentials, request_id).await,
            Err(e) => Err(e),
        };

        Self::report(
            request_id,
            outcome.map(|_| RelayResult::success(Value::Null, LOGIN_SUCCESS_MESSAGE)),
        )
    }

    fn open_session(&self, credentials: &Credentials) -> Result<HttpService, RelayError> {
        credentials.validate()?;
        HttpService::new(&self.config)
    }

    async fn relay_with(
        &self,
        client: &dyn HttpClient,
        credentials: &Credentials,
        request_id: Uuid,
    ) -> Result<Value, RelayError> {
        self.login(client, credentials, request_id).await?;
        self.fetch_listing(client, request_id).await
    }

    async fn login(&self, client: &dyn HttpClient, credentials: &Credentials, request_id: Uuid) -> Result<(), RelayError> {
        info!("[{}] Logging in at {}", request_id, self.config.login_url);

        let form = [
            ("ReturnUrl", self.config.return_url.as_str()),
            ("User", credentials.username.as_str()),
            ("Password", credentials.password.as_str()),
        ];

        let response = client.post_form(Stage::Login, &self.config.login_url, &form).await?;
        debug!(
            "[{}] Login answered {} at {}",
            request_id,
            response.status,
            response.final_url.path()
        );

        check_status(Stage::Login, response.status)?;

        // The portal has no explicit failure code: a rejected login re-renders the login page.
        if self.is_login_page(&response.final_url) {
            return Err(RelayError::UpstreamAuth(
                "still on the login page after submitting credentials".into(),
            ));
        }

        if !client.has_cookies(&self.config.data_url) {
            warn!("[{}] Login accepted but no session cookie was set", request_id);
        }

        info!("[{}] Login succeeded", request_id);
        Ok(())
    }

    async fn fetch_listing(&self, client: &dyn HttpClient, request_id: Uuid) -> Result<Value, RelayError> {
        info!("[{}] Fetching listing from {}", request_id, self.config.data_url);

        let response = client.post(Stage::Fetch, &self.config.data_url).await?;
        debug!(
            "[{}] Listing answered {} with {} bytes",
            request_id,
            response.status,
            response.body.len()
        );

        check_status(Stage::Fetch, response.status)?;

        if self.is_login_page(&response.final_url) {
            return Err(RelayError::UpstreamAuth(
                "session was not accepted by the data endpoint".into(),
            ));
        }

        extract_listing(&response.body)
    }

    fn is_login_page(&self, url: &Url) -> bool {
        url.path().contains(self.config.login_marker.as_str())
    }

    fn report(request_id: Uuid, outcome: Result<RelayResult, RelayError>) -> RelayResult {
        match outcome {
            Ok(result) => {
                info!("[{}] {}", request_id, result.message);
                result
            }
            Err(e) => {
                match &e {
                    RelayError::Internal(_) => error!("[{}] Relay failed: {}", request_id, e),
                    _ => warn!("[{}] Relay failed: {}", request_id, e),
                }
                RelayResult::from(e)
            }
        }
    }
}

fn check_status(stage: Stage, status: StatusCode) -> Result<(), RelayError> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(RelayError::UpstreamAuth(format!("{} endpoint returned {}", stage, status)));
    }
    if !status.is_success() {
        return Err(RelayError::UpstreamNetwork {
            stage,
            message: format!("endpoint returned {}", status),
            timed_out: false,
        });
    }
    Ok(())
}

pub fn extract_listing(body: &str) -> Result<Value, RelayError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|_| RelayError::UpstreamShape("Invalid JSON response from external API.".into()))?;

    let listing: ListingResponse = serde_json::from_value(value)
        .map_err(|_| RelayError::UpstreamShape("Unexpected data structure from external API.".into()))?;

    Ok(listing.additional_data.list)
}
