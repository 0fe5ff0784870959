use async_trait::async_trait;
use reqwest::{
    cookie::{CookieStore, Jar},
    Client, Response, StatusCode,
};
use std::sync::Arc;
use url::Url;

use crate::{config::UpstreamConfig, utils::http};

use super::relay::{RelayError, Stage};

/// A fully read upstream reply, after redirects were followed.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub final_url: Url,
    pub body: String,
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn post_form(&self, stage: Stage, url: &Url, form: &[(&str, &str)]) -> Result<UpstreamResponse, RelayError>;
    async fn post(&self, stage: Stage, url: &Url) -> Result<UpstreamResponse, RelayError>;
    fn has_cookies(&self, url: &Url) -> bool;
}

/// One browser-like session against the portal. The cookie jar lives and dies with the service.
pub struct HttpService {
    client: Client,
    cookie_jar: Arc<Jar>,
    max_body_bytes: usize,
}

impl HttpService {
    pub fn new(config: &UpstreamConfig) -> Result<Self, RelayError> {
        let cookie_jar = Arc::new(Jar::default());
        let client = http::create_portal_client(config, Arc::clone(&cookie_jar))
            .map_err(|e| RelayError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            cookie_jar,
            max_body_bytes: config.max_body_bytes,
        })
    }

    async fn read_response(
        &self,
        stage: Stage,
        response: Result<Response, reqwest::Error>,
    ) -> Result<UpstreamResponse, RelayError> {
        let mut response = response.map_err(|e| RelayError::network(stage, &e))?;
        let status = response.status();
        let final_url = response.url().clone();

        if response.content_length().is_some_and(|len| len > self.max_body_bytes as u64) {
            return Err(too_large(stage));
        }

        // Chunked replies carry no length up front, so the limit is enforced while reading.
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| RelayError::network(stage, &e))? {
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(too_large(stage));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(UpstreamResponse {
            status,
            final_url,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}

#[async_trait]
impl HttpClient for HttpService {
    async fn post_form(&self, stage: Stage, url: &Url, form: &[(&str, &str)]) -> Result<UpstreamResponse, RelayError> {
        let response = self.client.post(url.clone()).form(form).send().await;
        self.read_response(stage, response).await
    }

    async fn post(&self, stage: Stage, url: &Url) -> Result<UpstreamResponse, RelayError> {
        let response = self.client.post(url.clone()).send().await;
        self.read_response(stage, response).await
    }

    fn has_cookies(&self, url: &Url) -> bool {
        self.cookie_jar.cookies(url).is_some()
    }
}

fn too_large(stage: Stage) -> RelayError {
    RelayError::UpstreamShape(format!("Response from external API is too large ({} stage).", stage))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_starts_without_cookies() {
        let config = UpstreamConfig::new(
            "http://127.0.0.1:1/Login".parse().unwrap(),
            "http://127.0.0.1:1/data".parse().unwrap(),
        );
        let service = HttpService::new(&config).unwrap();

        assert!(!service.has_cookies(&config.data_url));
    }

    #[test]
    fn test_sessions_do_not_share_cookies() {
        let config = UpstreamConfig::new(
            "http://127.0.0.1:1/Login".parse().unwrap(),
            "http://127.0.0.1:1/data".parse().unwrap(),
        );
        let first = HttpService::new(&config).unwrap();
        let second = HttpService::new(&config).unwrap();

        first
            .cookie_jar
            .add_cookie_str("ASPXAUTH=alice; Path=/", &config.login_url);

        assert!(first.has_cookies(&config.data_url));
        assert!(!second.has_cookies(&config.data_url));
    }
}
