use reqwest::{
    cookie::Jar,
    header::{self, HeaderMap, HeaderValue},
    Client,
};
use std::sync::Arc;

use crate::config::UpstreamConfig;

pub fn build_portal_headers(config: &UpstreamConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("application/json, text/javascript, */*; q=0.01"),
    );
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("pt-BR,pt;q=0.9,en;q=0.8"));

    let origin = config.login_url.origin().ascii_serialization();
    if let Ok(value) = HeaderValue::from_str(&origin) {
        headers.insert(header::ORIGIN, value);
    }
    if let Ok(value) = HeaderValue::from_str(config.login_url.as_str()) {
        headers.insert(header::REFERER, value);
    }

    headers
}

pub fn create_portal_client(config: &UpstreamConfig, cookie_store: Arc<Jar>) -> Result<Client, reqwest::Error> {
    let builder = Client::builder()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .cookie_provider(cookie_store)
        .default_headers(build_portal_headers(config))
        .user_agent(config.user_agent.as_str());

    build_client(builder, config.proxy.as_deref())
}

fn build_client(builder: reqwest::ClientBuilder, proxy: Option<&str>) -> Result<Client, reqwest::Error> {
    match proxy {
        Some(proxy_url) => {
            debug!("Configuring portal client with proxy");
            builder.proxy(reqwest::Proxy::all(proxy_url)?).build()
        }
        // Portal traffic only goes through UPSTREAM_PROXY, never the system proxy settings.
        None => builder.no_proxy().build(),
    }
}
