use crate::{config::AppConfig, error::AppResult, service::RelayService};

#[derive(Clone)]
pub struct AppState {
    pub relay: RelayService,
}

impl AppState {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let relay = RelayService::new(config.upstream.clone())?;

        Ok(Self { relay })
    }
}
