use std::sync::Arc;

use crate::auth::{TokenCodec, TokenError};
use crate::config::AppConfig;
use crate::database::OrderStore;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn OrderStore>,
    pub tokens: TokenCodec,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn OrderStore>, config: AppConfig) -> Result<Self, TokenError> {
        let tokens = TokenCodec::from_config(&config.security)?;
        Ok(Self {
            store,
            tokens,
            config: Arc::new(config),
        })
    }

    pub fn cookie_name(&self) -> &str {
        &self.config.security.cookie_name
    }
}
