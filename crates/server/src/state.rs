use std::sync::Arc;
use shelfview_core::{Config, ListSession, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    session: Arc<ListSession>,
}

impl AppState {
    pub fn new(config: Config, session: Arc<ListSession>) -> Self {
        Self { config, session }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn session(&self) -> &ListSession {
        self.session.as_ref()
    }
}
