use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::TextProvider;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Provider adapter constructed once at startup. Tests swap in a scripted one.
    pub provider: Arc<dyn TextProvider>,
    pub config: Config,
}
