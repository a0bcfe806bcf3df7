use std::sync::Arc;

use burrow_core::{Redirector, Shortener};

#[derive(Clone)]
pub struct AppState {
    pub shortener: Arc<dyn Shortener>,
    pub redirector: Arc<dyn Redirector>,
    base_url: Arc<str>,
}

impl AppState {
    pub fn new(
        shortener: Arc<dyn Shortener>,
        redirector: Arc<dyn Redirector>,
        public_base_url: impl AsRef<str>,
    ) -> Self {
        Self {
            shortener,
            redirector,
            base_url: Arc::from(public_base_url.as_ref().trim_end_matches('/')),
        }
    }

    /// Public base URL short links are served under, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
