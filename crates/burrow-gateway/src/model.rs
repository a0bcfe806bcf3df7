mod url;

use serde::Serialize;

pub use url::{CreateUrlRequest, CreateUrlResponse};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
