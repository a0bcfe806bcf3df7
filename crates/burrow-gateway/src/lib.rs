//! HTTP front end for the Burrow engine.
//!
//! - `GET  /{code}`  - redirect to the destination
//! - `POST /api/v1`  - create a short code
//! - `GET  /health`  - liveness check

pub mod app;
pub mod cli;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;
pub mod sweeper;

pub use app::App;
pub use state::AppState;
