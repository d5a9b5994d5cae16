//! Imgops API Library
//!
//! HTTP surface of the image transform service: handlers, the workflow that
//! ties blob storage and history together, and application setup.

mod handlers;
mod telemetry;
mod utils;

pub mod error;
pub mod services;
pub mod setup;
pub mod state;

pub use error::HttpAppError;
pub use services::ImageWorkflow;
pub use setup::routes::{setup_routes, API_PREFIX};
pub use state::AppState;
