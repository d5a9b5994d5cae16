//! Shared application state handed to every handler.

use crate::services::ImageWorkflow;
use imgops_core::Config;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub workflow: ImageWorkflow,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(workflow: ImageWorkflow, config: Config) -> Self {
        Self {
            workflow,
            config: Arc::new(config),
        }
    }
}
