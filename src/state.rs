use crate::config::ServiceConfig;
use crate::store::MeasurementStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: ServiceConfig,
    pub store: Arc<dyn MeasurementStore>,
}

impl AppState {
    pub fn new(config: ServiceConfig, store: Arc<dyn MeasurementStore>) -> Self {
        Self { config, store }
    }
}
