use std::sync::Arc;

use crate::config::Config;
use crate::gallery::{CircuitBreaker, HybridResolver};
use crate::observability::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub resolver: Arc<HybridResolver>,
    pub breaker: Arc<CircuitBreaker>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(
        config: Config,
        resolver: Arc<HybridResolver>,
        breaker: Arc<CircuitBreaker>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            resolver,
            breaker,
            metrics,
        }
    }
}
