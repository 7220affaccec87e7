use crate::config::SharedConfig;
use crate::database::DatabaseService;
use crate::services::RateLimiter;
use std::sync::Arc;

#[derive(Debug)]
pub struct AppState {
    pub config: Arc<SharedConfig>,
    pub database: Arc<DatabaseService>,
    pub ratelimit: Arc<RateLimiter>,
}
