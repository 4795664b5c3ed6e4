use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::render::{BridgeError, RenderBridge};

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub render: RenderBridge,
}

impl AppState {
    /// Fails when production mode has no client build to serve.
    pub fn new(pool: PgPool, config: Config) -> Result<SharedState, BridgeError> {
        let render = RenderBridge::from_config(&config)?;
        Ok(Arc::new(AppState {
            pool,
            config,
            render,
        }))
    }
}
