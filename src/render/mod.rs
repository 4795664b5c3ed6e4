//! Serves the HTML document and assets for every non-API route.

mod assets;
mod dev;

use std::path::PathBuf;

use axum::extract::{Request, State};
use axum::response::Response;

pub use assets::StaticAssets;
pub use dev::DevServer;

use crate::config::Config;
use crate::error::AppError;
use crate::middleware::request_log::API_PREFIX;
use crate::state::SharedState;

pub enum RenderBridge {
    /// Live transform against the client dev server.
    Dev(DevServer),
    /// Prebuilt single-page app.
    Static(StaticAssets),
}

impl RenderBridge {
    pub fn from_config(config: &Config) -> Result<Self, BridgeError> {
        if config.environment.is_development() {
            Ok(RenderBridge::Dev(DevServer::new(
                config.dev_server_url.clone(),
                config.client_dir.clone(),
            )))
        } else {
            StaticAssets::open(&config.dist_dir).map(RenderBridge::Static)
        }
    }

    pub async fn handle(&self, req: Request) -> Result<Response, RenderError> {
        match self {
            RenderBridge::Dev(dev) => dev.handle(req).await,
            RenderBridge::Static(assets) => Ok(assets.serve(req).await),
        }
    }
}

/// Router fallback. API paths that reached here matched no route.
pub async fn fallback(State(state): State<SharedState>, req: Request) -> Result<Response, AppError> {
    if req.uri().path().starts_with(API_PREFIX) {
        return Err(AppError::NotFound("Not found".to_string()));
    }
    Ok(state.render.handle(req).await?)
}

/// Fatal startup errors.
#[derive(Debug)]
pub enum BridgeError {
    BuildMissing(PathBuf),
}

impl std::fmt::Display for BridgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BridgeError::BuildMissing(path) => write!(
                f,
                "Could not find the build directory: {}, make sure to build the client first.",
                path.display()
            ),
        }
    }
}

impl std::error::Error for BridgeError {}

/// Per-request failures while producing a document in development.
#[derive(Debug)]
pub enum RenderError {
    Template { path: PathBuf, source: std::io::Error },
    Shell(askama::Error),
    Upstream(reqwest::Error),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::Template { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            RenderError::Shell(err) => write!(f, "failed to render app shell: {err}"),
            RenderError::Upstream(err) => write!(f, "dev server request failed: {err}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Template { source, .. } => Some(source),
            RenderError::Shell(err) => Some(err),
            RenderError::Upstream(err) => Some(err),
        }
    }
}
