use std::path::Path;

use axum::extract::Request;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};

use super::BridgeError;

/// Files from the client build directory. GET and HEAD requests for paths
/// without a matching file get `index.html`, so client-side routes resolve;
/// other methods get 404.
#[derive(Clone)]
pub struct StaticAssets {
    service: ServeDir<ServeFile>,
}

impl StaticAssets {
    pub fn open(dist: &Path) -> Result<Self, BridgeError> {
        if !dist.is_dir() {
            return Err(BridgeError::BuildMissing(dist.to_path_buf()));
        }

        let service = ServeDir::new(dist).fallback(ServeFile::new(dist.join("index.html")));

        tracing::info!("Serving client build from {}", dist.display());
        Ok(Self { service })
    }

    pub async fn serve(&self, req: Request) -> Response {
        if req.method() != Method::GET && req.method() != Method::HEAD {
            return StatusCode::NOT_FOUND.into_response();
        }
        match self.service.clone().oneshot(req).await {
            Ok(resp) => resp.into_response(),
            Err(never) => match never {},
        }
    }
}
