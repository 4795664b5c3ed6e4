//! Access logging for the JSON API.
//!
//! The middleware hands each finished `/api` exchange to a
//! [`ResponseObserver`]. Observers get a read-only view of the exchange after
//! the handler has run; the response that leaves the middleware carries the
//! same status, headers and body bytes the handler produced.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use crate::error::AppError;

pub const API_PREFIX: &str = "/api";
const MAX_LINE_CHARS: usize = 80;
const MAX_BODY_CHARS: usize = 100;

/// One completed request/response pair.
pub struct Exchange<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    pub status: StatusCode,
    pub elapsed: Duration,
    /// Present when the response declared a JSON body that parsed.
    pub json: Option<&'a Value>,
}

/// Receives finished `/api` exchanges. Implementations must not block.
pub trait ResponseObserver: Send + Sync {
    fn observe(&self, exchange: &Exchange<'_>);
}

/// Writes one access line per exchange through `tracing`.
pub struct AccessLog;

impl ResponseObserver for AccessLog {
    fn observe(&self, exchange: &Exchange<'_>) {
        tracing::info!(target: "barbershift::access", "{}", access_line(exchange));
    }
}

/// `"{status} {method} {path} {ms}ms[ :: {json}]"`, with the JSON cut to 100
/// characters and the whole line cut to 80 (79 plus an ellipsis).
pub fn access_line(exchange: &Exchange<'_>) -> String {
    let mut line = format!(
        "{} {} {} {}ms",
        exchange.status.as_u16(),
        exchange.method,
        exchange.path,
        exchange.elapsed.as_millis()
    );

    if let Some(json) = exchange.json {
        line.push_str(" :: ");
        line.extend(json.to_string().chars().take(MAX_BODY_CHARS));
    }

    if line.chars().count() > MAX_LINE_CHARS {
        let mut cut: String = line.chars().take(MAX_LINE_CHARS - 1).collect();
        cut.push('…');
        return cut;
    }

    line
}

pub async fn observe_responses(
    State(observer): State<Arc<dyn ResponseObserver>>,
    req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    if !path.starts_with(API_PREFIX) {
        return response;
    }

    let (response, json) = capture_json(response).await;
    observer.observe(&Exchange {
        method: &method,
        path: &path,
        status: response.status(),
        elapsed: start.elapsed(),
        json: json.as_ref(),
    });

    response
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

/// Buffer a JSON body so it can be both parsed and forwarded unchanged. A body
/// that fails mid-stream cannot be replayed, so it becomes a 500.
async fn capture_json(response: Response) -> (Response, Option<Value>) {
    if !is_json(&response) {
        return (response, None);
    }

    let (parts, body) = response.into_parts();
    match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => {
            let json = serde_json::from_slice(&bytes).ok();
            (Response::from_parts(parts, Body::from(bytes)), json)
        }
        Err(e) => {
            let err = AppError::Internal(format!("response body failed while buffering: {e}"));
            (err.into_response(), None)
        }
    }
}
