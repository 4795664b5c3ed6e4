use std::path::PathBuf;

use askama::Template;
use axum::extract::Request;
use axum::http::{header, Method, Uri};
use axum::response::{Html, IntoResponse, Response};

use super::RenderError;

/// Marker in `index.html` replaced with the server-rendered shell.
pub const APP_PLACEHOLDER: &str = "<!--app-html-->";
const DEV_CLIENT_SCRIPT: &str = r#"<script type="module" src="/@vite/client"></script>"#;

#[derive(Template)]
#[template(path = "app_shell.html")]
struct AppShell<'a> {
    url: &'a str,
}

/// Development bridge: assets come from the client dev server, documents are
/// assembled here from the on-disk template.
pub struct DevServer {
    client: reqwest::Client,
    upstream: String,
    client_dir: PathBuf,
}

impl DevServer {
    pub fn new(upstream: String, client_dir: PathBuf) -> Self {
        tracing::info!("Proxying client assets to {upstream}");
        Self {
            client: reqwest::Client::new(),
            upstream,
            client_dir,
        }
    }

    pub async fn handle(&self, req: Request) -> Result<Response, RenderError> {
        let uri = req.uri().clone();
        if is_asset_path(uri.path()) {
            let method = req.method().clone();
            return self.proxy(method, &uri).await;
        }

        let url = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
        self.render_document(url).await
    }

    async fn proxy(&self, method: Method, uri: &Uri) -> Result<Response, RenderError> {
        let path = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
        let target = format!("{}{path}", self.upstream);

        let upstream = self
            .client
            .request(method, &target)
            .send()
            .await
            .map_err(RenderError::Upstream)?;

        let status = upstream.status();
        let content_type = upstream.headers().get(header::CONTENT_TYPE).cloned();
        let body = upstream.bytes().await.map_err(RenderError::Upstream)?;

        let mut response = (status, body).into_response();
        if let Some(content_type) = content_type {
            response.headers_mut().insert(header::CONTENT_TYPE, content_type);
        }
        Ok(response)
    }

    async fn render_document(&self, url: &str) -> Result<Response, RenderError> {
        let path = self.client_dir.join("index.html");
        let template = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| RenderError::Template { path, source })?;

        let app_html = AppShell { url }.render().map_err(RenderError::Shell)?;
        let html = transform_index_html(&template).replacen(APP_PLACEHOLDER, &app_html, 1);

        Ok(Html(html).into_response())
    }
}

/// Requests the dev server answers itself: its internal modules, source
/// files, dependencies, and anything that looks like a file.
pub fn is_asset_path(path: &str) -> bool {
    if path.starts_with("/@") || path.starts_with("/src/") || path.starts_with("/node_modules/") {
        return true;
    }
    path.rsplit('/')
        .next()
        .is_some_and(|last| last.contains('.') && !last.ends_with('.'))
}

/// Load the dev client ahead of the page's own scripts.
pub fn transform_index_html(template: &str) -> String {
    if template.contains(DEV_CLIENT_SCRIPT) {
        return template.to_string();
    }
    match template.find("</head>") {
        Some(idx) => {
            let mut html = String::with_capacity(template.len() + DEV_CLIENT_SCRIPT.len());
            html.push_str(&template[..idx]);
            html.push_str(DEV_CLIENT_SCRIPT);
            html.push_str(&template[idx..]);
            html
        }
        None => format!("{DEV_CLIENT_SCRIPT}{template}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;

    const INDEX: &str = "<!doctype html><html><head><title>BarberShift</title></head>\
        <body><div id=\"root\"><!--app-html--></div>\
        <script type=\"module\" src=\"/src/main.tsx\"></script></body></html>";

    fn client_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("barbershift-client-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("index.html"), INDEX).unwrap();
        dir
    }

    fn request(uri: &str) -> Request {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[test]
    fn asset_paths() {
        assert!(is_asset_path("/@vite/client"));
        assert!(is_asset_path("/src/main.tsx"));
        assert!(is_asset_path("/node_modules/.vite/deps/react.js"));
        assert!(is_asset_path("/favicon.ico"));
        assert!(!is_asset_path("/"));
        assert!(!is_asset_path("/shifts/42"));
        assert!(!is_asset_path("/profile."));
    }

    #[test]
    fn dev_client_goes_before_head_close() {
        let html = transform_index_html(INDEX);
        let script = html.find(DEV_CLIENT_SCRIPT).unwrap();
        assert!(script < html.find("</head>").unwrap());
        assert_eq!(transform_index_html(&html), html);
    }

    #[tokio::test]
    async fn documents_get_the_rendered_shell() {
        let dir = client_dir();
        let dev = DevServer::new("http://127.0.0.1:9".to_string(), dir.clone());

        let resp = dev.handle(request("/shifts?page=2")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(
            resp.headers()[header::CONTENT_TYPE]
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!html.contains(APP_PLACEHOLDER));
        assert!(html.contains("id=\"app-shell\""));
        assert!(html.contains("data-url=\""));
        assert!(html.contains("page=2"));
        assert!(html.contains(DEV_CLIENT_SCRIPT));

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn missing_template_is_a_render_error() {
        let dir = std::env::temp_dir().join("barbershift-no-client-here");
        let dev = DevServer::new("http://127.0.0.1:9".to_string(), dir);
        let err = dev.handle(request("/")).await.unwrap_err();
        assert!(matches!(err, RenderError::Template { .. }));
    }

    #[tokio::test]
    async fn unreachable_dev_server_is_a_render_error() {
        let dir = client_dir();
        let dev = DevServer::new("http://127.0.0.1:9".to_string(), dir.clone());
        let err = dev.handle(request("/src/main.tsx")).await.unwrap_err();
        assert!(matches!(err, RenderError::Upstream(_)));

        std::fs::remove_dir_all(dir).unwrap();
    }
}
