use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use barbershift::auth::service;
use barbershift::config::{AdminSeed, Config, Environment};
use barbershift::session;
use barbershift::state::AppState;

pub const SHELL_MARKER: &str = "<div id=\"root\"></div>";

/// A running test server instance with a dedicated test database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: PgPool,
    pub db_name: String,
    pub dist_dir: PathBuf,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// A fresh browser: its own cookie jar, no redirects.
    pub fn client(&self) -> Client {
        Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap()
    }

    pub async fn register(
        &self,
        client: &Client,
        email: &str,
        password: &str,
        user_type: &str,
    ) -> (Value, StatusCode) {
        self.post(
            client,
            "/api/auth/register",
            &json!({
                "email": email,
                "password": password,
                "firstName": "Test",
                "lastName": "User",
                "userType": user_type,
            }),
        )
        .await
    }

    pub async fn login(&self, client: &Client, email: &str, password: &str) -> (Value, StatusCode) {
        self.post(
            client,
            "/api/auth/login",
            &json!({ "email": email, "password": password }),
        )
        .await
    }

    /// Register a user on a new client and return that (logged-in) client.
    pub async fn signed_in(&self, email: &str, user_type: &str) -> Client {
        let client = self.client();
        let (body, status) = self.register(&client, email, "password123", user_type).await;
        assert_eq!(status, StatusCode::OK, "register failed: {body}");
        client
    }

    /// Provision an admin directly and return a logged-in client for it.
    pub async fn signed_in_admin(&self) -> Client {
        let seed = AdminSeed {
            email: "admin@test.com".to_string(),
            password: "admin-password".to_string(),
        };
        service::ensure_admin(&self.pool, &seed)
            .await
            .expect("failed to provision admin");

        let client = self.client();
        let (body, status) = self.login(&client, &seed.email, &seed.password).await;
        assert_eq!(status, StatusCode::OK, "admin login failed: {body}");
        client
    }

    pub async fn get(&self, client: &Client, path: &str) -> (Value, StatusCode) {
        let resp = client
            .get(self.url(path))
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn post(&self, client: &Client, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn put(&self, client: &Client, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("put request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn patch(&self, client: &Client, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = client
            .patch(self.url(path))
            .json(body)
            .send()
            .await
            .expect("patch request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

fn admin_url(base_url: &str) -> String {
    base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.to_string())
}

/// Spawn a test app with a fresh temporary database and client build.
pub async fn spawn_app() -> TestApp {
    let _ = dotenvy::dotenv();

    let base_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    let db_name = format!("barbershift_test_{}", Uuid::now_v7().simple());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let store = session::open_store(pool.clone())
        .await
        .expect("Failed to create session table");

    let dist_dir = std::env::temp_dir().join(&db_name);
    std::fs::create_dir_all(&dist_dir).unwrap();
    std::fs::write(
        dist_dir.join("index.html"),
        format!("<!doctype html><html><body>{SHELL_MARKER}</body></html>"),
    )
    .unwrap();

    let config = Config {
        database_url: test_url,
        session_secret: "test-session-secret-that-is-long-enough".to_string(),
        environment: Environment::Test,
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        log_level: "warn".to_string(),
        max_body_size: 1_048_576,
        session_cleanup_interval: Duration::from_secs(600),
        dev_server_url: "http://127.0.0.1:9".to_string(),
        client_dir: PathBuf::from("client"),
        dist_dir: dist_dir.clone(),
        admin: None,
    };

    let state = AppState::new(pool.clone(), config).expect("client build should exist");
    let app = barbershift::build_app(state, store);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        pool,
        db_name,
        dist_dir,
    }
}

/// Drop the test database after tests complete.
pub async fn cleanup(app: TestApp) {
    let db_name = app.db_name.clone();
    app.pool.close().await;
    let _ = std::fs::remove_dir_all(&app.dist_dir);

    let base_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
