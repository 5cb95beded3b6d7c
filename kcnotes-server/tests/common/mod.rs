#![allow(dead_code)]

use anyhow::Result;
use axum::{
    body::{Body, Bytes},
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use kcnotes_server::{connect_pool, routes, run_migrations, sqlite_url_for_path, AppState, Config};
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

pub const SECRET: &str = "test-secret";

/// Router completo su un database temporaneo, uno per test.
pub struct TestApp {
    pub app: Router,
    pub pool: SqlitePool,
    _dir: TempDir,
}

pub async fn spawn_app() -> Result<TestApp> {
    let dir = TempDir::new()?;
    let url = sqlite_url_for_path(&dir.path().join("kcnotes.db"))?;
    let pool = connect_pool(&url).await?;
    run_migrations(&pool).await?;
    let config = Config::from_lookup(|key| (key == "SECRET").then(|| SECRET.to_string()))?;
    let app = routes::router(AppState::new(pool.clone(), config));
    Ok(TestApp { app, pool, _dir: dir })
}

pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is json")
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl TestApp {
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<String>,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(b) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(b)
            }
            None => Body::empty(),
        };
        let resp = self.app.clone().oneshot(builder.body(body)?).await?;
        let status = resp.status();
        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.into_body().collect().await?.to_bytes();
        Ok(TestResponse { status, content_type, body })
    }

    pub async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Result<TestResponse> {
        self.send_raw(method, uri, token, body.map(|v| v.to_string())).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<TestResponse> {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Result<TestResponse> {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    /// Signup riuscito, restituisce il token.
    pub async fn signup(&self, username: &str, password: &str) -> Result<String> {
        let resp = self
            .post("/auth/signup", None, serde_json::json!({ "username": username, "password": password }))
            .await?;
        assert_eq!(resp.status, StatusCode::CREATED, "signup failed: {}", resp.text());
        Ok(token_of(&resp.json()))
    }

    pub async fn user_id(&self, username: &str) -> Result<i64> {
        Ok(sqlx::query_scalar("SELECT id FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await?)
    }
}

pub fn token_of(v: &Value) -> String {
    v["data"]["token"].as_str().expect("token in response").to_string()
}
