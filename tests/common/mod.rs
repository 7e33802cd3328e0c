#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use tenant_notes::auth::{PasswordService, TokenService};
use tenant_notes::config::AppConfig;
use tenant_notes::database::{seed, MemoryStore, Store};
use tenant_notes::routes::{self, AppState};
use tenant_notes::services::Pipeline;

pub const PASSWORD: &str = seed::DEMO_PASSWORD;
pub const SECRET: &str = "integration-test-secret";

/// Router over a seeded in-memory store, driven in-process
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub config: AppConfig,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn code(&self) -> Option<&str> {
        self.body["code"].as_str()
    }

    pub fn error(&self) -> Option<&str> {
        self.body["error"].as_str()
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.jwt_secret = SECRET.to_string();
    // Minimum argon2 cost keeps the suite fast
    config.security.password_memory_kib = 8;
    config.security.password_iterations = 1;
    config.security.password_parallelism = 1;
    config
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(test_config()).await
    }

    pub async fn spawn_with(config: AppConfig) -> Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let store = Arc::new(MemoryStore::new());
        let passwords = PasswordService::from_config(&config.security)?;
        seed::seed_demo_data(store.as_ref(), &passwords).await?;

        let pipeline = Pipeline::from_config(store.clone(), &config).context("pipeline")?;
        let router = routes::router(AppState::new(Arc::new(pipeline)), &config.security);

        Ok(Self { router, store, config })
    }

    pub fn tokens(&self) -> TokenService {
        TokenService::from_config(&self.config.security).expect("token service")
    }

    pub async fn tenant_id(&self, slug: &str) -> Result<i64> {
        Ok(self
            .store
            .find_tenant_by_slug(slug)
            .await?
            .context("tenant not seeded")?
            .id)
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> Result<TestResponse> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).with_context(|| {
                format!("non-JSON body: {}", String::from_utf8_lossy(&bytes))
            })?
        };
        Ok(TestResponse { status, headers, body })
    }

    pub async fn get(&self, path: &str, token: &str) -> Result<TestResponse> {
        self.request(Method::GET, path, Some(token), None).await
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> Result<TestResponse> {
        self.request(Method::POST, path, Some(token), Some(body)).await
    }

    pub async fn put(&self, path: &str, token: &str, body: Value) -> Result<TestResponse> {
        self.request(Method::PUT, path, Some(token), Some(body)).await
    }

    pub async fn patch(&self, path: &str, token: &str, body: Value) -> Result<TestResponse> {
        self.request(Method::PATCH, path, Some(token), Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: &str) -> Result<TestResponse> {
        self.request(Method::DELETE, path, Some(token), None).await
    }

    pub async fn try_login(&self, email: &str, password: &str, tenant: Option<&str>) -> Result<TestResponse> {
        let mut body = serde_json::json!({ "email": email, "password": password });
        if let Some(slug) = tenant {
            body["tenant"] = Value::String(slug.to_string());
        }
        self.request(Method::POST, "/auth/login", None, Some(body)).await
    }

    /// Log in with the demo password and return the access token
    pub async fn login(&self, email: &str) -> Result<String> {
        let res = self.try_login(email, PASSWORD, None).await?;
        anyhow::ensure!(res.status == StatusCode::OK, "login failed for {}: {}", email, res.body);
        res.data()["access_token"]
            .as_str()
            .map(str::to_string)
            .context("missing access_token")
    }

    pub async fn create_note(&self, token: &str, title: &str) -> Result<TestResponse> {
        self.post("/notes", token, serde_json::json!({ "title": title, "content": "body" }))
            .await
    }
}
