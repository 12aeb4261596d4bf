//! Shared test fixtures: an in-memory `SharedStore` double, a store that
//! always fails (for fail-open/fail-closed tests) and router builders.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use gateway::config::Config;
use gateway::proxy::upstream::UpstreamClient;
use gateway::routes::RouteTable;
use gateway::store::SharedStore;
use gateway::token::{Claims, TokenVerifier};
use gateway::AppState;

pub const SECRET: &str = "test-secret";

struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-memory stand-in for Redis. TTLs are honoured against `Instant::now()`;
/// `clear()` force-expires everything, which tests use to simulate a window
/// rolling over.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

#[async_trait]
impl SharedStore for MemoryStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let mut map = self.entries.lock().unwrap();
        match map.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.value.clone())),
            Some(_) => {
                map.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> anyhow::Result<()> {
        self.entries.lock().unwrap().insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + Duration::from_secs(ttl_secs),
            },
        );
        Ok(())
    }

    async fn increment(&self, key: &str, window_secs: u64) -> anyhow::Result<u64> {
        let mut map = self.entries.lock().unwrap();
        let now = Instant::now();
        match map.get_mut(key) {
            Some(entry) if entry.expires_at > now => {
                let count: u64 = entry.value.parse().unwrap_or(0) + 1;
                entry.value = count.to_string();
                Ok(count)
            }
            _ => {
                map.insert(
                    key.to_string(),
                    Entry {
                        value: "1".to_string(),
                        expires_at: now + Duration::from_secs(window_secs),
                    },
                );
                Ok(1)
            }
        }
    }
}

/// A store whose every operation fails, as if Redis were unreachable.
pub struct FailingStore;

#[async_trait]
impl SharedStore for FailingStore {
    async fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
        anyhow::bail!("store down")
    }

    async fn set_ex(&self, _key: &str, _value: &str, _ttl_secs: u64) -> anyhow::Result<()> {
        anyhow::bail!("store down")
    }

    async fn increment(&self, _key: &str, _window_secs: u64) -> anyhow::Result<u64> {
        anyhow::bail!("store down")
    }
}

pub fn test_config(auth: &str, payment: &str, resource: &str) -> Config {
    Config {
        port: 0,
        redis_url: "redis://unused".into(),
        jwt_secret: SECRET.into(),
        auth_service_url: auth.into(),
        payment_service_url: payment.into(),
        resource_service_url: resource.into(),
        rate_limit_max: 100,
        rate_limit_window_secs: 60,
        rate_limit_fail_open: false,
    }
}

pub fn build_app(cfg: Config, store: Arc<dyn SharedStore>) -> Router {
    let routes = RouteTable::from_config(&cfg).expect("valid route table");
    let verifier = TokenVerifier::new(&cfg.jwt_secret);
    let state = Arc::new(AppState {
        store,
        verifier,
        routes,
        upstream: UpstreamClient::new(),
        config: cfg,
    });
    gateway::build_router(state)
}

/// Signs a token the way the auth service would.
pub fn sign_token(sub: &str, ttl_secs: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: sub.into(),
        iat: now,
        exp: now + ttl_secs,
        extra: HashMap::new(),
    };
    TokenVerifier::new(SECRET).sign(&claims).expect("sign token")
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let resp = app.clone().oneshot(req).await.expect("infallible");
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

pub fn get(path: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .body(Body::empty())
        .expect("build request")
}

pub fn get_with_token(path: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .expect("build request")
}

pub fn error_code(body: &serde_json::Value) -> &str {
    body["error"]["code"].as_str().unwrap_or("")
}
