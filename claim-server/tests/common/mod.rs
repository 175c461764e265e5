//! Shared test harness
//!
//! Spins up a full server state against a throwaway RocksDB directory
//! and a recording notification gateway, and drives the real router
//! with oneshot requests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use claim_server::auth::{JwtConfig, JwtService};
use claim_server::core::server::build_router;
use claim_server::core::{Config, ServerState};
use claim_server::db;
use claim_server::db::models::ProfileCreate;
use claim_server::db::repository::ProfileRepository;
use claim_server::services::{NotificationGateway, RecordingGateway};
use shared::Role;

pub const TEST_SECRET: &str = "integration-test-secret-32-bytes!";
pub const WEBHOOK_SECRET: &str = "hook-secret";

pub struct TestApp {
    pub state: ServerState,
    pub gateway: Arc<RecordingGateway>,
    _tmp: tempfile::TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let tmp = tempfile::tempdir().expect("tempdir");

        let mut config = Config::with_overrides(tmp.path().to_string_lossy().to_string(), 0);
        config.jwt = JwtConfig {
            secret: TEST_SECRET.into(),
            expiration_minutes: 60,
            issuer: "identity-provider".into(),
            audience: "claim-server".into(),
        };
        config.telegram_bot_name = "test_claims_bot".into();
        config.webhook_secret = WEBHOOK_SECRET.into();

        let db = db::open(&tmp.path().join("database"))
            .await
            .expect("open database");

        let gateway = Arc::new(RecordingGateway::new());
        let jwt_service = Arc::new(JwtService::new(config.jwt.clone()));
        let state = ServerState::new(
            config,
            db,
            jwt_service,
            gateway.clone() as Arc<dyn NotificationGateway>,
        );

        Self {
            state,
            gateway,
            _tmp: tmp,
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Seed a directory profile, returning `(profile_id, bearer_token)`
    pub async fn seed_profile(&self, email: &str, name: &str, role: Role) -> (String, String) {
        let repo = ProfileRepository::new(self.state.db.clone());
        let profile = repo
            .create(ProfileCreate {
                email: email.into(),
                display_name: name.into(),
                role,
            })
            .await
            .expect("seed profile");
        let id = profile.id.expect("profile id").to_string();
        let token = self
            .state
            .jwt_service
            .generate_token(&id, email, name, role)
            .expect("token");
        (id, token)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("GET").uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = builder.body(Body::empty()).expect("request");
        self.send(request).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = builder
            .body(Body::from(body.to_string()))
            .expect("request");
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(
                String::from_utf8_lossy(&bytes).into_owned(),
            ))
        };
        (status, json)
    }
}
