#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use fitcoach::{
    app::build_app,
    auth::{jwt::JwtKeys, password::hash_password, repo_types::NewUser, Role, User},
    config::{AppConfig, JwtConfig, ServerConfig},
    state::{AppState, MIGRATOR},
};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use uuid::Uuid;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    keys: JwtKeys,
}

/// Connects to `TEST_DATABASE_URL` and migrates it.
///
/// Database tests are `#[ignore]`d and run with
/// `TEST_DATABASE_URL=postgres://... cargo test -- --ignored`.
pub async fn setup() -> TestApp {
    let url = std::env::var("TEST_DATABASE_URL")
        .expect("TEST_DATABASE_URL must point at a scratch Postgres database");

    let db = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("connect to test database");
    MIGRATOR.run(&db).await.expect("run migrations");

    let jwt = JwtConfig {
        secret: "integration-secret".into(),
        issuer: "fitcoach-test".into(),
        audience: "fitcoach-test-users".into(),
        ttl_minutes: 10,
        refresh_ttl_minutes: 60,
    };
    let keys = JwtKeys::from(&jwt);
    let config = Arc::new(AppConfig {
        database_url: url,
        db_max_connections: 5,
        jwt,
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
        },
    });
    let state = AppState::from_parts(db, config);

    TestApp {
        router: build_app(state.clone()),
        state,
        keys,
    }
}

pub fn unique(prefix: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{prefix}_{}", &id[..12])
}

impl TestApp {
    /// Inserts a user straight through the repository and returns it with an access token.
    pub async fn user(&self, role: Role) -> (User, String) {
        let username = unique(if role == Role::Admin { "admin" } else { "client" });
        let email = format!("{username}@test.local");
        let hash = hash_password("password123").expect("hash");
        let user = User::create(
            &self.state.db,
            &NewUser {
                username: &username,
                email: &email,
                password_hash: &hash,
                full_name: "Test User",
                phone: None,
                role,
            },
        )
        .await
        .expect("create user");
        let token = self.keys.sign_access(&user).expect("sign token");
        (user, token)
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            builder = builder.header("authorization", format!("Bearer {t}"));
        }
        let body = match body {
            Some(v) => {
                builder = builder.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };

        let res = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("response");
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .expect("body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, json)
    }
}
