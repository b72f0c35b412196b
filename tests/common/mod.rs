#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::Utc;
use http_body_util::BodyExt;
use migration::{Migrator, MigratorTrait};
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde_json::{Value, json};
use tower::ServiceExt;

use tailorbook_api::config::{Config, Environment, MailConfig};
use tailorbook_api::entities::{role, user, user_role};
use tailorbook_api::mail::{CodeMail, Mailer};
use tailorbook_api::state::AppState;

pub const JWT_SECRET: &str = "test-secret-key-for-testing-only-32chars";

pub fn test_config() -> Config {
    Config {
        database_url: String::new(),
        server_host: std::net::IpAddr::from([127, 0, 0, 1]),
        server_port: 0,
        environment: Environment::Development,
        log_level: "warn".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        jwt_access_expiration_secs: 900,
        jwt_refresh_expiration_secs: 604_800,
        frontend_url: "http://localhost:3001".to_string(),
        upload_dir: std::env::temp_dir()
            .join(format!("tailorbook-test-{}", uuid::Uuid::new_v4()))
            .to_string_lossy()
            .into_owned(),
        mail: MailConfig::default(),
    }
}

/// Captures outgoing code mails so tests can read the codes back.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<CodeMail>>,
}

impl RecordingMailer {
    /// Most recent code mailed to `email`.
    pub fn last_code_for(&self, email: &str) -> String {
        self.sent
            .lock()
            .map(|sent| {
                sent.iter()
                    .rev()
                    .find(|m| m.recipient() == email)
                    .map(|m| m.code().to_string())
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().map(|sent| sent.len()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: &CodeMail) -> anyhow::Result<()> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(mail.clone());
        }
        Ok(())
    }
}

/// Fails every send, to check that delivery problems never fail a request.
#[derive(Debug, Default)]
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _mail: &CodeMail) -> anyhow::Result<()> {
        anyhow::bail!("mail provider unavailable")
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    pub fn db(&self) -> &DatabaseConnection {
        &self.state.db
    }
}

/// Build the app router backed by an in-memory `SQLite` database with migrations.
pub async fn test_app() -> TestApp {
    let mailer = Arc::new(RecordingMailer::default());
    let state = test_state(mailer.clone()).await;
    TestApp {
        router: tailorbook_api::routes::router(&state.config).with_state(state.clone()),
        state,
        mailer,
    }
}

pub async fn test_state(mailer: Arc<dyn Mailer>) -> AppState {
    let db = sea_orm::Database::connect("sqlite::memory:")
        .await
        .unwrap_or_default();

    Migrator::up(&db, None).await.unwrap_or_default();

    AppState {
        db,
        config: test_config(),
        mailer,
    }
}

pub fn json(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or(Value::Null)
}

// ─────────────────────────────────────────────────────────────────────────────
// Request helpers
// ─────────────────────────────────────────────────────────────────────────────

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap_or_default();

    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .unwrap_or_default();
    let body_str = String::from_utf8(body.to_vec()).unwrap_or_default();

    (status, body_str)
}

fn request(method: &str, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(t) => builder.header(header::AUTHORIZATION, format!("Bearer {t}")),
        None => builder,
    }
}

fn with_json(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: &Value,
) -> Request<Body> {
    request(method, uri, token)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::USER_AGENT, "tailorbook-tests")
        .header("x-forwarded-for", "203.0.113.7")
        .body(Body::from(body.to_string()))
        .unwrap_or_default()
}

/// Test helper: send a GET request to the app and return (status, body).
pub async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    send(app, request("GET", uri, None).body(Body::empty()).unwrap_or_default()).await
}

pub async fn get_auth(app: &Router, uri: &str, token: &str) -> (StatusCode, String) {
    send(app, request("GET", uri, Some(token)).body(Body::empty()).unwrap_or_default()).await
}

pub async fn post_json(app: &Router, uri: &str, body: &Value) -> (StatusCode, String) {
    send(app, with_json("POST", uri, None, body)).await
}

pub async fn post_json_auth(
    app: &Router,
    uri: &str,
    token: &str,
    body: &Value,
) -> (StatusCode, String) {
    send(app, with_json("POST", uri, Some(token), body)).await
}

pub async fn put_json_auth(
    app: &Router,
    uri: &str,
    token: &str,
    body: &Value,
) -> (StatusCode, String) {
    send(app, with_json("PUT", uri, Some(token), body)).await
}

pub async fn patch_json_auth(
    app: &Router,
    uri: &str,
    token: &str,
    body: &Value,
) -> (StatusCode, String) {
    send(app, with_json("PATCH", uri, Some(token), body)).await
}

pub async fn patch_auth(app: &Router, uri: &str, token: &str) -> (StatusCode, String) {
    send(app, request("PATCH", uri, Some(token)).body(Body::empty()).unwrap_or_default()).await
}

pub const BOUNDARY: &str = "tailorbook-boundary";

/// Send a multipart body built by [`multipart_file`] or [`multipart_text`].
pub async fn patch_multipart(
    app: &Router,
    uri: &str,
    token: &str,
    body: Vec<u8>,
) -> (StatusCode, String) {
    let request = request("PATCH", uri, Some(token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap_or_default();
    send(app, request).await
}

pub fn multipart_file(field: &str, file_name: &str, data: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_text(field: &str, value: &str) -> Vec<u8> {
    format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"\r\n\r\n{value}\r\n--{BOUNDARY}--\r\n"
    )
    .into_bytes()
}

// ─────────────────────────────────────────────────────────────────────────────
// Account helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Register an account and return the verification code that was mailed.
pub async fn register(app: &TestApp, name: &str, email: &str, password: &str) -> String {
    let (status, body) = post_json(
        &app.router,
        "/api/v1/auth/register",
        &json!({
            "name": name,
            "email": email,
            "password": password,
            "confirm_password": password,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    app.mailer.last_code_for(email)
}

/// Register and verify an account; returns the login response body.
pub async fn register_verified(app: &TestApp, name: &str, email: &str, password: &str) -> Value {
    let code = register(app, name, email, password).await;
    let (status, body) = post_json(
        &app.router,
        "/api/v1/auth/verify-account",
        &json!({ "email": email, "code": code }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "verify failed: {body}");
    json(&body)
}

pub async fn login(app: &TestApp, email: &str, password: &str) -> (StatusCode, Value) {
    let (status, body) = post_json(
        &app.router,
        "/api/v1/auth/login",
        &json!({ "email": email, "password": password }),
    )
    .await;
    (status, json(&body))
}

pub async fn find_user(db: &DatabaseConnection, email: &str) -> Option<user::Model> {
    user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await
        .unwrap_or_default()
}

/// Grant the admin role and return a fresh access token carrying it.
pub async fn admin_token(app: &TestApp, email: &str) -> String {
    let body = register_verified(app, "Admin", email, "admin-secret").await;
    let user_id = i32::try_from(body["user"]["id"].as_i64().unwrap_or_default()).unwrap_or_default();

    let admin = role::Entity::find()
        .filter(role::Column::Name.eq(role::ADMIN))
        .one(app.db())
        .await
        .unwrap_or_default();
    if let Some(admin) = admin {
        let _ = user_role::ActiveModel {
            user_id: Set(user_id),
            role_id: Set(admin.id),
        }
        .insert(app.db())
        .await;
    }

    let (_, body) = login(app, email, "admin-secret").await;
    body["access_token"].as_str().unwrap_or_default().to_string()
}

pub fn now() -> chrono::DateTime<chrono::FixedOffset> {
    Utc::now().fixed_offset()
}
