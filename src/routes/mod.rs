mod auth;
mod health;
mod plans;
mod users;

use axum::Router;
use tower_http::services::ServeDir;

use crate::config::Config;
use crate::state::AppState;

/// Public URL prefix under which `UPLOAD_DIR` is served.
pub const UPLOADS_PATH: &str = "/uploads";

/// Build the complete application router.
///
/// Structure:
/// - `GET /health`: lightweight liveness check
/// - `GET /uploads/...`: stored user files such as avatars
/// - `/api/v1/health`, `/api/v1/auth/...`, `/api/v1/users/...`, `/api/v1/plans/...`
pub fn router(config: &Config) -> Router<AppState> {
    let api_v1 = Router::new()
        .merge(health::api_router())
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/plans", plans::router());

    Router::new()
        .merge(health::root_router())
        .nest_service(UPLOADS_PATH, ServeDir::new(&config.upload_dir))
        .nest("/api/v1", api_v1)
}
