use axum::extract::{Path, State};
use axum::routing::patch;
use axum::{Json, Router};

use crate::auth::middleware::AdminUser;
use crate::dto::AccountStatusResponse;
use crate::error::AppError;
use crate::services::users::UserAdminService;
use crate::state::AppState;

/// Build the admin user route group: `/users/...`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/ban", patch(ban_user))
        .route("/{id}/activate", patch(activate_user))
}

/// `PATCH /api/v1/users/{id}/ban`
async fn ban_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i32>,
) -> Result<Json<AccountStatusResponse>, AppError> {
    tracing::info!(admin_id = admin.user_id, target = id, "ban requested");
    let account = UserAdminService::set_active(&state.db, id, false).await?;
    Ok(Json(AccountStatusResponse::from(&account)))
}

/// `PATCH /api/v1/users/{id}/activate`
async fn activate_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i32>,
) -> Result<Json<AccountStatusResponse>, AppError> {
    tracing::info!(admin_id = admin.user_id, target = id, "activation requested");
    let account = UserAdminService::set_active(&state.db, id, true).await?;
    Ok(Json(AccountStatusResponse::from(&account)))
}
