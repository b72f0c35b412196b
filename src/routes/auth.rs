use std::path::Path;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use uuid::Uuid;

use crate::auth::ClientInfo;
use crate::auth::middleware::AuthUser;
use crate::dto::{
    AccessTokenResponse, AuthResponse, EmailRequest, LoginRequest, MessageResponse,
    RefreshRequest, RegisterRequest, ResetPasswordRequest, UpdateNameRequest, UserResponse,
    VerifyCodeRequest,
};
use crate::error::AppError;
use crate::routes::UPLOADS_PATH;
use crate::state::AppState;

const AVATAR_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];
const AVATAR_MAX_BYTES: usize = 5 * 1024 * 1024;
/// Subdirectory of `UPLOAD_DIR` holding avatars.
const AVATAR_DIR: &str = "avatars";

/// Same reply whether or not the email belongs to an account.
const RESET_SENT: &str = "If the email is registered, a reset code has been sent.";

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

/// Build the auth route group: `/auth/...`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/verify-account", post(verify_account))
        .route("/resend-code", post(resend_code))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/forgot-password", post(forgot_password))
        .route("/resend-reset-code", post(forgot_password))
        .route("/verify-code", post(verify_code))
        .route("/reset-password", post(reset_password))
        .route("/me", get(me))
        .route(
            "/avatar",
            patch(update_avatar).layer(DefaultBodyLimit::max(AVATAR_MAX_BYTES + 64 * 1024)),
        )
        .route("/name", patch(update_name))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// `POST /api/v1/auth/register`
async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    state.auth_service().register(body).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(
            "Account created. Check your email for the verification code.",
        )),
    ))
}

/// `POST /api/v1/auth/login`
async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let client = ClientInfo::from_headers(&headers);
    let response = state
        .auth_service()
        .login(&body.email, &body.password, &client)
        .await?;
    Ok(Json(response))
}

/// `POST /api/v1/auth/verify-account`
async fn verify_account(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<VerifyCodeRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let client = ClientInfo::from_headers(&headers);
    let response = state
        .auth_service()
        .verify_account(&body.email, &body.code, &client)
        .await?;
    Ok(Json(response))
}

/// `POST /api/v1/auth/resend-code`
async fn resend_code(
    State(state): State<AppState>,
    Json(body): Json<EmailRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .auth_service()
        .resend_verification_code(&body.email)
        .await?;
    Ok(Json(MessageResponse::new("Verification code sent.")))
}

/// `POST /api/v1/auth/refresh`
async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<AccessTokenResponse>, AppError> {
    let access_token = state
        .auth_service()
        .refresh_access_token(&body.refresh_token)
        .await?;
    Ok(Json(AccessTokenResponse { access_token }))
}

/// `POST /api/v1/auth/logout`
async fn logout(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state.auth_service().logout(&body.refresh_token).await?;
    Ok(Json(MessageResponse::new("Logged out.")))
}

/// `POST /api/v1/auth/forgot-password` and `POST /api/v1/auth/resend-reset-code`
async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<EmailRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state.auth_service().forgot_password(&body.email).await?;
    Ok(Json(MessageResponse::new(RESET_SENT)))
}

/// `POST /api/v1/auth/verify-code`
async fn verify_code(
    State(state): State<AppState>,
    Json(body): Json<VerifyCodeRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .auth_service()
        .verify_reset_code(&body.email, &body.code)
        .await?;
    Ok(Json(MessageResponse::new("Code is valid.")))
}

/// `POST /api/v1/auth/reset-password`
async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state.auth_service().reset_password(body).await?;
    Ok(Json(MessageResponse::new("Password updated.")))
}

/// `GET /api/v1/auth/me`
async fn me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let view = state.auth_service().current_user(claims.user_id).await?;
    Ok(Json(view))
}

/// What the avatar form asked for.
enum AvatarChange {
    Clear,
    Upload { extension: String, data: Bytes },
}

/// `PATCH /api/v1/auth/avatar`
///
/// Multipart form with an `avatar` file, or an `avatar` text value of `null` to clear it.
/// The file is written only once the user resolves; the replaced file is removed afterwards.
async fn update_avatar(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    multipart: Multipart,
) -> Result<Json<UserResponse>, AppError> {
    let change = read_avatar_change(multipart).await?;
    let service = state.auth_service();
    let previous = service.avatar_of(claims.user_id).await?;

    let avatars_dir = Path::new(&state.config.upload_dir).join(AVATAR_DIR);
    let stored_name = match change {
        AvatarChange::Clear => None,
        AvatarChange::Upload { extension, data } => {
            tokio::fs::create_dir_all(&avatars_dir).await.map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Failed to create upload dir: {e}"))
            })?;
            let name = format!("{}.{extension}", Uuid::new_v4());
            tokio::fs::write(avatars_dir.join(&name), &data)
                .await
                .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to write file: {e}")))?;
            Some(name)
        }
    };

    let public_path = stored_name
        .as_ref()
        .map(|name| format!("{UPLOADS_PATH}/{AVATAR_DIR}/{name}"));
    let view = match service.update_avatar(claims.user_id, public_path).await {
        Ok(view) => view,
        Err(e) => {
            if let Some(name) = &stored_name {
                remove_avatar_file(&avatars_dir, name).await;
            }
            return Err(e.into());
        }
    };

    if let Some(old) = previous
        .as_deref()
        .and_then(stored_avatar_name)
        .filter(|old| stored_name.as_deref() != Some(*old))
    {
        remove_avatar_file(&avatars_dir, old).await;
    }
    Ok(Json(view))
}

async fn read_avatar_change(mut multipart: Multipart) -> Result<AvatarChange, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart data: {e}")))?
    {
        if field.name() != Some("avatar") {
            continue;
        }

        let Some(file_name) = field.file_name().map(str::to_string) else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(format!("Invalid avatar value: {e}")))?;
            if value.trim() != "null" {
                return Err(AppError::BadRequest(
                    "Send an image file, or \"null\" to remove the avatar.".to_string(),
                ));
            }
            return Ok(AvatarChange::Clear);
        };

        let extension = file_name.rsplit('.').next().unwrap_or("").to_lowercase();
        if !file_name.contains('.') || !AVATAR_EXTENSIONS.contains(&extension.as_str()) {
            return Err(AppError::BadRequest(
                "Unsupported file type. Allowed: PNG, JPG, GIF, WEBP.".to_string(),
            ));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read file data: {e}")))?;
        if data.is_empty() {
            return Err(AppError::BadRequest("Avatar file is empty.".to_string()));
        }
        if data.len() > AVATAR_MAX_BYTES {
            return Err(AppError::BadRequest(
                "File exceeds the 5 MB size limit.".to_string(),
            ));
        }
        return Ok(AvatarChange::Upload { extension, data });
    }

    Err(AppError::BadRequest("No avatar field provided.".to_string()))
}

/// File name of an avatar we stored, or `None` for anything outside the avatars directory.
fn stored_avatar_name(public_path: &str) -> Option<&str> {
    let name = public_path
        .strip_prefix(UPLOADS_PATH)?
        .strip_prefix('/')?
        .strip_prefix(AVATAR_DIR)?
        .strip_prefix('/')?;
    let plain = !name.is_empty() && !name.contains(['/', '\\']) && !name.starts_with('.');
    plain.then_some(name)
}

async fn remove_avatar_file(avatars_dir: &Path, name: &str) {
    if let Err(e) = tokio::fs::remove_file(avatars_dir.join(name)).await {
        tracing::warn!(error = %e, file = name, "failed to remove avatar file");
    }
}

/// `PATCH /api/v1/auth/name`
async fn update_name(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(body): Json<UpdateNameRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let view = state
        .auth_service()
        .update_name(claims.user_id, &body.name)
        .await?;
    Ok(Json(view))
}
