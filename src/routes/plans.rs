use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, put};
use axum::{Json, Router};

use crate::auth::middleware::AdminUser;
use crate::dto::{CreatePlanRequest, PlanResponse, UpdatePlanRequest};
use crate::error::AppError;
use crate::services::plans::PlanService;
use crate::state::AppState;

/// Build the plan route group: `/plans/...`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all).post(create_plan))
        .route("/active", get(list_active))
        .route("/{id}", put(update_plan))
        .route("/{id}/activate", patch(activate_plan))
        .route("/{id}/deactivate", patch(deactivate_plan))
}

/// `GET /api/v1/plans/active`
async fn list_active(State(state): State<AppState>) -> Result<Json<Vec<PlanResponse>>, AppError> {
    let plans = PlanService::list_active(&state.db).await?;
    Ok(Json(plans.into_iter().map(PlanResponse::from).collect()))
}

/// `GET /api/v1/plans`
async fn list_all(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<PlanResponse>>, AppError> {
    let plans = PlanService::list_all(&state.db).await?;
    Ok(Json(plans.into_iter().map(PlanResponse::from).collect()))
}

/// `POST /api/v1/plans`
async fn create_plan(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(body): Json<CreatePlanRequest>,
) -> Result<(StatusCode, Json<PlanResponse>), AppError> {
    let created = PlanService::create(&state.db, body).await?;
    Ok((StatusCode::CREATED, Json(PlanResponse::from(created))))
}

/// `PUT /api/v1/plans/{id}`
async fn update_plan(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
    Json(body): Json<UpdatePlanRequest>,
) -> Result<Json<PlanResponse>, AppError> {
    let updated = PlanService::update(&state.db, id, body).await?;
    Ok(Json(PlanResponse::from(updated)))
}

/// `PATCH /api/v1/plans/{id}/activate`
async fn activate_plan(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<Json<PlanResponse>, AppError> {
    let updated = PlanService::set_active(&state.db, id, true).await?;
    Ok(Json(PlanResponse::from(updated)))
}

/// `PATCH /api/v1/plans/{id}/deactivate`
async fn deactivate_plan(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<Json<PlanResponse>, AppError> {
    let updated = PlanService::set_active(&state.db, id, false).await?;
    Ok(Json(PlanResponse::from(updated)))
}
