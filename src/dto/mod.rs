pub mod auth;
pub mod plan;
pub mod user;

use chrono::{DateTime, TimeZone};
use serde::Serialize;

pub use auth::{
    AccessTokenResponse, AuthResponse, EmailRequest, LoginRequest, RefreshRequest,
    RegisterRequest, ResetPasswordRequest, UpdateNameRequest, VerifyCodeRequest,
};
pub use plan::{CreatePlanRequest, PlanResponse, UpdatePlanRequest};
pub use user::{AccountStatusResponse, UserResponse};

/// Timestamp layout used in every response body.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_timestamp<Tz: TimeZone>(ts: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    ts.format(TIMESTAMP_FORMAT).to_string()
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
