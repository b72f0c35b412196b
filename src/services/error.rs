use sea_orm::DbErr;
use thiserror::Error;

/// Failures raised by the service layer, independent of the HTTP surface.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    /// Unknown email and wrong password share this variant so callers cannot tell them apart.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("please verify your email first")]
    AccountNotVerified,

    #[error("account is inactive")]
    AccountInactive,

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("account is already verified")]
    AlreadyVerified,

    #[error("invalid or expired code")]
    InvalidOrExpiredCode,

    #[error("plan limit reached ({0})")]
    LimitReached(i32),

    #[error(transparent)]
    Database(#[from] DbErr),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
