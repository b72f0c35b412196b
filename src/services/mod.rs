pub mod auth;
pub mod entitlements;
pub mod error;
pub mod plans;
pub mod users;

pub use auth::AuthService;
pub use entitlements::{ResourceKind, SqlUsageCounter, UsageCounter, ensure_within_limit};
pub use error::{ServiceError, ServiceResult};
