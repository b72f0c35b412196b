pub mod plan;
pub mod role;
pub mod session;
pub mod subscription;
pub mod subscription_status;
pub mod user;
pub mod user_role;
pub mod verification_code;
pub mod wallet;

pub use subscription_status::SubscriptionStatus;
