use chrono::{DateTime, Duration, FixedOffset, Utc};
use rand::Rng;

/// Lifetime of verification and password-reset codes, in seconds.
pub const CODE_TTL_SECS: i64 = 120;

/// Absolute expiry for a code issued now.
#[must_use]
pub fn code_expiry() -> DateTime<FixedOffset> {
    (Utc::now() + Duration::seconds(CODE_TTL_SECS)).fixed_offset()
}

/// Generate a zero-padded six-digit numeric code.
#[must_use]
pub fn generate_six_digit_code() -> String {
    let code: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{code:06}")
}
