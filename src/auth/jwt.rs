use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;

/// Distinguishes the two kinds of bearer token sharing one signing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims embedded in both access and refresh tokens.
///
/// Deserialization fails on any missing or mistyped field, so a decoded `Claims`
/// always carries a numeric user id and a list of role names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i32,
    pub roles: Vec<String>,
    pub token_type: TokenType,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued-at time (Unix timestamp).
    pub iat: i64,
    /// Unique token id; keeps two refresh tokens minted in the same second distinct.
    pub jti: String,
}

impl Claims {
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// A pair of access and refresh tokens returned on login and verification.
#[derive(Debug)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiration of the refresh token; stored on the session row.
    pub refresh_expires_at: DateTime<Utc>,
}

/// Generate a new access + refresh token pair for the given user.
///
/// # Errors
///
/// Returns an error if JWT encoding fails.
pub fn generate_token_pair(
    user_id: i32,
    roles: &[String],
    config: &Config,
) -> anyhow::Result<TokenPair> {
    let now = Utc::now();

    let access_token = generate_access_token(user_id, roles, config)?;

    #[allow(clippy::cast_possible_wrap)]
    let refresh_exp = now.timestamp() + config.jwt_refresh_expiration_secs as i64;
    let refresh_claims = Claims {
        user_id,
        roles: roles.to_vec(),
        token_type: TokenType::Refresh,
        exp: refresh_exp,
        iat: now.timestamp(),
        jti: Uuid::new_v4().to_string(),
    };
    let refresh_token = encode_claims(&refresh_claims, &config.jwt_secret)
        .map_err(|e| anyhow::anyhow!("Failed to encode refresh token: {e}"))?;

    let refresh_expires_at = DateTime::from_timestamp(refresh_exp, 0).unwrap_or_else(Utc::now);

    Ok(TokenPair {
        access_token,
        refresh_token,
        refresh_expires_at,
    })
}

/// Generate a standalone access token, as issued on refresh.
///
/// # Errors
///
/// Returns an error if JWT encoding fails.
pub fn generate_access_token(
    user_id: i32,
    roles: &[String],
    config: &Config,
) -> anyhow::Result<String> {
    let now = Utc::now();

    #[allow(clippy::cast_possible_wrap)]
    let access_exp = now.timestamp() + config.jwt_access_expiration_secs as i64;

    let claims = Claims {
        user_id,
        roles: roles.to_vec(),
        token_type: TokenType::Access,
        exp: access_exp,
        iat: now.timestamp(),
        jti: Uuid::new_v4().to_string(),
    };

    encode_claims(&claims, &config.jwt_secret)
        .map_err(|e| anyhow::anyhow!("Failed to encode access token: {e}"))
}

fn encode_claims(claims: &Claims, secret: &str) -> jsonwebtoken::errors::Result<String> {
    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &key)
}

fn decode_claims(token: &str, secret: &str, expected: TokenType) -> anyhow::Result<Claims> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &key, &validation)
        .map_err(|e| anyhow::anyhow!("Invalid token: {e}"))?;

    if token_data.claims.token_type != expected {
        return Err(anyhow::anyhow!("Unexpected token type"));
    }

    Ok(token_data.claims)
}

/// Validate an access token and return its claims.
///
/// # Errors
///
/// Returns an error if the token is invalid, expired, or not an access token.
pub fn validate_access_token(token: &str, secret: &str) -> anyhow::Result<Claims> {
    decode_claims(token, secret, TokenType::Access)
}

/// Validate a refresh token's signature and expiry and return its claims.
///
/// This says nothing about revocation; the session ledger is the authority on that.
///
/// # Errors
///
/// Returns an error if the token is invalid, expired, or not a refresh token.
pub fn validate_refresh_token(token: &str, secret: &str) -> anyhow::Result<Claims> {
    decode_claims(token, secret, TokenType::Refresh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Environment, MailConfig};

    fn config() -> Config {
        Config {
            database_url: String::new(),
            server_host: std::net::IpAddr::from([127, 0, 0, 1]),
            server_port: 0,
            environment: Environment::Development,
            log_level: "warn".to_string(),
            jwt_secret: "unit-test-secret".to_string(),
            jwt_access_expiration_secs: 900,
            jwt_refresh_expiration_secs: 604_800,
            frontend_url: String::new(),
            upload_dir: String::new(),
            mail: MailConfig::default(),
        }
    }

    #[test]
    fn access_token_carries_user_id_and_roles() {
        let config = config();
        let roles = vec!["member".to_string()];
        let token = generate_access_token(7, &roles, &config).unwrap_or_default();

        let claims = validate_access_token(&token, &config.jwt_secret);
        assert!(claims.is_ok());
        if let Ok(claims) = claims {
            assert_eq!(claims.user_id, 7);
            assert_eq!(claims.roles, roles);
            assert!(claims.has_role("member"));
            assert!(!claims.has_role("admin"));
            assert_eq!(claims.exp - claims.iat, 900);
        }
    }

    #[test]
    fn token_types_are_not_interchangeable() {
        let config = config();
        let pair = generate_token_pair(1, &[], &config);
        assert!(pair.is_ok());
        if let Ok(pair) = pair {
            assert!(validate_access_token(&pair.refresh_token, &config.jwt_secret).is_err());
            assert!(validate_refresh_token(&pair.access_token, &config.jwt_secret).is_err());
            assert!(validate_refresh_token(&pair.refresh_token, &config.jwt_secret).is_ok());
        }
    }

    #[test]
    fn refresh_tokens_are_unique_per_issue() {
        let config = config();
        let first = generate_token_pair(1, &[], &config).map(|p| p.refresh_token);
        let second = generate_token_pair(1, &[], &config).map(|p| p.refresh_token);
        assert!(first.is_ok() && second.is_ok());
        assert_ne!(first.ok(), second.ok());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let config = config();
        let token = generate_access_token(1, &[], &config).unwrap_or_default();
        assert!(validate_access_token(&token, "another-secret").is_err());
    }
}
