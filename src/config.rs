use std::net::{IpAddr, SocketAddr};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: IpAddr,
    pub server_port: u16,
    pub environment: Environment,
    pub log_level: String,
    pub jwt_secret: String,
    pub jwt_access_expiration_secs: u64,
    pub jwt_refresh_expiration_secs: u64,
    pub frontend_url: String,
    pub upload_dir: String,
    pub mail: MailConfig,
}

/// Outbound mail settings. Without an API key, mail is written to the log instead.
#[derive(Debug, Clone, Default)]
pub struct MailConfig {
    pub resend_api_key: Option<String>,
    pub from_address: String,
}

/// Deployment environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// 15 minutes.
const DEFAULT_ACCESS_EXPIRATION_SECS: u64 = 900;
/// 7 days.
const DEFAULT_REFRESH_EXPIRATION_SECS: u64 = 604_800;

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required: `DATABASE_URL`, `JWT_SECRET`
    /// Optional with defaults: `SERVER_HOST`, `SERVER_PORT`, `ENVIRONMENT`, `LOG_LEVEL`,
    /// `JWT_ACCESS_EXPIRATION_SECS`, `JWT_REFRESH_EXPIRATION_SECS`, `FRONTEND_URL`,
    /// `UPLOAD_DIR`, `RESEND_API_KEY`, `MAIL_FROM`
    ///
    /// `PORT` overrides `SERVER_PORT`, and the host defaults to `0.0.0.0` in production.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value fails to parse.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let jwt_secret =
            std::env::var("JWT_SECRET").map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?;

        let environment = match std::env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string())
            .as_str()
        {
            "production" => Environment::Production,
            "staging" => Environment::Staging,
            _ => Environment::Development,
        };

        let server_port = std::env::var("PORT")
            .or_else(|_| std::env::var("SERVER_PORT"))
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| anyhow::anyhow!("SERVER_PORT / PORT must be a valid u16"))?;

        let default_host = if environment == Environment::Production {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        };

        let server_host = std::env::var("SERVER_HOST")
            .unwrap_or_else(|_| default_host.to_string())
            .parse::<IpAddr>()
            .map_err(|_| anyhow::anyhow!("SERVER_HOST must be a valid IP address"))?;

        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let jwt_access_expiration_secs =
            parse_secs("JWT_ACCESS_EXPIRATION_SECS", DEFAULT_ACCESS_EXPIRATION_SECS)?;
        let jwt_refresh_expiration_secs =
            parse_secs("JWT_REFRESH_EXPIRATION_SECS", DEFAULT_REFRESH_EXPIRATION_SECS)?;

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3001".to_string());
        let upload_dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());

        let mail = MailConfig {
            resend_api_key: std::env::var("RESEND_API_KEY")
                .ok()
                .filter(|key| !key.is_empty()),
            from_address: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "Tailorbook <noreply@tailorbook.app>".to_string()),
        };

        Ok(Self {
            database_url,
            server_host,
            server_port,
            environment,
            log_level,
            jwt_secret,
            jwt_access_expiration_secs,
            jwt_refresh_expiration_secs,
            frontend_url,
            upload_dir,
            mail,
        })
    }

    /// Build the socket address for the server to bind to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server_host, self.server_port)
    }
}

fn parse_secs(var: &str, default: u64) -> anyhow::Result<u64> {
    std::env::var(var).map_or(Ok(default), |raw| {
        raw.parse::<u64>()
            .map_err(|_| anyhow::anyhow!("{var} must be a whole number of seconds"))
    })
}
