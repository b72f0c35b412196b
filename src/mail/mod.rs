//! Outbound email delivery for verification and password-reset codes.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;

use crate::config::MailConfig;

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

/// A message that carries a one-time code to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeMail {
    Verification { to: String, code: String },
    PasswordReset { to: String, code: String },
}

impl CodeMail {
    #[must_use]
    pub fn recipient(&self) -> &str {
        match self {
            Self::Verification { to, .. } | Self::PasswordReset { to, .. } => to,
        }
    }

    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Verification { code, .. } | Self::PasswordReset { code, .. } => code,
        }
    }

    fn subject(&self) -> &'static str {
        match self {
            Self::Verification { .. } => "Verify your Tailorbook account",
            Self::PasswordReset { .. } => "Your Tailorbook password reset code",
        }
    }

    fn html(&self) -> String {
        let intro = match self {
            Self::Verification { .. } => "Use this code to verify your account:",
            Self::PasswordReset { .. } => "Use this code to reset your password:",
        };
        format!(
            "<p>{intro}</p><h2 style=\"letter-spacing:4px\">{}</h2><p>The code expires in 2 minutes.</p>",
            self.code()
        )
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &CodeMail) -> Result<()>;
}

/// Build the mailer selected by configuration.
#[must_use]
pub fn from_config(config: &MailConfig) -> Arc<dyn Mailer> {
    match &config.resend_api_key {
        Some(key) => Arc::new(ResendMailer::new(key.clone(), config.from_address.clone())),
        None => {
            tracing::warn!("RESEND_API_KEY not set, codes will only be logged");
            Arc::new(LogMailer)
        }
    }
}

/// Writes codes to the log instead of delivering them. Used in development.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: &CodeMail) -> Result<()> {
        tracing::info!(to = mail.recipient(), code = mail.code(), "{}", mail.subject());
        Ok(())
    }
}

/// Delivers mail through the Resend HTTP API.
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
    from: String,
}

#[derive(Debug, Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: String,
}

impl ResendMailer {
    #[must_use]
    pub fn new(api_key: String, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            from,
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, mail: &CodeMail) -> Result<()> {
        let body = ResendRequest {
            from: &self.from,
            to: [mail.recipient()],
            subject: mail.subject(),
            html: mail.html(),
        };

        let response = self
            .client
            .post(RESEND_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to reach Resend")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Resend API error {status}: {text}");
        }

        tracing::debug!(to = mail.recipient(), "mail sent");
        Ok(())
    }
}
