use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::Config;
use crate::mail::Mailer;
use crate::services::AuthService;

/// Shared application state available to all request handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Config,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Auth orchestrator borrowing this state's connection, config and mailer.
    #[must_use]
    pub fn auth_service(&self) -> AuthService<'_> {
        AuthService::new(&self.db, &self.config, self.mailer.as_ref())
    }
}
