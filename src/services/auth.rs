//! Account lifecycle: registration, verification, login, refresh, logout,
//! password reset and profile updates.
//!
//! This is the only writer of credential and session state. Every flow that
//! returns a user goes through [`AuthService::user_view`].

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect,
    TransactionTrait,
};

use crate::auth::{ClientInfo, codes, jwt, password};
use crate::config::Config;
use crate::dto::{AuthResponse, RegisterRequest, ResetPasswordRequest, UserResponse};
use crate::entities::{
    SubscriptionStatus, plan, role, subscription, user, user_role, verification_code, wallet,
};
use crate::mail::{CodeMail, Mailer};
use crate::services::{ServiceError, ServiceResult, entitlements};
use crate::sessions;

/// Emails are matched case-insensitively and without surrounding whitespace.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub struct AuthService<'a> {
    db: &'a DatabaseConnection,
    config: &'a Config,
    mailer: &'a dyn Mailer,
}

impl<'a> AuthService<'a> {
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection, config: &'a Config, mailer: &'a dyn Mailer) -> Self {
        Self { db, config, mailer }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Registration & verification
    // ─────────────────────────────────────────────────────────────────────────

    /// Create an account, or refresh a pending one, and mail a verification code.
    ///
    /// An existing unverified account with the same email is overwritten with the
    /// new name and password rather than duplicated.
    ///
    /// # Errors
    ///
    /// `Validation` on bad input, `Conflict` if a verified account owns the email.
    pub async fn register(&self, req: RegisterRequest) -> ServiceResult<()> {
        password::validate_confirmation(&req.password, &req.confirm_password)
            .map_err(ServiceError::Validation)?;

        let email = normalize_email(&req.email);
        let name = req.name.trim().to_string();
        password::validate_name(&name).map_err(ServiceError::Validation)?;
        password::validate_email(&email).map_err(ServiceError::Validation)?;
        password::validate_password(&req.password).map_err(ServiceError::Validation)?;

        let password_hash = password::hash_password(&req.password)?;
        let now = Utc::now().fixed_offset();

        match self.find_by_email(&email).await? {
            Some(existing) if existing.is_verified => {
                return Err(ServiceError::Conflict("email is already registered".to_string()));
            }
            Some(existing) => {
                tracing::info!(user_id = existing.id, "re-registration of unverified account");
                let mut active: user::ActiveModel = existing.into();
                active.name = Set(name);
                active.password_hash = Set(password_hash);
                active.updated_at = Set(now);
                active.update(self.db).await?;
            }
            None => {
                let txn = self.db.begin().await?;

                let created = user::ActiveModel {
                    name: Set(name),
                    email: Set(email.clone()),
                    password_hash: Set(password_hash),
                    is_verified: Set(false),
                    is_active: Set(true),
                    avatar: Set(None),
                    reset_code: Set(None),
                    reset_code_expires_at: Set(None),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;

                wallet::ActiveModel {
                    user_id: Set(created.id),
                    balance: Set(wallet::STARTER_BALANCE),
                    last_refill_at: Set(None),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;

                subscription::ActiveModel {
                    user_id: Set(created.id),
                    product_id: Set(plan::FREE_TIER.to_string()),
                    status: Set(SubscriptionStatus::Expired.as_str().to_string()),
                    expires_at: Set(now),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;

                let member = role::Entity::find()
                    .filter(role::Column::Name.eq(role::MEMBER))
                    .one(&txn)
                    .await?;
                match member {
                    Some(r) => {
                        user_role::ActiveModel {
                            user_id: Set(created.id),
                            role_id: Set(r.id),
                        }
                        .insert(&txn)
                        .await?;
                    }
                    None => tracing::warn!("member role missing, account created without roles"),
                }

                txn.commit().await?;
                tracing::info!(user_id = created.id, "account registered");
            }
        }

        self.issue_verification_code(&email).await
    }

    /// Verify an account with its emailed code and sign the user in.
    ///
    /// # Errors
    ///
    /// `InvalidOrExpiredCode` when no matching unexpired code exists.
    pub async fn verify_account(
        &self,
        email: &str,
        code: &str,
        client: &ClientInfo,
    ) -> ServiceResult<AuthResponse> {
        let email = normalize_email(email);
        let now = Utc::now().fixed_offset();

        let stored = verification_code::Entity::find()
            .filter(verification_code::Column::Email.eq(&email))
            .filter(verification_code::Column::Code.eq(code.trim()))
            .one(self.db)
            .await?
            .filter(|c| now <= c.expires_at)
            .ok_or(ServiceError::InvalidOrExpiredCode)?;

        let account = self
            .find_by_email(&email)
            .await?
            .ok_or(ServiceError::InvalidOrExpiredCode)?;

        let mut active: user::ActiveModel = account.into();
        active.is_verified = Set(true);
        active.updated_at = Set(now);
        let account = active.update(self.db).await?;

        tracing::info!(user_id = account.id, code_id = stored.id, "account verified");
        self.discard_verification_codes(&email).await;

        if !account.is_active {
            return Err(ServiceError::AccountInactive);
        }
        self.start_session(&account, client).await
    }

    /// Replace any outstanding verification code for `email` with a fresh one.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown email, `AlreadyVerified` if there is nothing to verify.
    pub async fn resend_verification_code(&self, email: &str) -> ServiceResult<()> {
        let email = normalize_email(email);
        let account = self
            .find_by_email(&email)
            .await?
            .ok_or_else(|| ServiceError::NotFound("user not found".to_string()))?;

        if account.is_verified {
            return Err(ServiceError::AlreadyVerified);
        }
        self.issue_verification_code(&email).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sessions
    // ─────────────────────────────────────────────────────────────────────────

    /// Authenticate with email and password and open a new session.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` for an unknown email or wrong password,
    /// `AccountNotVerified` or `AccountInactive` for accounts that may not sign in.
    pub async fn login(
        &self,
        email: &str,
        pass: &str,
        client: &ClientInfo,
    ) -> ServiceResult<AuthResponse> {
        let account = self
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        if !password::verify_password(pass, &account.password_hash)? {
            return Err(ServiceError::InvalidCredentials);
        }
        if !account.is_verified {
            return Err(ServiceError::AccountNotVerified);
        }
        if !account.is_active {
            return Err(ServiceError::AccountInactive);
        }

        self.start_session(&account, client).await
    }

    /// Mint a new access token for a live session. The refresh token is reused as-is.
    ///
    /// # Errors
    ///
    /// `Unauthorized` when the token is malformed or its session is unknown,
    /// revoked or expired. `AccountInactive` if the user was banned meanwhile.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> ServiceResult<String> {
        let claims = jwt::validate_refresh_token(refresh_token, &self.config.jwt_secret)
            .map_err(|_| ServiceError::Unauthorized("invalid refresh token".to_string()))?;

        let now = Utc::now().fixed_offset();
        let session = sessions::find_by_token(self.db, refresh_token)
            .await?
            .filter(|s| s.user_id == claims.user_id && s.is_usable(now))
            .ok_or_else(|| ServiceError::Unauthorized("session expired or revoked".to_string()))?;

        let account = user::Entity::find_by_id(session.user_id)
            .one(self.db)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("session expired or revoked".to_string()))?;
        if !account.is_active {
            return Err(ServiceError::AccountInactive);
        }

        let roles = self.role_names(account.id).await?;
        Ok(jwt::generate_access_token(account.id, &roles, self.config)?)
    }

    /// Revoke the session behind `refresh_token`. Unknown or already revoked tokens succeed.
    ///
    /// # Errors
    ///
    /// `Database` if the update fails.
    pub async fn logout(&self, refresh_token: &str) -> ServiceResult<()> {
        let revoked = sessions::revoke(self.db, refresh_token).await?;
        tracing::debug!(revoked, "logout");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Password reset
    // ─────────────────────────────────────────────────────────────────────────

    /// Store and mail a reset code. Unknown emails succeed silently.
    ///
    /// # Errors
    ///
    /// `Database` if the code cannot be stored.
    pub async fn forgot_password(&self, email: &str) -> ServiceResult<()> {
        let email = normalize_email(email);
        let Some(account) = self.find_by_email(&email).await? else {
            tracing::debug!("reset requested for unknown email");
            return Ok(());
        };

        let code = codes::generate_six_digit_code();
        let mut active: user::ActiveModel = account.into();
        active.reset_code = Set(Some(code.clone()));
        active.reset_code_expires_at = Set(Some(codes::code_expiry()));
        active.updated_at = Set(Utc::now().fixed_offset());
        active.update(self.db).await?;

        self.deliver(CodeMail::PasswordReset { to: email, code }).await;
        Ok(())
    }

    /// Check a reset code without consuming it.
    ///
    /// # Errors
    ///
    /// `InvalidOrExpiredCode` unless the code matches and has not expired.
    pub async fn verify_reset_code(&self, email: &str, code: &str) -> ServiceResult<()> {
        self.account_with_reset_code(email, code).await.map(|_| ())
    }

    /// Set a new password using a valid reset code, then clear the code.
    ///
    /// # Errors
    ///
    /// `Validation` for mismatched or weak passwords, `InvalidOrExpiredCode` for a bad code.
    pub async fn reset_password(&self, req: ResetPasswordRequest) -> ServiceResult<()> {
        password::validate_confirmation(&req.new_password, &req.confirm_password)
            .map_err(ServiceError::Validation)?;
        password::validate_password(&req.new_password).map_err(ServiceError::Validation)?;

        let account = self.account_with_reset_code(&req.email, &req.code).await?;
        let user_id = account.id;

        let mut active: user::ActiveModel = account.into();
        active.password_hash = Set(password::hash_password(&req.new_password)?);
        active.reset_code = Set(None);
        active.reset_code_expires_at = Set(None);
        active.updated_at = Set(Utc::now().fixed_offset());
        active.update(self.db).await?;

        tracing::info!(user_id, "password reset");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Profile
    // ─────────────────────────────────────────────────────────────────────────

    /// # Errors
    ///
    /// `NotFound` if the user id does not resolve.
    pub async fn current_user(&self, user_id: i32) -> ServiceResult<UserResponse> {
        let account = self.find_by_id(user_id).await?;
        Ok(self.user_view(&account).await?)
    }

    /// Set or clear (`None`) the stored avatar path.
    ///
    /// # Errors
    ///
    /// `NotFound` if the user id does not resolve.
    pub async fn update_avatar(
        &self,
        user_id: i32,
        avatar: Option<String>,
    ) -> ServiceResult<UserResponse> {
        let mut active: user::ActiveModel = self.find_by_id(user_id).await?.into();
        active.avatar = Set(avatar);
        active.updated_at = Set(Utc::now().fixed_offset());
        let account = active.update(self.db).await?;
        Ok(self.user_view(&account).await?)
    }

    /// Currently stored avatar path for `user_id`.
    ///
    /// # Errors
    ///
    /// `NotFound` if the user id does not resolve.
    pub async fn avatar_of(&self, user_id: i32) -> ServiceResult<Option<String>> {
        Ok(self.find_by_id(user_id).await?.avatar)
    }

    /// # Errors
    ///
    /// `Validation` for a blank or overlong name, `NotFound` if the user id does not resolve.
    pub async fn update_name(&self, user_id: i32, name: &str) -> ServiceResult<UserResponse> {
        let name = name.trim();
        password::validate_name(name).map_err(ServiceError::Validation)?;

        let mut active: user::ActiveModel = self.find_by_id(user_id).await?.into();
        active.name = Set(name.to_string());
        active.updated_at = Set(Utc::now().fixed_offset());
        let account = active.update(self.db).await?;
        Ok(self.user_view(&account).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────

    async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, sea_orm::DbErr> {
        user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db)
            .await
    }

    async fn find_by_id(&self, user_id: i32) -> ServiceResult<user::Model> {
        user::Entity::find_by_id(user_id)
            .one(self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("user not found".to_string()))
    }

    async fn account_with_reset_code(&self, email: &str, code: &str) -> ServiceResult<user::Model> {
        let now = Utc::now().fixed_offset();
        self.find_by_email(&normalize_email(email))
            .await?
            .filter(|u| u.reset_code_is_valid(code.trim(), now))
            .ok_or(ServiceError::InvalidOrExpiredCode)
    }

    /// Names of every role the user holds.
    async fn role_names(&self, user_id: i32) -> Result<Vec<String>, sea_orm::DbErr> {
        role::Entity::find()
            .inner_join(user_role::Entity)
            .filter(user_role::Column::UserId.eq(user_id))
            .select_only()
            .column(role::Column::Name)
            .into_tuple::<String>()
            .all(self.db)
            .await
    }

    /// The shared current-user view: profile, entitlements and roles.
    async fn user_view(&self, account: &user::Model) -> Result<UserResponse, sea_orm::DbErr> {
        let sub = entitlements::subscription_for(self.db, account.id).await?;
        let resolved = entitlements::resolve(self.db, sub.as_ref()).await?;
        let roles = self.role_names(account.id).await?;
        Ok(UserResponse::new(account, resolved, roles))
    }

    /// Issue a token pair, record its session and build the login response.
    async fn start_session(
        &self,
        account: &user::Model,
        client: &ClientInfo,
    ) -> ServiceResult<AuthResponse> {
        let roles = self.role_names(account.id).await?;
        let pair = jwt::generate_token_pair(account.id, &roles, self.config)?;

        sessions::create(
            self.db,
            account.id,
            &pair.refresh_token,
            pair.refresh_expires_at,
            client,
        )
        .await?;
        tracing::info!(user_id = account.id, ip = ?client.ip_address, "session started");

        Ok(AuthResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            user: self.user_view(account).await?,
        })
    }

    /// Store a fresh code for `email`, replacing any earlier one, and mail it.
    ///
    /// A single upsert on the unique email index, so concurrent issuers leave one row.
    async fn issue_verification_code(&self, email: &str) -> ServiceResult<()> {
        let code = codes::generate_six_digit_code();
        let row = verification_code::ActiveModel {
            email: Set(email.to_string()),
            code: Set(code.clone()),
            expires_at: Set(codes::code_expiry()),
            created_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        };
        verification_code::Entity::insert(row)
            .on_conflict(
                OnConflict::column(verification_code::Column::Email)
                    .update_columns([
                        verification_code::Column::Code,
                        verification_code::Column::ExpiresAt,
                        verification_code::Column::CreatedAt,
                    ])
                    .to_owned(),
            )
            .exec(self.db)
            .await?;

        self.deliver(CodeMail::Verification {
            to: email.to_string(),
            code,
        })
        .await;
        Ok(())
    }

    /// Remove consumed verification codes. Failure is logged and never propagated.
    async fn discard_verification_codes(&self, email: &str) {
        if let Err(e) = verification_code::Entity::delete_many()
            .filter(verification_code::Column::Email.eq(email))
            .exec(self.db)
            .await
        {
            tracing::warn!(error = %e, "failed to delete consumed verification codes");
        }
    }

    /// Send a code mail. Delivery failures are logged; the code stays valid for a resend.
    async fn deliver(&self, mail: CodeMail) {
        if let Err(e) = self.mailer.send(&mail).await {
            tracing::warn!(error = %e, to = mail.recipient(), "failed to send code mail");
        }
    }
}
