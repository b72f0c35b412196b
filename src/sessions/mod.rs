//! Server-side ledger of issued refresh tokens.
//!
//! One row per refresh token. A row is usable only while it is valid and unexpired;
//! logout flips the validity flag, nothing ever rotates or extends a row.

use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};

use crate::auth::ClientInfo;
use crate::entities::session;

/// Persist a new session for a freshly issued refresh token.
///
/// # Errors
///
/// Returns the database error if the insert fails.
pub async fn create<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    token: &str,
    expires_at: DateTime<Utc>,
    client: &ClientInfo,
) -> Result<session::Model, DbErr> {
    let now = Utc::now().fixed_offset();
    session::ActiveModel {
        user_id: Set(user_id),
        token: Set(token.to_string()),
        expires_at: Set(expires_at.fixed_offset()),
        ip_address: Set(client.ip_address.clone()),
        user_agent: Set(client.user_agent.clone()),
        is_valid: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Look a session up by its exact refresh token.
///
/// # Errors
///
/// Returns the database error if the query fails.
pub async fn find_by_token<C: ConnectionTrait>(
    db: &C,
    token: &str,
) -> Result<Option<session::Model>, DbErr> {
    session::Entity::find()
        .filter(session::Column::Token.eq(token))
        .one(db)
        .await
}

/// Mark the session holding `token` invalid. Unknown tokens are a no-op.
///
/// Returns the number of rows touched.
///
/// # Errors
///
/// Returns the database error if the update fails.
pub async fn revoke<C: ConnectionTrait>(db: &C, token: &str) -> Result<u64, DbErr> {
    let result = session::Entity::update_many()
        .col_expr(session::Column::IsValid, Expr::value(false))
        .col_expr(
            session::Column::UpdatedAt,
            Expr::value(Utc::now().fixed_offset()),
        )
        .filter(session::Column::Token.eq(token))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
