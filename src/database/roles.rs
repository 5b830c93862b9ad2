use sqlx::PgPool;

use crate::database::manager::DatabaseError;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MODERATOR: &str = "moderator";

/// Site-wide role of a user from `user_roles`, if any.
pub async fn user_role(pool: &PgPool, user_id: &str) -> Result<Option<String>, DatabaseError> {
    let role = sqlx::query_scalar::<_, String>("SELECT role FROM user_roles WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(role)
}

/// True for admins and moderators.
pub async fn is_staff(pool: &PgPool, user_id: &str) -> Result<bool, DatabaseError> {
    Ok(matches!(
        user_role(pool, user_id).await?.as_deref(),
        Some(ROLE_ADMIN) | Some(ROLE_MODERATOR)
    ))
}
