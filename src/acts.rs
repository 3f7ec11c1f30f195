// src/acts.rs
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::Act;

pub const NAVIGATOR_ROLE: &str = "navigator";

pub async fn get_act(pool: &PgPool, act_id: Uuid) -> Result<Act, ApiError> {
    sqlx::query_as::<_, Act>("SELECT id, owner_id, title, is_live FROM acts WHERE id = $1")
        .bind(act_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Act {act_id} not found")))
}

pub async fn participant_role(
    pool: &PgPool,
    act_id: Uuid,
    user_id: Uuid,
) -> Result<Option<String>, ApiError> {
    let role = sqlx::query_scalar::<_, String>(
        "SELECT role FROM act_participants WHERE act_id = $1 AND user_id = $2",
    )
    .bind(act_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(role)
}

/// Whether the user may create or close polls on the act: the act's owner, or
/// a participant holding the navigator role.
pub async fn can_run_polls(pool: &PgPool, act: &Act, user_id: Uuid) -> Result<bool, ApiError> {
    if act.owner_id == user_id {
        return Ok(true);
    }

    let role = participant_role(pool, act.id, user_id).await?;
    Ok(is_navigator(role.as_deref()))
}

fn is_navigator(role: Option<&str>) -> bool {
    role == Some(NAVIGATOR_ROLE)
}

#[cfg(test)]
mod tests {
    use super::is_navigator;

    #[test]
    fn only_the_navigator_role_counts() {
        assert!(is_navigator(Some("navigator")));
        assert!(!is_navigator(Some("hero")));
        assert!(!is_navigator(None));
    }
}
