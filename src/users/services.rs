use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    auth::repo_types::{Role, User},
    error::{AppError, AppResult},
};

/// Loads `id` and checks it is a CLIENT account that plans can be assigned to.
pub async fn require_client(db: &PgPool, id: Uuid) -> AppResult<User> {
    let user = User::find_by_id(db, id)
        .await?
        .ok_or_else(|| AppError::not_found("Client"))?;
    if user.role != Role::Client {
        return Err(AppError::BadRequest(
            "Plans can only be assigned to client accounts".into(),
        ));
    }
    Ok(user)
}
