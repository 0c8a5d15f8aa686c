use sqlx::PgPool;
use tracing::info;

use super::{dto::HomeContentRequest, repo, repo_types::HomeContentRow};
use crate::error::{AppError, AppResult};

/// Title used when inserting the first row; blank titles count as missing.
pub fn required_hero_title(req: &HomeContentRequest) -> AppResult<&str> {
    req.hero_title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("heroTitle is required".into()))
}

/// Updates the current row in place, or inserts the first one.
/// Returns the row and whether it was newly created.
pub async fn upsert(db: &PgPool, req: &HomeContentRequest) -> AppResult<(HomeContentRow, bool)> {
    let mut tx = db.begin().await?;
    let result = match repo::latest_id_for_update_tx(&mut tx).await? {
        Some(id) => {
            let row = repo::update(&mut *tx, id, req)
                .await?
                .ok_or_else(|| AppError::not_found("Home content"))?;
            (row, false)
        }
        None => {
            let title = required_hero_title(req)?;
            (repo::insert_tx(&mut tx, title, req).await?, true)
        }
    };
    tx.commit().await?;

    info!(home_content_id = %result.0.id, created = result.1, "home content saved");
    Ok(result)
}
