use sqlx::PgPool;
use tracing::info;

use super::{dto::ContactInfoRequest, repo, repo_types::ContactInfoRow};
use crate::error::{AppError, AppResult};

/// Updates the current row in place, or inserts the first one.
/// Returns the row and whether it was newly created.
pub async fn upsert(db: &PgPool, req: &ContactInfoRequest) -> AppResult<(ContactInfoRow, bool)> {
    let mut tx = db.begin().await?;
    let result = match repo::latest_id_for_update_tx(&mut tx).await? {
        Some(id) => {
            let row = repo::update(&mut *tx, id, req)
                .await?
                .ok_or_else(|| AppError::not_found("Contact info"))?;
            (row, false)
        }
        None => (repo::insert_tx(&mut tx, req).await?, true),
    };
    tx.commit().await?;

    info!(contact_id = %result.0.id, created = result.1, "contact info saved");
    Ok(result)
}
