use sqlx::PgPool;
use uuid::Uuid;

use super::{dto::LogSetRequest, repo};
use crate::{
    error::{AppError, AppResult},
    workout_plans::{repo_types::ExerciseSetRow, services::set_volume},
};

/// Applies logged values over the stored ones and recomputes volume.
pub fn merge_performance(current: &ExerciseSetRow, log: &LogSetRequest) -> (Option<i32>, Option<f64>, f64) {
    let actual_reps = log.actual_reps.or(current.actual_reps);
    let weight = log.weight.or(current.weight);
    (actual_reps, weight, set_volume(actual_reps, weight))
}

/// Records performance for several sets of one exercise atomically.
pub async fn log_sets(
    db: &PgPool,
    exercise_id: Uuid,
    entries: &[(Uuid, LogSetRequest)],
) -> AppResult<Vec<ExerciseSetRow>> {
    let mut tx = db.begin().await?;
    let mut updated = Vec::with_capacity(entries.len());
    for (set_id, log) in entries {
        let current = repo::lock_set_tx(&mut tx, exercise_id, *set_id)
            .await?
            .ok_or_else(|| AppError::not_found("Set"))?;
        let (actual_reps, weight, volume) = merge_performance(&current, log);
        let row = repo::write_performance_tx(&mut tx, current.id, actual_reps, weight, volume).await?;
        updated.push(row);
    }
    tx.commit().await?;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(actual: Option<i32>, weight: Option<f64>) -> ExerciseSetRow {
        ExerciseSetRow {
            id: Uuid::new_v4(),
            exercise_id: Uuid::new_v4(),
            set_number: 1,
            target_reps: 10,
            actual_reps: actual,
            weight,
            volume: set_volume(actual, weight),
        }
    }

    #[test]
    fn logging_reps_uses_stored_weight() {
        let current = stored(None, Some(40.0));
        let (reps, weight, volume) = merge_performance(
            &current,
            &LogSetRequest { actual_reps: Some(9), weight: None },
        );
        assert_eq!(reps, Some(9));
        assert_eq!(weight, Some(40.0));
        assert_eq!(volume, 360.0);
    }

    #[test]
    fn logging_overrides_both_values() {
        let current = stored(Some(10), Some(40.0));
        let (_, _, volume) = merge_performance(
            &current,
            &LogSetRequest { actual_reps: Some(6), weight: Some(50.0) },
        );
        assert_eq!(volume, 300.0);
    }

    #[test]
    fn partial_log_without_weight_has_zero_volume() {
        let current = stored(None, None);
        let (_, _, volume) = merge_performance(
            &current,
            &LogSetRequest { actual_reps: Some(12), weight: None },
        );
        assert_eq!(volume, 0.0);
    }
}
