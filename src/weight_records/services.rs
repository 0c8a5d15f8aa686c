use super::{
    dto::{ChartPoint, WeightChart, WeightStats},
    repo_types::WeightRecordRow,
};

/// Builds the progress chart; input order does not matter.
pub fn build_chart(mut rows: Vec<WeightRecordRow>) -> WeightChart {
    rows.sort_by_key(|r| r.recorded_at);

    let points: Vec<ChartPoint> = rows
        .iter()
        .map(|r| ChartPoint {
            id: r.id,
            weight: r.weight,
            recorded_at: r.recorded_at,
        })
        .collect();

    let stats = match (points.first(), points.last()) {
        (Some(first), Some(last)) => WeightStats {
            count: points.len() as i64,
            start_weight: Some(first.weight),
            current_weight: Some(last.weight),
            change: Some(round2(last.weight - first.weight)),
            min_weight: points.iter().map(|p| p.weight).reduce(f64::min),
            max_weight: points.iter().map(|p| p.weight).reduce(f64::max),
        },
        _ => WeightStats::default(),
    };

    WeightChart { points, stats }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Duration, OffsetDateTime};
    use uuid::Uuid;

    fn row(days_ago: i64, weight: f64) -> WeightRecordRow {
        let now = OffsetDateTime::now_utc();
        WeightRecordRow {
            id: Uuid::new_v4(),
            client_id: Uuid::nil(),
            weight,
            recorded_at: now - Duration::days(days_ago),
            notes: None,
            created_at: now,
        }
    }

    #[test]
    fn empty_chart_has_null_stats() {
        let chart = build_chart(vec![]);
        assert!(chart.points.is_empty());
        assert_eq!(chart.stats, WeightStats::default());

        let json = serde_json::to_value(&chart.stats).unwrap();
        assert!(json["startWeight"].is_null());
        assert!(json["change"].is_null());
    }

    #[test]
    fn points_ascend_and_stats_follow() {
        // newest first, as the repository returns them
        let chart = build_chart(vec![row(0, 70.2), row(7, 71.0), row(14, 72.5), row(21, 72.0)]);

        let weights: Vec<f64> = chart.points.iter().map(|p| p.weight).collect();
        assert_eq!(weights, vec![72.0, 72.5, 71.0, 70.2]);

        let s = chart.stats;
        assert_eq!(s.count, 4);
        assert_eq!(s.start_weight, Some(72.0));
        assert_eq!(s.current_weight, Some(70.2));
        assert_eq!(s.change, Some(-1.8));
        assert_eq!(s.min_weight, Some(70.2));
        assert_eq!(s.max_weight, Some(72.5));
    }

    #[test]
    fn single_point_has_zero_change() {
        let chart = build_chart(vec![row(3, 80.0)]);
        assert_eq!(chart.stats.count, 1);
        assert_eq!(chart.stats.change, Some(0.0));
    }
}
