use std::collections::HashMap;

use axum::{extract::State, routing::get, Json, Router};
use time::PrimitiveDateTime;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::core::time::{format_primitive, primitive_now_utc};
use crate::repositories;
use crate::repositories::essays::ScoredEssay;
use crate::schemas::progress::{MonthlyAverage, ProgressOverview, ProgressResponse};

const MONTHS_WINDOW: usize = 6;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", get(get_progress))
}

async fn get_progress(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ProgressResponse>, ApiError> {
    let total = repositories::essays::count_by_author(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count essays"))?;

    let history = repositories::essays::scored_history(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load score history"))?;

    let now = primitive_now_utc();
    Ok(Json(ProgressResponse {
        overview: overview(total, &history),
        monthly: monthly_averages(&history, now, MONTHS_WINDOW),
    }))
}

fn overview(total_essays: i64, history: &[ScoredEssay]) -> ProgressOverview {
    let scores: Vec<i32> = history.iter().map(|essay| essay.score).collect();
    let average = if scores.is_empty() {
        None
    } else {
        Some(round1(scores.iter().map(|&s| s as f64).sum::<f64>() / scores.len() as f64))
    };

    // History is ordered oldest first, so the latest entry closes the series.
    let latest = history.last();

    ProgressOverview {
        total_essays,
        scored_essays: history.len() as i64,
        average_score: average,
        best_score: scores.iter().max().copied(),
        worst_score: scores.iter().min().copied(),
        latest_score: latest.map(|essay| essay.score),
        latest_at: latest.map(|essay| format_primitive(essay.created_at)),
    }
}

/// Average score per month over the trailing `window` months, empty months
/// included so the chart axis stays continuous.
fn monthly_averages(
    history: &[ScoredEssay],
    now: PrimitiveDateTime,
    window: usize,
) -> Vec<MonthlyAverage> {
    let mut buckets: HashMap<String, (f64, i64)> = HashMap::new();
    for essay in history {
        let entry = buckets.entry(month_key(essay.created_at)).or_insert((0.0, 0));
        entry.0 += essay.score as f64;
        entry.1 += 1;
    }

    months_window(now, window)
        .into_iter()
        .map(|month| {
            let (sum, count) = buckets.get(&month).copied().unwrap_or((0.0, 0));
            MonthlyAverage {
                month,
                average_score: (count > 0).then(|| round1(sum / count as f64)),
                essays: count,
            }
        })
        .collect()
}

fn month_key(value: PrimitiveDateTime) -> String {
    format!("{:04}-{:02}", value.year(), u8::from(value.month()))
}

fn months_window(now: PrimitiveDateTime, window: usize) -> Vec<String> {
    let mut year = now.year();
    let mut month = u8::from(now.month()) as i32;

    let mut keys = Vec::with_capacity(window);
    for _ in 0..window {
        keys.push(format!("{year:04}-{month:02}"));
        month -= 1;
        if month == 0 {
            month = 12;
            year -= 1;
        }
    }

    keys.reverse();
    keys
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn scored(score: i32, created_at: PrimitiveDateTime) -> ScoredEssay {
        ScoredEssay { score, created_at }
    }

    #[test]
    fn overview_summarizes_the_score_series() {
        let history = vec![
            scored(600, datetime!(2025-05-10 09:00)),
            scored(920, datetime!(2025-06-02 18:30)),
            scored(760, datetime!(2025-07-21 12:00)),
        ];

        let summary = overview(5, &history);

        assert_eq!(summary.total_essays, 5);
        assert_eq!(summary.scored_essays, 3);
        assert_eq!(summary.average_score, Some(760.0));
        assert_eq!(summary.best_score, Some(920));
        assert_eq!(summary.worst_score, Some(600));
        assert_eq!(summary.latest_score, Some(760));
        assert_eq!(summary.latest_at.as_deref(), Some("2025-07-21T12:00:00Z"));
    }

    #[test]
    fn overview_of_an_empty_history() {
        let summary = overview(2, &[]);
        assert_eq!(summary.scored_essays, 0);
        assert_eq!(summary.average_score, None);
        assert_eq!(summary.best_score, None);
        assert_eq!(summary.latest_score, None);
    }

    #[test]
    fn monthly_averages_fill_empty_months() {
        let history = vec![
            scored(700, datetime!(2025-03-05 10:00)),
            scored(800, datetime!(2025-03-25 10:00)),
            scored(500, datetime!(2025-06-01 08:00)),
        ];

        let monthly = monthly_averages(&history, datetime!(2025-06-15 00:00), 6);

        assert_eq!(monthly.len(), 6);
        assert_eq!(monthly[0].month, "2025-01");
        assert_eq!(monthly[5].month, "2025-06");

        let march = monthly.iter().find(|m| m.month == "2025-03").expect("march bucket");
        assert_eq!(march.average_score, Some(750.0));
        assert_eq!(march.essays, 2);

        let april = monthly.iter().find(|m| m.month == "2025-04").expect("april bucket");
        assert_eq!(april.average_score, None);
        assert_eq!(april.essays, 0);
    }

    #[test]
    fn months_window_crosses_year_boundaries() {
        let window = months_window(datetime!(2025-02-10 00:00), 4);
        assert_eq!(window, vec!["2024-11", "2024-12", "2025-01", "2025-02"]);
    }

    #[test]
    fn scores_outside_the_window_are_ignored() {
        let history = vec![scored(900, datetime!(2023-01-01 00:00))];
        let monthly = monthly_averages(&history, datetime!(2025-06-15 00:00), 6);
        assert!(monthly.iter().all(|m| m.essays == 0));
    }
}
