use serde::Serialize;

#[derive(Debug, Serialize)]
pub(crate) struct ProgressOverview {
    pub(crate) total_essays: i64,
    pub(crate) scored_essays: i64,
    pub(crate) average_score: Option<f64>,
    pub(crate) best_score: Option<i32>,
    pub(crate) worst_score: Option<i32>,
    pub(crate) latest_score: Option<i32>,
    pub(crate) latest_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct MonthlyAverage {
    /// Bucket key, `YYYY-MM`.
    pub(crate) month: String,
    pub(crate) average_score: Option<f64>,
    pub(crate) essays: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProgressResponse {
    pub(crate) overview: ProgressOverview,
    pub(crate) monthly: Vec<MonthlyAverage>,
}
