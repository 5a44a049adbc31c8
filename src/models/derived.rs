use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DerivedRow — Raw counts plus the statistics computed from them
// ---------------------------------------------------------------------------

/// A row of the statistics pipeline's output.
///
/// `label` is the date for a country series and the country name for the
/// global snapshot. Rates are percentages; they may be NaN or infinite when
/// `confirmed` is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DerivedRow {
    pub label: String,
    pub confirmed: i64,
    pub deaths: i64,
    pub recovered: i64,
    pub active_cases: i64,
    pub mortality_rate: f64,
    pub recovery_rate: f64,
    pub active_cases_rate: f64,
    pub change_in_mortality: Option<f64>,
    pub change_in_recovery: Option<f64>,
    pub change_in_active_cases: Option<f64>,
    /// Day-over-day change in `confirmed`. Only set in the extended variant.
    pub confirmed_rate: Option<i64>,
    /// Day-over-day change in `confirmed_rate`. Only set in the extended variant.
    pub change_confirmed_rate: Option<i64>,
}

// ---------------------------------------------------------------------------
// RunLog — The single row written to the LOGS sheet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunLog {
    pub run_at: String,
    pub countries: i64,
    pub elapsed_seconds: f64,
}
