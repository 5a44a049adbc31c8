use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CaseCounts — Cumulative counts reported for one day or one country
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CaseCounts {
    pub confirmed: i64,
    pub deaths: i64,
    pub recovered: i64,
}

impl CaseCounts {
    pub fn new(confirmed: i64, deaths: i64, recovered: i64) -> Self {
        Self {
            confirmed,
            deaths,
            recovered,
        }
    }
}

// ---------------------------------------------------------------------------
// DailyRecord — One day of a country's timeseries
// ---------------------------------------------------------------------------

/// A single day of cumulative counts.
///
/// Any extra fields the API sends alongside the counts are dropped on
/// deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub counts: CaseCounts,
}

impl DailyRecord {
    pub fn new(date: NaiveDate, confirmed: i64, deaths: i64, recovered: i64) -> Self {
        Self {
            date,
            counts: CaseCounts::new(confirmed, deaths, recovered),
        }
    }
}

/// A country's records, date ascending as returned by the API.
pub type CountrySeries = Vec<DailyRecord>;

// ---------------------------------------------------------------------------
// TimeSeries — Response of `global/timeseries/{start}/{end}`
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeries {
    #[serde(default)]
    pub count: i64,
    /// Country name to series, in the order the API listed them.
    pub result: IndexMap<String, CountrySeries>,
}

// ---------------------------------------------------------------------------
// GlobalCount — Response of `global/count`
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalCount {
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub date: Option<String>,
    pub result: IndexMap<String, CaseCounts>,
}

impl GlobalCount {
    /// Flatten the snapshot into one row per country, in source order.
    pub fn rows(&self) -> Vec<GlobalRow> {
        self.result
            .iter()
            .map(|(country, counts)| GlobalRow {
                country: country.clone(),
                counts: *counts,
            })
            .collect()
    }
}

/// One country's current counts from the global snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalRow {
    pub country: String,
    #[serde(flatten)]
    pub counts: CaseCounts,
}
