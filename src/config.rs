use std::path::PathBuf;

pub const API_BASE: &str = "https://covidapi.info/api/v1/";

/// First day requested from the timeseries endpoint.
pub const START_DATE: &str = "2020-01-01";

pub const GLOBAL_SHEET: &str = "GLOBAL";
pub const LOGS_SHEET: &str = "LOGS";

/// Distinct endpoints memoized per client.
pub const CACHE_CAPACITY: usize = 32;

pub const WORKBOOK_NAME: &str = "COVID2020";

// Environment overrides read by `CovidSheetsBuilder::from_env`.
pub const ENV_BASE_URL: &str = "COVID_SHEETS_BASE_URL";
pub const ENV_WORKBOOK: &str = "COVID_SHEETS_WORKBOOK";
pub const ENV_START_DATE: &str = "COVID_SHEETS_START_DATE";
pub const ENV_VARIANT: &str = "COVID_SHEETS_VARIANT";
pub const ENV_TIMEOUT_SECS: &str = "COVID_SHEETS_TIMEOUT_SECS";

pub fn timeseries_endpoint(start: &str, end: &str) -> String {
    format!("global/timeseries/{}/{}", start, end)
}

pub fn global_count_endpoint() -> &'static str {
    "global/count"
}

/// Today's local date as `YYYY-MM-DD`.
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

pub fn default_workbook_path() -> PathBuf {
    let file = format!("{}.duckdb", WORKBOOK_NAME);
    if let Some(data) = dirs::data_dir() {
        data.join("covid-sheets").join(file)
    } else {
        PathBuf::from(".covid-sheets").join(file)
    }
}
