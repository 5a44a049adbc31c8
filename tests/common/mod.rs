//! Shared test fixtures for the covid-sheets integration tests.
//!
//! Provides canned API payloads, an in-process [`Transport`] that serves
//! them, a [`DataSource`] stub, and sinks that record or fail writes.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use chrono::NaiveDate;
use covid_sheets::client::Response;
use covid_sheets::models::{DailyRecord, GlobalCount, TimeSeries};
use covid_sheets::{CovidError, DataSource, Result, SheetSink, Table, Transport};

pub const BASE: &str = "https://api.test/v1/";
pub const START: &str = "2020-01-01";
pub const END: &str = "2020-01-02";

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// The two-day "Testland" series with known derived values.
pub fn testland() -> Vec<DailyRecord> {
    vec![
        DailyRecord::new(date("2020-01-01"), 10, 1, 2),
        DailyRecord::new(date("2020-01-02"), 20, 3, 5),
    ]
}

/// Timeseries payload. Countries are deliberately not in alphabetical order,
/// and records carry an extra field the pipeline does not use.
pub const TIMESERIES_BODY: &str = r#"{
    "count": 2,
    "result": {
        "Zeroland": [
            {"date": "2020-01-01", "confirmed": 0, "deaths": 0, "recovered": 0, "source": "x"},
            {"date": "2020-01-02", "confirmed": 4, "deaths": 1, "recovered": 1, "source": "x"}
        ],
        "Testland": [
            {"date": "2020-01-01", "confirmed": 10, "deaths": 1, "recovered": 2},
            {"date": "2020-01-02", "confirmed": 20, "deaths": 3, "recovered": 5}
        ]
    }
}"#;

pub const GLOBAL_BODY: &str = r#"{
    "count": 2,
    "date": "2020-01-02",
    "result": {
        "Zeroland": {"confirmed": 4, "deaths": 1, "recovered": 1},
        "Testland": {"confirmed": 20, "deaths": 3, "recovered": 5}
    }
}"#;

/// Several countries in reverse alphabetical order.
pub const UNSORTED_BODY: &str = r#"{
    "count": 3,
    "result": {
        "Zimbabwe": [{"date": "2020-01-01", "confirmed": 1, "deaths": 0, "recovered": 0}],
        "Mexico": [{"date": "2020-01-01", "confirmed": 2, "deaths": 0, "recovered": 1}],
        "Afghanistan": [{"date": "2020-01-01", "confirmed": 3, "deaths": 1, "recovered": 0}]
    }
}"#;

pub fn timeseries() -> TimeSeries {
    serde_json::from_str(TIMESERIES_BODY).unwrap()
}

pub fn global() -> GlobalCount {
    serde_json::from_str(GLOBAL_BODY).unwrap()
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ---------------------------------------------------------------------------
// FakeTransport
// ---------------------------------------------------------------------------

/// Serves canned responses by URL; unknown URLs answer 404.
#[derive(Default)]
pub struct FakeTransport {
    responses: HashMap<String, Response>,
    pub requests: RefCell<Vec<String>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, status: u16, body: &str) -> Self {
        self.responses.insert(
            url.to_string(),
            Response {
                status,
                body: body.to_string(),
            },
        );
        self
    }

    /// Transport answering both endpoints of the fixture payloads.
    pub fn serving_fixtures() -> Self {
        Self::new()
            .with(
                &format!("{}global/timeseries/{}/{}", BASE, START, END),
                200,
                TIMESERIES_BODY,
            )
            .with(&format!("{}global/count", BASE), 200, GLOBAL_BODY)
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests.borrow().iter().filter(|u| *u == url).count()
    }
}

impl Transport for FakeTransport {
    fn get(&self, url: &str) -> Result<Response> {
        self.requests.borrow_mut().push(url.to_string());
        Ok(self.responses.get(url).cloned().unwrap_or(Response {
            status: 404,
            body: String::new(),
        }))
    }
}

// ---------------------------------------------------------------------------
// StubSource
// ---------------------------------------------------------------------------

/// A [`DataSource`] returning fixed payloads.
pub struct StubSource {
    pub timeseries: Option<TimeSeries>,
    pub global: Option<GlobalCount>,
    pub calls: Vec<String>,
}

impl StubSource {
    pub fn fixtures() -> Self {
        Self {
            timeseries: Some(timeseries()),
            global: Some(global()),
            calls: Vec::new(),
        }
    }
}

impl DataSource for StubSource {
    fn fetch_time_series(&mut self, start: &str, end: &str) -> Result<Option<TimeSeries>> {
        self.calls.push(format!("timeseries {} {}", start, end));
        Ok(self.timeseries.clone())
    }

    fn fetch_global_count(&mut self) -> Result<Option<GlobalCount>> {
        self.calls.push("global".to_string());
        Ok(self.global.clone())
    }
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Records every write in order.
#[derive(Default)]
pub struct RecordingSink {
    pub writes: Vec<(String, Table)>,
}

impl RecordingSink {
    pub fn names(&self) -> Vec<&str> {
        self.writes.iter().map(|(n, _)| n.as_str()).collect()
    }
}

impl SheetSink for RecordingSink {
    fn write_sheet(&mut self, name: &str, table: &Table) -> Result<()> {
        self.writes.push((name.to_string(), table.clone()));
        Ok(())
    }
}

/// Accepts `ok_writes` writes, then fails every one after.
pub struct FailingSink {
    pub ok_writes: usize,
    pub attempts: usize,
}

impl SheetSink for FailingSink {
    fn write_sheet(&mut self, name: &str, _table: &Table) -> Result<()> {
        self.attempts += 1;
        if self.attempts > self.ok_writes {
            return Err(CovidError::InvalidArgument(format!("refusing to write {}", name)));
        }
        Ok(())
    }
}
