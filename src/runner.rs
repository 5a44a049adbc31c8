//! Drives one batch run from fetch to published sheets.
//!
//! Stages run strictly in order and the first error ends the run:
//! fetch the timeseries, derive and publish each country, fetch the global
//! snapshot, derive and publish `GLOBAL`, then (extended variant) publish
//! `LOGS`. Nothing is retried.

use std::fmt;
use std::time::{Duration, Instant};

use crate::client::DataSource;
use crate::config;
use crate::error::{CovidError, Result};
use crate::models::RunLog;
use crate::stats::{self, Variant};
use crate::workbook::SheetSink;

/// Stage of a run, used to tag log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    FetchTimeseries,
    PublishCountry,
    FetchGlobal,
    PublishGlobal,
    PublishLogs,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::FetchTimeseries => "fetch_timeseries",
            Stage::PublishCountry => "publish_country",
            Stage::FetchGlobal => "fetch_global",
            Stage::PublishGlobal => "publish_global",
            Stage::PublishLogs => "publish_logs",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Countries published, in processing order.
    pub countries: Vec<String>,
    /// `count` as reported by the timeseries payload.
    pub reported_count: i64,
    pub global_rows: usize,
    /// Every sheet written, in write order.
    pub sheets: Vec<String>,
    pub elapsed: Duration,
}

/// Sequential fetch, derive and publish over a source and a sink.
pub struct Runner<S: DataSource, W: SheetSink> {
    source: S,
    sink: W,
    variant: Variant,
    start_date: String,
    end_date: Option<String>,
}

impl<S: DataSource, W: SheetSink> Runner<S, W> {
    pub fn new(source: S, sink: W, variant: Variant) -> Self {
        Self {
            source,
            sink,
            variant,
            start_date: config::START_DATE.to_string(),
            end_date: None,
        }
    }

    /// Override the first requested day.
    pub fn start_date(mut self, start_date: &str) -> Self {
        self.start_date = start_date.to_string();
        self
    }

    /// Pin the last requested day instead of using today's date.
    pub fn end_date(mut self, end_date: &str) -> Self {
        self.end_date = Some(end_date.to_string());
        self
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    /// Give back the source and the sink.
    pub fn into_parts(self) -> (S, W) {
        (self.source, self.sink)
    }

    /// Run every stage once.
    pub fn run(&mut self) -> Result<RunReport> {
        let started = Instant::now();
        let mut sheets = Vec::new();

        let end_date = self.end_date.clone().unwrap_or_else(config::today);
        tracing::info!(stage = %Stage::FetchTimeseries, start = %self.start_date, end = %end_date);
        let series = self
            .source
            .fetch_time_series(&self.start_date, &end_date)?
            .ok_or_else(|| {
                CovidError::FetchFailed(config::timeseries_endpoint(&self.start_date, &end_date))
            })?;

        let total = series.result.len();
        println!("Received data for {} countries", series.count);
        if series.count != total as i64 {
            tracing::warn!(
                reported = series.count,
                received = total,
                "timeseries count does not match number of countries"
            );
        }

        let mut countries = Vec::with_capacity(total);
        for (i, (country, records)) in series.result.iter().enumerate() {
            if self.variant.is_extended() {
                print!("[{}/{}] ", i + 1, total);
            }
            println!("Country Name: {}, Total Data: {}", country, records.len());

            let table = stats::statistics_table(records, self.variant);
            tracing::debug!(stage = %Stage::PublishCountry, country = %country, rows = table.len());
            self.sink.write_sheet(country, &table)?;
            countries.push(country.clone());
            sheets.push(country.clone());
        }

        tracing::info!(stage = %Stage::FetchGlobal);
        let global = self
            .source
            .fetch_global_count()?
            .ok_or_else(|| CovidError::FetchFailed(config::global_count_endpoint().to_string()))?;

        let global_rows = global.rows();
        let table = stats::statistics_table(&global_rows, self.variant);
        tracing::info!(stage = %Stage::PublishGlobal, rows = table.len());
        self.sink.write_sheet(config::GLOBAL_SHEET, &table)?;
        sheets.push(config::GLOBAL_SHEET.to_string());

        if self.variant.is_extended() {
            let log = RunLog {
                run_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
                countries: series.count,
                elapsed_seconds: started.elapsed().as_secs_f64(),
            };
            tracing::info!(stage = %Stage::PublishLogs, countries = log.countries, elapsed = log.elapsed_seconds);
            self.sink.write_sheet(config::LOGS_SHEET, &stats::log_table(&log))?;
            sheets.push(config::LOGS_SHEET.to_string());
        }

        let elapsed = started.elapsed();
        tracing::info!(stage = %Stage::Done, elapsed_secs = elapsed.as_secs_f64());
        println!(
            "Published {} country sheets and {} global rows in {:.2}s",
            countries.len(),
            global_rows.len(),
            elapsed.as_secs_f64()
        );

        Ok(RunReport {
            countries,
            reported_count: series.count,
            global_rows: global_rows.len(),
            sheets,
            elapsed,
        })
    }
}
