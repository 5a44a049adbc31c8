//! COVID-19 statistics publisher.
//!
//! Fetches per-country timeseries and a global snapshot from
//! [covidapi.info](https://covidapi.info), derives active cases, mortality,
//! recovery and active-case rates with their day-over-day changes, and
//! publishes one sheet per country plus `GLOBAL` (and `LOGS`) to a
//! spreadsheet document stored as a DuckDB file.
//!
//! # Quick start
//!
//! ```no_run
//! use covid_sheets::CovidSheets;
//!
//! let report = CovidSheets::builder()
//!     .workbook("COVID2020.duckdb")
//!     .build()
//!     .unwrap()
//!     .run()
//!     .unwrap();
//! println!("{} countries published", report.countries.len());
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod runner;
pub mod stats;
pub mod table;
pub mod workbook;

pub use cache::ResponseCache;
pub use client::{ApiClient, DataSource, HttpTransport, Transport};
pub use error::{CovidError, Result};
pub use runner::{RunReport, Runner};
pub use stats::Variant;
pub use table::{Cell, Column, ColumnKind, Table};
pub use workbook::{SheetSink, Workbook};

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// CovidSheetsBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`CovidSheets`] job.
///
/// Use [`CovidSheets::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](CovidSheetsBuilder::build).
pub struct CovidSheetsBuilder {
    base_url: String,
    workbook: Option<PathBuf>,
    start_date: String,
    variant: Variant,
    timeout: Option<Duration>,
}

impl Default for CovidSheetsBuilder {
    fn default() -> Self {
        Self {
            base_url: config::API_BASE.to_string(),
            workbook: None,
            start_date: config::START_DATE.to_string(),
            variant: Variant::default(),
            timeout: None,
        }
    }
}

impl CovidSheetsBuilder {
    /// Set the API base URL. Endpoint paths are appended verbatim, so the
    /// URL should end with `/`.
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    /// Set the workbook file.
    ///
    /// If not set, `COVID2020.duckdb` under the platform data directory is
    /// used (e.g. `~/.local/share/covid-sheets` on Linux).
    pub fn workbook<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.workbook = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the first day requested from the timeseries endpoint.
    pub fn start_date(mut self, date: &str) -> Self {
        self.start_date = date.to_string();
        self
    }

    /// Choose the standard or extended set of outputs. Defaults to extended.
    pub fn variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    /// Set an HTTP request timeout. Unset, the transport default applies.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Apply overrides from `COVID_SHEETS_*` environment variables.
    pub fn from_env(mut self) -> Result<Self> {
        if let Ok(url) = env::var(config::ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Ok(path) = env::var(config::ENV_WORKBOOK) {
            self.workbook = Some(PathBuf::from(path));
        }
        if let Ok(date) = env::var(config::ENV_START_DATE) {
            chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|e| {
                CovidError::InvalidArgument(format!(
                    "{}='{}' is not a YYYY-MM-DD date: {}",
                    config::ENV_START_DATE,
                    date,
                    e
                ))
            })?;
            self.start_date = date;
        }
        if let Ok(variant) = env::var(config::ENV_VARIANT) {
            self.variant = variant.parse()?;
        }
        if let Ok(secs) = env::var(config::ENV_TIMEOUT_SECS) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                CovidError::InvalidArgument(format!(
                    "{}='{}' is not a whole number of seconds",
                    config::ENV_TIMEOUT_SECS,
                    secs
                ))
            })?;
            self.timeout = Some(Duration::from_secs(secs));
        }
        Ok(self)
    }

    /// Build the job and its HTTP client.
    ///
    /// The workbook is not opened until [`CovidSheets::run`].
    pub fn build(self) -> Result<CovidSheets> {
        let client = ApiClient::new(&self.base_url, self.timeout)?;
        Ok(CovidSheets {
            client,
            workbook: self.workbook.unwrap_or_else(config::default_workbook_path),
            start_date: self.start_date,
            variant: self.variant,
        })
    }
}

// ---------------------------------------------------------------------------
// CovidSheets
// ---------------------------------------------------------------------------

/// One configured publishing run.
///
/// Created via [`CovidSheets::builder()`].
pub struct CovidSheets {
    client: ApiClient,
    workbook: PathBuf,
    start_date: String,
    variant: Variant,
}

impl CovidSheets {
    /// Create a new builder for configuring the job.
    pub fn builder() -> CovidSheetsBuilder {
        CovidSheetsBuilder::default()
    }

    pub fn workbook_path(&self) -> &Path {
        &self.workbook
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Open the workbook, run every stage, and release the workbook.
    ///
    /// On error the workbook is released as it is dropped; sheets already
    /// written stay written.
    pub fn run(self) -> Result<RunReport> {
        let workbook = Workbook::open(&self.workbook)?;
        tracing::info!(workbook = %self.workbook.display(), variant = ?self.variant, "run starting");

        let mut runner =
            Runner::new(self.client, workbook, self.variant).start_date(&self.start_date);
        let report = runner.run()?;

        let (_, workbook) = runner.into_parts();
        workbook.close()?;
        Ok(report)
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for CovidSheets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CovidSheets(base_url={}, workbook={}, start_date={}, variant={:?})",
            self.client.base_url(),
            self.workbook.display(),
            self.start_date,
            self.variant
        )
    }
}
