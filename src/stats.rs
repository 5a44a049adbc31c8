//! Statistics pipeline: cumulative counts to rates, rates to day-over-day deltas.
//!
//! Every function here is pure. Output depends only on the input rows and
//! their order, so running the pipeline twice over the same rows yields the
//! same table. Zero `confirmed` counts are not special-cased: the rates for
//! such a row come out as NaN or infinite and flow into the deltas as-is.

use std::str::FromStr;

use crate::error::CovidError;
use crate::models::{CaseCounts, DailyRecord, DerivedRow, GlobalRow, RunLog};
use crate::table::{Cell, Column, ColumnKind, Table};

/// Fractional digits kept when rounding a ratio, before scaling to percent.
pub const RATE_PRECISION: i32 = 5;

/// Which set of derived columns to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// Active cases, the three rates and their deltas.
    Standard,
    /// Standard plus the first and second differences of `confirmed`,
    /// a progress prefix on the console and a LOGS sheet.
    #[default]
    Extended,
}

impl Variant {
    pub fn is_extended(self) -> bool {
        self == Variant::Extended
    }
}

impl FromStr for Variant {
    type Err = CovidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Variant::Standard),
            "extended" => Ok(Variant::Extended),
            other => Err(CovidError::InvalidArgument(format!(
                "unknown variant '{}', expected 'standard' or 'extended'",
                other
            ))),
        }
    }
}

/// A row the pipeline can derive statistics from.
pub trait Observation {
    /// Name of the column holding [`Observation::label`] in a published table.
    const LABEL_COLUMN: &'static str;

    fn label(&self) -> String;
    fn counts(&self) -> CaseCounts;
}

impl Observation for DailyRecord {
    const LABEL_COLUMN: &'static str = "date";

    fn label(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    fn counts(&self) -> CaseCounts {
        self.counts
    }
}

impl Observation for GlobalRow {
    const LABEL_COLUMN: &'static str = "country";

    fn label(&self) -> String {
        self.country.clone()
    }

    fn counts(&self) -> CaseCounts {
        self.counts
    }
}

// ---------------------------------------------------------------------------
// Column primitives
// ---------------------------------------------------------------------------

/// Subtraction used by the difference columns.
///
/// Integer counts wrap on overflow instead of panicking, like a 64-bit
/// numeric column would; floats subtract under IEEE-754 rules.
pub trait Difference: Copy {
    fn difference(self, previous: Self) -> Self;
}

impl Difference for i64 {
    fn difference(self, previous: Self) -> Self {
        self.wrapping_sub(previous)
    }
}

impl Difference for f64 {
    fn difference(self, previous: Self) -> Self {
        self - previous
    }
}

pub fn active_cases(counts: &CaseCounts) -> i64 {
    counts
        .confirmed
        .wrapping_sub(counts.deaths.wrapping_add(counts.recovered))
}

/// Round half to even at `digits` fractional digits.
pub fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round_ties_even() / scale
}

/// `round(part / whole, 5) * 100`, unguarded against `whole == 0`.
pub fn percentage(part: i64, whole: i64) -> f64 {
    round_to(part as f64 / whole as f64, RATE_PRECISION) * 100.0
}

/// `values[i] - values[i - 1]`, with `None` for the first element.
pub fn first_difference<T: Difference>(values: &[T]) -> Vec<Option<T>> {
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() {
        return out;
    }
    out.push(None);
    out.extend(values.windows(2).map(|w| Some(w[1].difference(w[0]))));
    out
}

/// First difference of a column that already has gaps; a gap on either side
/// yields a gap.
pub fn difference_of<T: Difference>(values: &[Option<T>]) -> Vec<Option<T>> {
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() {
        return out;
    }
    out.push(None);
    out.extend(values.windows(2).map(|w| match (w[0], w[1]) {
        (Some(prev), Some(cur)) => Some(cur.difference(prev)),
        _ => None,
    }));
    out
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Derive the statistics columns for an ordered set of rows.
pub fn derive<O: Observation>(rows: &[O], variant: Variant) -> Vec<DerivedRow> {
    let counts: Vec<CaseCounts> = rows.iter().map(Observation::counts).collect();

    let active: Vec<i64> = counts.iter().map(active_cases).collect();
    let mortality: Vec<f64> = counts
        .iter()
        .map(|c| percentage(c.deaths, c.confirmed))
        .collect();
    let recovery: Vec<f64> = counts
        .iter()
        .map(|c| percentage(c.recovered, c.confirmed))
        .collect();
    let active_rate: Vec<f64> = counts
        .iter()
        .zip(&active)
        .map(|(c, a)| percentage(*a, c.confirmed))
        .collect();

    let change_in_mortality = first_difference(&mortality);
    let change_in_recovery = first_difference(&recovery);
    let change_in_active = first_difference(&active_rate);

    let (confirmed_rate, change_confirmed_rate) = if variant.is_extended() {
        let confirmed: Vec<i64> = counts.iter().map(|c| c.confirmed).collect();
        let rate = first_difference(&confirmed);
        let change = difference_of(&rate);
        (rate, change)
    } else {
        (vec![None; rows.len()], vec![None; rows.len()])
    };

    rows.iter()
        .enumerate()
        .map(|(i, row)| DerivedRow {
            label: row.label(),
            confirmed: counts[i].confirmed,
            deaths: counts[i].deaths,
            recovered: counts[i].recovered,
            active_cases: active[i],
            mortality_rate: mortality[i],
            recovery_rate: recovery[i],
            active_cases_rate: active_rate[i],
            change_in_mortality: change_in_mortality[i],
            change_in_recovery: change_in_recovery[i],
            change_in_active_cases: change_in_active[i],
            confirmed_rate: confirmed_rate[i],
            change_confirmed_rate: change_confirmed_rate[i],
        })
        .collect()
}

/// Column layout of a derived table.
pub fn derived_columns(label_column: &str, variant: Variant) -> Vec<Column> {
    let mut columns = vec![
        Column::new(label_column, ColumnKind::Text),
        Column::new("confirmed", ColumnKind::Integer),
        Column::new("deaths", ColumnKind::Integer),
        Column::new("recovered", ColumnKind::Integer),
        Column::new("active_cases", ColumnKind::Integer),
        Column::new("mortality_rate", ColumnKind::Float),
        Column::new("recovery_rate", ColumnKind::Float),
        Column::new("active_cases_rate", ColumnKind::Float),
        Column::new("change_in_mortality", ColumnKind::Float),
        Column::new("change_in_recovery", ColumnKind::Float),
        Column::new("change_in_active_cases", ColumnKind::Float),
    ];
    if variant.is_extended() {
        columns.push(Column::new("confirmed_rate", ColumnKind::Integer));
        columns.push(Column::new("change_confirmed_rate", ColumnKind::Integer));
    }
    columns
}

/// Render derived rows as a publishable table.
pub fn to_table(rows: &[DerivedRow], label_column: &str, variant: Variant) -> Table {
    let mut table = Table::new(derived_columns(label_column, variant));
    table.rows = rows
        .iter()
        .map(|row| {
            let mut cells = vec![
                Cell::from(row.label.as_str()),
                Cell::from(row.confirmed),
                Cell::from(row.deaths),
                Cell::from(row.recovered),
                Cell::from(row.active_cases),
                Cell::from(row.mortality_rate),
                Cell::from(row.recovery_rate),
                Cell::from(row.active_cases_rate),
                Cell::from(row.change_in_mortality),
                Cell::from(row.change_in_recovery),
                Cell::from(row.change_in_active_cases),
            ];
            if variant.is_extended() {
                cells.push(Cell::from(row.confirmed_rate));
                cells.push(Cell::from(row.change_confirmed_rate));
            }
            cells
        })
        .collect();
    table
}

/// Derive and render in one step, labelling rows the way `O` names them.
pub fn statistics_table<O: Observation>(rows: &[O], variant: Variant) -> Table {
    to_table(&derive(rows, variant), O::LABEL_COLUMN, variant)
}

/// The one-row LOGS table.
pub fn log_table(log: &RunLog) -> Table {
    let mut table = Table::new(vec![
        Column::new("run_at", ColumnKind::Text),
        Column::new("countries", ColumnKind::Integer),
        Column::new("elapsed_seconds", ColumnKind::Float),
    ]);
    table.rows.push(vec![
        Cell::from(log.run_at.as_str()),
        Cell::from(log.countries),
        Cell::from(log.elapsed_seconds),
    ]);
    table
}
