//! Spreadsheet document backed by a DuckDB database.
//!
//! Each sheet is a table in the `main` schema. Writing a sheet replaces it
//! wholesale inside a transaction; there is no append mode and no index
//! column.
//!
//! Sheet names follow DuckDB identifier rules: lookups ignore ASCII case,
//! while the stored name keeps the case it was first written with. Writing
//! `"france"` when `"France"` exists is rejected instead of silently
//! replacing the other sheet.

use std::fs;
use std::path::{Path, PathBuf};

use duckdb::{types::ValueRef, Connection as DuckDbConnection};

use crate::error::{CovidError, Result};
use crate::table::{Cell, Column, ColumnKind, Table};

/// A write target addressed by sheet name.
pub trait SheetSink {
    /// Replace the named sheet with `table`.
    fn write_sheet(&mut self, name: &str, table: &Table) -> Result<()>;
}

/// Quote a sheet name for use as a DuckDB identifier.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// A spreadsheet document holding every sheet of a run.
pub struct Workbook {
    conn: DuckDbConnection,
    path: Option<PathBuf>,
}

impl Workbook {
    /// Open (or create) a workbook file, creating its directory if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = DuckDbConnection::open(&path)?;
        tracing::debug!(path = %path.display(), "opened workbook");
        Ok(Self {
            conn,
            path: Some(path),
        })
    }

    /// Open a workbook that lives only as long as this value.
    pub fn open_in_memory() -> Result<Self> {
        let conn = DuckDbConnection::open_in_memory()?;
        Ok(Self { conn, path: None })
    }

    /// Location on disk, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Sheet names, sorted.
    pub fn sheets(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = 'main' ORDER BY table_name",
        )?;
        let mut rows = stmt.query([])?;
        let mut names = Vec::new();
        while let Some(row) = rows.next()? {
            names.push(row.get::<_, String>(0)?);
        }
        Ok(names)
    }

    /// Whether a sheet resolves under `name`, ignoring ASCII case.
    pub fn has_sheet(&self, name: &str) -> Result<bool> {
        Ok(self.find_sheet(name)?.is_some())
    }

    /// Stored name of the sheet `name` resolves to, if any.
    fn find_sheet(&self, name: &str) -> Result<Option<String>> {
        Ok(self
            .sheets()?
            .into_iter()
            .find(|s| s.eq_ignore_ascii_case(name)))
    }

    /// Read a sheet back into a [`Table`].
    ///
    /// Column kinds come from the stored schema, so a table written with
    /// [`SheetSink::write_sheet`] reads back equal to what was written.
    pub fn read_sheet(&self, name: &str) -> Result<Table> {
        if !self.has_sheet(name)? {
            return Err(CovidError::NotFound(format!("Unknown sheet: {}", name)));
        }
        let columns = self.describe(name)?;

        let mut stmt = self
            .conn
            .prepare(&format!("SELECT * FROM {}", quote_ident(name)))?;
        let mut rows = stmt.query([])?;

        let mut table = Table::new(columns);
        let width = table.columns.len();
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(width);
            for i in 0..width {
                cells.push(convert_value_ref(row.get_ref(i)?));
            }
            table.rows.push(cells);
        }
        Ok(table)
    }

    /// Column names and kinds of a stored sheet, in table order.
    fn describe(&self, name: &str) -> Result<Vec<Column>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT column_name, column_type FROM (DESCRIBE SELECT * FROM {})",
            quote_ident(name)
        ))?;
        let mut rows = stmt.query([])?;
        let mut columns = Vec::new();
        while let Some(row) = rows.next()? {
            let col_name: String = row.get(0)?;
            let col_type: String = row.get(1)?;
            columns.push(Column {
                name: col_name,
                kind: ColumnKind::from_sql_type(&col_type),
            });
        }
        Ok(columns)
    }

    fn replace_table(&self, name: &str, table: &Table) -> Result<()> {
        let ident = quote_ident(name);
        let defs: Vec<String> = table
            .columns
            .iter()
            .map(|c| format!("{} {}", quote_ident(&c.name), c.kind.sql_type()))
            .collect();
        self.conn.execute_batch(&format!(
            "CREATE OR REPLACE TABLE {} ({})",
            ident,
            defs.join(", ")
        ))?;

        if table.rows.is_empty() {
            return Ok(());
        }

        let placeholders = vec!["?"; table.columns.len()].join(", ");
        let mut stmt = self
            .conn
            .prepare(&format!("INSERT INTO {} VALUES ({})", ident, placeholders))?;
        for row in &table.rows {
            let param_values: Vec<&dyn duckdb::ToSql> =
                row.iter().map(|c| c as &dyn duckdb::ToSql).collect();
            stmt.execute(param_values.as_slice())?;
        }
        Ok(())
    }

    /// Flush and release the underlying database.
    ///
    /// Dropping the workbook also releases it; this surfaces close errors.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| CovidError::from(e))
    }
}

impl SheetSink for Workbook {
    fn write_sheet(&mut self, name: &str, table: &Table) -> Result<()> {
        if name.trim().is_empty() {
            return Err(CovidError::InvalidArgument(
                "sheet name must not be empty".to_string(),
            ));
        }
        if table.columns.is_empty() {
            return Err(CovidError::InvalidArgument(format!(
                "sheet '{}' has no columns",
                name
            )));
        }
        table.validate()?;
        if let Some(existing) = self.find_sheet(name)? {
            if existing != name {
                return Err(CovidError::InvalidArgument(format!(
                    "sheet '{}' collides with existing sheet '{}' (names are case-insensitive)",
                    name, existing
                )));
            }
        }

        self.conn.execute_batch("BEGIN TRANSACTION")?;
        match self.replace_table(name, table) {
            Ok(()) => {
                self.conn.execute_batch("COMMIT")?;
                tracing::debug!(sheet = name, rows = table.len(), "sheet written");
                Ok(())
            }
            Err(e) => {
                let _ = self.conn.execute_batch("ROLLBACK");
                Err(e)
            }
        }
    }
}

/// Convert a DuckDB `ValueRef` to a [`Cell`].
fn convert_value_ref(val: ValueRef<'_>) -> Cell {
    match val {
        ValueRef::Null => Cell::Null,
        ValueRef::TinyInt(n) => Cell::Int(n.into()),
        ValueRef::SmallInt(n) => Cell::Int(n.into()),
        ValueRef::Int(n) => Cell::Int(n.into()),
        ValueRef::BigInt(n) => Cell::Int(n),
        ValueRef::HugeInt(n) => match i64::try_from(n) {
            Ok(i) => Cell::Int(i),
            Err(_) => Cell::Text(n.to_string()),
        },
        ValueRef::Float(f) => Cell::Float(f as f64),
        ValueRef::Double(f) => Cell::Float(f),
        ValueRef::Text(bytes) => Cell::Text(String::from_utf8_lossy(bytes).to_string()),
        ValueRef::Boolean(b) => Cell::Text(b.to_string()),
        _ => Cell::Null,
    }
}
