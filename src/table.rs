//! Flat CSV table holding one row per player.
//!
//! Columns are addressed by header name. Columns the crate does not know about
//! are carried through untouched, so a table can be enriched, checkpointed and
//! re-read without losing anything the input had.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};

use crate::error::{Result, ScrapeError};

/// An ordered, column-named table of string cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table with the given column names.
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Read a table from a CSV file with a header row.
    #[instrument]
    pub fn read_csv(path: &Path) -> Result<Self> {
        let file = fs::File::open(path).map_err(|source| ScrapeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_reader(file).map_err(|source| ScrapeError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(rows = table.len(), columns = table.headers.len(), "read table");
        Ok(table)
    }

    /// Parse CSV from any reader. Short rows are padded with empty cells.
    pub fn from_reader<R: Read>(reader: R) -> csv::Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);
        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let width = headers.len();

        let mut rows = Vec::new();
        for (index, record) in rdr.records().enumerate() {
            let record = record?;
            let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
            if cells.len() > width {
                warn!(
                    row = index,
                    extra = cells.len() - width,
                    "dropping cells beyond header width"
                );
            }
            cells.resize(width, String::new());
            rows.push(cells);
        }

        Ok(Self { headers, rows })
    }

    /// Serialize the table as CSV into `writer`.
    pub fn to_writer<W: Write>(&self, writer: W) -> csv::Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Overwrite `path` with the whole table.
    ///
    /// The table is written to a sibling temporary file first and renamed into
    /// place, so an interrupted write leaves the previous file intact.
    #[instrument(skip(self), fields(rows = self.rows.len()))]
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ScrapeError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let tmp = temp_sibling(path);
        let file = fs::File::create(&tmp).map_err(|source| ScrapeError::Io {
            path: tmp.clone(),
            source,
        })?;
        self.to_writer(file).map_err(|source| ScrapeError::Csv {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, path).map_err(|source| ScrapeError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), "wrote table");
        Ok(())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the column named `name`, if present.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Return the index of `name`, appending an empty column when missing.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(index) = self.column(name) {
            return index;
        }
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.headers.len() - 1
    }

    /// Cell at `row` in column `name`. `None` when the column does not exist.
    pub fn get(&self, row: usize, name: &str) -> Option<&str> {
        let column = self.column(name)?;
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map(String::as_str)
    }

    /// Set a cell, creating the column if needed.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    pub fn set(&mut self, row: usize, name: &str, value: impl Into<String>) {
        let column = self.ensure_column(name);
        self.rows[row][column] = value.into();
    }

    /// Append a row given as `(column, value)` pairs. Unknown columns are added.
    pub fn push_row<'a, I>(&mut self, cells: I)
    where
        I: IntoIterator<Item = (&'a str, String)>,
    {
        self.rows.push(vec![String::new(); self.headers.len()]);
        let row = self.rows.len() - 1;
        for (name, value) in cells {
            self.set(row, name, value);
        }
    }
}

/// Trimmed cell content, or `None` for blanks and the null markers earlier tooling wrote.
pub(crate) fn non_empty(cell: &str) -> Option<&str> {
    let cell = cell.trim();
    let is_null = cell.is_empty()
        || cell.eq_ignore_ascii_case("n/a")
        || cell.eq_ignore_ascii_case("nan")
        || cell.eq_ignore_ascii_case("none");
    (!is_null).then_some(cell)
}

/// Parse an integer cell, accepting `45.0` and `1,234`.
pub(crate) fn parse_int(cell: &str) -> Option<i64> {
    parse_float(cell).map(|v| v.trunc() as i64)
}

pub(crate) fn parse_float(cell: &str) -> Option<f64> {
    non_empty(cell)?
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

pub(crate) fn parse_bool(cell: &str) -> Option<bool> {
    match non_empty(cell)?.to_ascii_lowercase().as_str() {
        "true" | "1" | "1.0" | "yes" => Some(true),
        "false" | "0" | "0.0" | "no" => Some(false),
        _ => None,
    }
}

pub(crate) fn fmt_opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub(crate) fn fmt_bool(value: Option<bool>) -> String {
    match value {
        Some(true) => "True".to_string(),
        Some(false) => "False".to_string(),
        None => String::new(),
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "table.csv".into());
    name.push(".tmp");
    path.with_file_name(name)
}
