// src/table/mod.rs

pub mod cell;
pub mod delimited;
pub mod workbook;

pub use cell::Cell;

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum TableError {
    #[error("unsupported file type {path:?}: expected a workbook (.xlsx/.xls/.ods) or .csv/.tsv")]
    UnsupportedFormat { path: PathBuf },

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse error in {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to open workbook {path:?}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("workbook {path:?} has no worksheet")]
    NoWorksheet { path: PathBuf },

    #[error("sheet {name:?} not found; available: {available:?}")]
    MissingSheet { name: String, available: Vec<String> },

    #[error("{path:?} has no header row")]
    NoHeaderRow { path: PathBuf },
}

/// Column-ordered rows, each column named by a data element id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding short rows with `Empty` and dropping cells past
    /// the last column.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        if row.len() > self.columns.len() {
            warn!(
                cells = row.len(),
                columns = self.columns.len(),
                "row has more cells than headers; extra cells dropped"
            );
            row.truncate(self.columns.len());
        }
        row.resize(self.columns.len(), Cell::Empty);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate one row as `(column, cell)` pairs.
    pub fn row_cells(&self, idx: usize) -> impl Iterator<Item = (&str, &Cell)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.rows.get(idx).into_iter().flatten())
    }
}

/// How a file on disk should be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Workbook,
    Delimited(u8),
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(TableFormat::Workbook),
            "csv" | "txt" => Some(TableFormat::Delimited(b',')),
            "tsv" => Some(TableFormat::Delimited(b'\t')),
            _ => None,
        }
    }
}

/// Load `path` into a `Table`, choosing the reader by file extension.
/// `sheet` only applies to workbooks; `None` means the first worksheet.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn read_table(path: impl AsRef<Path>, sheet: Option<&str>) -> Result<Table, TableError> {
    let path = path.as_ref();
    let format = TableFormat::from_path(path).ok_or_else(|| TableError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;

    let table = match format {
        TableFormat::Workbook => workbook::read_workbook(path, sheet)?,
        TableFormat::Delimited(delimiter) => {
            if sheet.is_some() {
                warn!("sheet name ignored for delimited input");
            }
            delimited::read_delimited(path, delimiter)?
        }
    };

    info!(
        columns = table.columns().len(),
        rows = table.len(),
        "table loaded"
    );
    Ok(table)
}
