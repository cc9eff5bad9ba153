// src/table/workbook.rs

use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::NaiveDateTime;
use std::path::Path;
use tracing::debug;

use super::{Cell, Table, TableError};

/// Read one worksheet of a workbook into a `Table`. The first row of the used
/// range is the header.
pub fn read_workbook(path: &Path, sheet: Option<&str>) -> Result<Table, TableError> {
    let mut workbook = open_workbook_auto(path).map_err(|source| TableError::Workbook {
        path: path.to_path_buf(),
        source,
    })?;

    let sheet_names = workbook.sheet_names().to_owned();
    let used_sheet = match sheet {
        Some(name) if sheet_names.iter().any(|s| s == name) => name.to_string(),
        Some(name) => {
            return Err(TableError::MissingSheet {
                name: name.to_string(),
                available: sheet_names,
            })
        }
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| TableError::NoWorksheet {
                path: path.to_path_buf(),
            })?,
    };
    debug!(sheet = %used_sheet, "reading worksheet");

    let range = workbook
        .worksheet_range(&used_sheet)
        .map_err(|source| TableError::Workbook {
            path: path.to_path_buf(),
            source,
        })?;

    table_from_range(&range).ok_or_else(|| TableError::NoHeaderRow {
        path: path.to_path_buf(),
    })
}

/// `None` when the range has no rows at all.
pub(crate) fn table_from_range(range: &Range<Data>) -> Option<Table> {
    let mut rows = range.rows();
    let header = rows.next()?;
    let columns = header.iter().map(header_name).collect();

    let mut table = Table::new(columns);
    for row in rows {
        table.push_row(row.iter().map(cell_from_data).collect());
    }
    Some(table)
}

fn header_name(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        // numeric ids typed into a header row come back as floats
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => (*f as i64).to_string(),
        other => other.to_string().trim().to_string(),
    }
}

pub(crate) fn cell_from_data(cell: &Data) -> Cell {
    match cell {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) => Cell::from_text(s.as_str()),
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) => Cell::Float(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) => Cell::DateTime(ndt),
            None => Cell::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .map(Cell::DateTime)
            .unwrap_or_else(|_| Cell::from_text(s.as_str())),
        Data::DurationIso(s) => Cell::from_text(s.as_str()),
    }
}
