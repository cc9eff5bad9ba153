// src/table/delimited.rs

use csv::ReaderBuilder;
use std::{fs::File, io::Read, path::Path};
use tracing::debug;

use super::{Cell, Table, TableError};

/// Read a delimited text file. The first record is the header; every other
/// field stays text, with NA markers folded into `Cell::Empty`.
pub fn read_delimited(path: &Path, delimiter: u8) -> Result<Table, TableError> {
    let file = File::open(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_delimited(file, delimiter).map_err(|failure| match failure {
        ParseFailure::Csv(source) => TableError::Csv {
            path: path.to_path_buf(),
            source,
        },
        ParseFailure::NoHeader => TableError::NoHeaderRow {
            path: path.to_path_buf(),
        },
    })
}

#[derive(Debug)]
pub(crate) enum ParseFailure {
    Csv(csv::Error),
    NoHeader,
}

pub(crate) fn parse_delimited<R: Read>(reader: R, delimiter: u8) -> Result<Table, ParseFailure> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);

    let mut records = rdr.records();
    let header = records
        .next()
        .ok_or(ParseFailure::NoHeader)?
        .map_err(ParseFailure::Csv)?;
    let columns: Vec<String> = header
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut table = Table::new(columns);
    for (idx, result) in records.enumerate() {
        let record = result.map_err(ParseFailure::Csv)?;
        // blank lines are skipped by the reader; an all-empty record adds nothing
        if record.iter().all(str::is_empty) {
            debug!(record = idx + 1, "skipping empty record");
            continue;
        }
        table.push_row(record.iter().map(Cell::from_text).collect());
    }
    Ok(table)
}
