// src/table/cell.rs

use chrono::NaiveDateTime;

/// Text values that count as missing, matching what pandas treats as NaN
/// when it reads a sheet or CSV with default settings.
pub const NA_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_na_marker(s: &str) -> bool {
    NA_MARKERS.contains(&s)
}

/// A single scalar value read from a sheet or delimited file.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Cell {
    /// Build a text cell, folding NA markers into `Empty`.
    pub fn from_text(s: impl Into<String>) -> Self {
        let s = s.into();
        if is_na_marker(&s) {
            Cell::Empty
        } else {
            Cell::Text(s)
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Float(f) => f.is_nan(),
            Cell::Text(s) => is_na_marker(s),
            _ => false,
        }
    }

    /// Stringify for the `value` field of a data value. `None` for null cells.
    ///
    /// Whole floats drop their fraction, since integer data elements reject
    /// `"5.0"`. Midnight date-times render as plain dates.
    pub fn render(&self) -> Option<String> {
        if self.is_null() {
            return None;
        }
        let s = match self {
            Cell::Empty => return None,
            Cell::Text(s) => s.clone(),
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) => render_float(*f),
            Cell::Bool(b) => b.to_string(),
            Cell::DateTime(dt) => {
                if dt.time() == chrono::NaiveTime::MIN {
                    dt.format("%Y-%m-%d").to_string()
                } else {
                    dt.format("%Y-%m-%dT%H:%M:%S").to_string()
                }
            }
        };
        Some(s)
    }
}

fn render_float(f: f64) -> String {
    // i64 is exact up to 2^53 for f64 inputs
    if f.fract() == 0.0 && f.abs() < 1e15 {
        (f as i64).to_string()
    } else {
        f.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn na_markers_are_null() {
        for marker in ["", "NA", "N/A", "NULL", "nan", "#N/A", "None"] {
            assert_eq!(Cell::from_text(marker), Cell::Empty, "marker {:?}", marker);
        }
        // pandas leaves whitespace and lowercase "na" alone
        assert_eq!(Cell::from_text(" "), Cell::Text(" ".into()));
        assert_eq!(Cell::from_text("na"), Cell::Text("na".into()));
    }

    #[test]
    fn render_numbers() {
        assert_eq!(Cell::Int(42).render().as_deref(), Some("42"));
        assert_eq!(Cell::Float(5.0).render().as_deref(), Some("5"));
        assert_eq!(Cell::Float(-3.0).render().as_deref(), Some("-3"));
        assert_eq!(Cell::Float(0.25).render().as_deref(), Some("0.25"));
        assert_eq!(Cell::Float(f64::NAN).render(), None);
    }

    #[test]
    fn render_other_scalars() {
        assert_eq!(Cell::Bool(true).render().as_deref(), Some("true"));
        assert_eq!(Cell::Text("abc".into()).render().as_deref(), Some("abc"));
        assert_eq!(Cell::Empty.render(), None);

        let midnight = NaiveDate::from_ymd_opt(2023, 1, 31)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            Cell::DateTime(midnight).render().as_deref(),
            Some("2023-01-31")
        );
        let afternoon = NaiveDate::from_ymd_opt(2023, 1, 31)
            .unwrap()
            .and_hms_opt(14, 5, 9)
            .unwrap();
        assert_eq!(
            Cell::DateTime(afternoon).render().as_deref(),
            Some("2023-01-31T14:05:09")
        );
    }
}
