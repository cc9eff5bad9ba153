// src/payload/build.rs

use chrono::{Local, NaiveDate};
use tracing::{debug, warn};

use super::types::{DataValue, SubmissionPayload};
use crate::table::Table;

/// The server's built-in "default" category option combo.
pub const DEFAULT_CATEGORY_OPTION_COMBO: &str = "HllvX50cXC0";

/// Everything about a submission that does not come from the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportTarget {
    pub org_unit: String,
    pub period: String,
    pub data_set: String,
    /// `None` or empty falls back to `DEFAULT_CATEGORY_OPTION_COMBO`.
    pub category_option_combo: Option<String>,
    /// Attached to every data value; `None` omits the field.
    pub comment: Option<String>,
}

impl ImportTarget {
    pub fn category_option_combo(&self) -> &str {
        match self.category_option_combo.as_deref() {
            Some(coc) if !coc.is_empty() => coc,
            _ => DEFAULT_CATEGORY_OPTION_COMBO,
        }
    }
}

/// Build a payload whose `completeDate` is today's local date.
pub fn build_payload(table: &Table, target: &ImportTarget) -> SubmissionPayload {
    build_payload_on(table, target, Local::now().date_naive())
}

/// Map every non-null cell to a `DataValue`, row by row, in column order.
/// The column header is used verbatim as the data element id.
#[tracing::instrument(level = "info", skip(table, target), fields(rows = table.len()))]
pub fn build_payload_on(
    table: &Table,
    target: &ImportTarget,
    complete_date: NaiveDate,
) -> SubmissionPayload {
    let coc = target.category_option_combo();

    let blank_columns = table.columns().iter().filter(|c| c.is_empty()).count();
    if blank_columns > 0 {
        warn!(blank_columns, "columns without a header are skipped");
    }

    let mut data_values = Vec::new();
    let mut skipped = 0usize;
    for idx in 0..table.len() {
        for (data_element, cell) in table.row_cells(idx) {
            if data_element.is_empty() {
                continue;
            }
            let Some(value) = cell.render() else {
                skipped += 1;
                continue;
            };
            data_values.push(DataValue {
                data_element: data_element.to_string(),
                period: target.period.clone(),
                org_unit: target.org_unit.clone(),
                category_option_combo: coc.to_string(),
                value,
                comment: target.comment.clone(),
            });
        }
    }

    debug!(values = data_values.len(), skipped, "payload assembled");

    SubmissionPayload {
        data_set: target.data_set.clone(),
        complete_date,
        period: target.period.clone(),
        org_unit: target.org_unit.clone(),
        data_values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    fn target() -> ImportTarget {
        ImportTarget {
            org_unit: "DiszpKrYNg8".into(),
            period: "202301".into(),
            data_set: "pBOMPrpg1QX".into(),
            category_option_combo: None,
            comment: Some("Imported from Excel".into()),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 2, 3).unwrap()
    }

    fn table(columns: &[&str], rows: Vec<Vec<Cell>>) -> Table {
        let mut table = Table::new(columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            table.push_row(row);
        }
        table
    }

    #[test]
    fn one_null_cell_yields_one_value() {
        let t = table(&["deA", "deB"], vec![vec![Cell::Int(4), Cell::Empty]]);
        let payload = build_payload_on(&t, &target(), date());

        assert_eq!(payload.data_values.len(), 1);
        let dv = &payload.data_values[0];
        assert_eq!(dv.data_element, "deA");
        assert_eq!(dv.value, "4");
        assert_eq!(dv.period, "202301");
        assert_eq!(dv.org_unit, "DiszpKrYNg8");
        assert_eq!(dv.category_option_combo, DEFAULT_CATEGORY_OPTION_COMBO);
        assert_eq!(dv.comment.as_deref(), Some("Imported from Excel"));
    }

    #[test]
    fn header_fields_come_from_target() {
        let t = table(&["deA"], vec![vec![Cell::Int(1)]]);
        let payload = build_payload_on(&t, &target(), date());

        assert_eq!(payload.data_set, "pBOMPrpg1QX");
        assert_eq!(payload.period, "202301");
        assert_eq!(payload.org_unit, "DiszpKrYNg8");
        assert_eq!(payload.complete_date, date());
    }

    #[test]
    fn nulls_never_emitted_and_ids_preserved() {
        let columns = ["a.b-C", " spaced ", "UPPER", "x"];
        let t = table(
            &columns,
            vec![
                vec![
                    Cell::Text("1".into()),
                    Cell::Float(f64::NAN),
                    Cell::Text("NA".into()),
                    Cell::Bool(true),
                ],
                vec![Cell::Empty, Cell::Float(2.5), Cell::Empty],
                vec![],
            ],
        );
        let payload = build_payload_on(&t, &target(), date());

        let got: Vec<(&str, &str)> = payload
            .data_values
            .iter()
            .map(|dv| (dv.data_element.as_str(), dv.value.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![("a.b-C", "1"), ("x", "true"), (" spaced ", "2.5")]
        );
        for dv in &payload.data_values {
            assert!(columns.contains(&dv.data_element.as_str()));
            assert!(!crate::table::cell::is_na_marker(&dv.value));
        }
    }

    #[test]
    fn category_option_combo_fallbacks() {
        let t = table(&["deA"], vec![vec![Cell::Int(1)]]);

        let mut custom = target();
        custom.category_option_combo = Some("Prlt0C1RF0s".into());
        let payload = build_payload_on(&t, &custom, date());
        assert_eq!(payload.data_values[0].category_option_combo, "Prlt0C1RF0s");

        custom.category_option_combo = Some(String::new());
        let payload = build_payload_on(&t, &custom, date());
        assert_eq!(
            payload.data_values[0].category_option_combo,
            DEFAULT_CATEGORY_OPTION_COMBO
        );
    }

    #[test]
    fn comment_can_be_omitted() {
        let t = table(&["deA"], vec![vec![Cell::Int(1)]]);
        let mut quiet = target();
        quiet.comment = None;
        let payload = build_payload_on(&t, &quiet, date());
        assert_eq!(payload.data_values[0].comment, None);
    }

    #[test]
    fn blank_header_columns_are_skipped() {
        let t = table(&["deA", ""], vec![vec![Cell::Int(1), Cell::Int(2)]]);
        let payload = build_payload_on(&t, &target(), date());
        assert_eq!(payload.data_values.len(), 1);
        assert_eq!(payload.data_values[0].data_element, "deA");
    }

    #[test]
    fn empty_table_builds_empty_payload() {
        let payload = build_payload_on(&Table::default(), &target(), date());
        assert!(payload.data_values.is_empty());
        assert_eq!(payload.data_set, "pBOMPrpg1QX");
    }

    #[test]
    fn build_payload_stamps_today() {
        let before = Local::now().date_naive();
        let payload = build_payload(&Table::default(), &target());
        let after = Local::now().date_naive();
        assert!(payload.complete_date == before || payload.complete_date == after);
    }
}
