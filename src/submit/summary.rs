// src/submit/summary.rs

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ImportCount {
    pub imported: u64,
    pub updated: u64,
    pub ignored: u64,
    pub deleted: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Conflict {
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

/// What the server reported about an import. Parsed leniently: every field
/// may be missing, and `raw` always keeps the full reply.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImportSummary {
    pub status: Option<String>,
    pub description: Option<String>,
    pub import_count: ImportCount,
    pub conflicts: Vec<Conflict>,
    #[serde(skip)]
    pub raw: Value,
}

impl ImportSummary {
    /// Accepts the bare summary of older servers, the
    /// `{"httpStatus": .., "response": {..}}` envelope of newer ones, or any
    /// other body (kept as a JSON string in `raw`).
    pub fn parse(body: &str) -> Self {
        let raw: Value = match serde_json::from_str(body) {
            Ok(v) => v,
            Err(_) => {
                return ImportSummary {
                    raw: Value::String(body.to_string()),
                    ..Default::default()
                }
            }
        };

        let inner = match raw.get("response") {
            Some(resp) if resp.is_object() => resp.clone(),
            _ => raw.clone(),
        };
        let mut summary: ImportSummary = serde_json::from_value(inner).unwrap_or_default();
        if summary.status.is_none() {
            summary.status = raw
                .get("status")
                .and_then(Value::as_str)
                .map(str::to_string);
        }
        summary.raw = raw;
        summary
    }

    pub fn has_errors(&self) -> bool {
        !self.conflicts.is_empty()
            || matches!(self.status.as_deref(), Some("ERROR") | Some("WARNING"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_summary() {
        let body = r#"{
            "responseType": "ImportSummary",
            "status": "SUCCESS",
            "description": "Import process completed successfully",
            "importCount": {"imported": 2, "updated": 1, "ignored": 0, "deleted": 0},
            "dataSetComplete": "2023-02-03"
        }"#;
        let summary = ImportSummary::parse(body);

        assert_eq!(summary.status.as_deref(), Some("SUCCESS"));
        assert_eq!(
            summary.import_count,
            ImportCount {
                imported: 2,
                updated: 1,
                ignored: 0,
                deleted: 0
            }
        );
        assert!(summary.conflicts.is_empty());
        assert!(!summary.has_errors());
        assert_eq!(summary.raw["dataSetComplete"], "2023-02-03");
    }

    #[test]
    fn parses_wrapped_summary_with_conflicts() {
        let body = r#"{
            "httpStatus": "Conflict",
            "httpStatusCode": 409,
            "status": "ERROR",
            "message": "An error occurred, please check import summary.",
            "response": {
                "responseType": "ImportSummary",
                "status": "WARNING",
                "importCount": {"imported": 1, "ignored": 1},
                "conflicts": [{"object": "deB", "value": "Data element not found or not accessible"}]
            }
        }"#;
        let summary = ImportSummary::parse(body);

        assert_eq!(summary.status.as_deref(), Some("WARNING"));
        assert_eq!(summary.import_count.imported, 1);
        assert_eq!(summary.import_count.ignored, 1);
        assert_eq!(summary.conflicts.len(), 1);
        assert_eq!(summary.conflicts[0].object.as_deref(), Some("deB"));
        assert!(summary.has_errors());
    }

    #[test]
    fn non_json_body_is_kept_raw() {
        let summary = ImportSummary::parse("<html>login</html>");
        assert_eq!(summary.status, None);
        assert_eq!(summary.raw, Value::String("<html>login</html>".into()));
    }
}
