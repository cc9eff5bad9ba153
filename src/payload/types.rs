// src/payload/types.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One value for one data element in one period and org unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataValue {
    pub data_element: String,
    pub period: String,
    pub org_unit: String,
    pub category_option_combo: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Body of a `POST /api/dataValueSets` import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub data_set: String,
    /// Serialized as `YYYY-MM-DD`.
    pub complete_date: NaiveDate,
    pub period: String,
    pub org_unit: String,
    pub data_values: Vec<DataValue>,
}
