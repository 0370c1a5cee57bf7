//! Point value model

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Data type of a point value sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PointDataType {
    Binary,
    Multistate,
    Numeric,
    Alphanumeric,
    Image,
}

/// One timestamped sample for a data point, addressed by the point's XID.
///
/// Timestamps are epoch milliseconds, matching the server's wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointValue {
    pub xid: String,
    pub value: Value,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<PointDataType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
}

impl PointValue {
    pub fn numeric(xid: impl Into<String>, value: f64, timestamp: i64) -> Self {
        Self {
            xid: xid.into(),
            value: Value::from(value),
            timestamp,
            data_type: Some(PointDataType::Numeric),
            annotation: None,
        }
    }

    pub fn new(xid: impl Into<String>, value: Value, timestamp: i64) -> Self {
        Self {
            xid: xid.into(),
            value,
            timestamp,
            data_type: None,
            annotation: None,
        }
    }
}
