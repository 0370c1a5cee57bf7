//! Data point model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::common::new_xid;

/// A single measured or computed value belonging to a data source.
///
/// The point locator is deliberately untyped: its shape depends entirely
/// on the owning source's module (`PL.VIRTUAL`, `PL.SNMP`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub xid: String,
    pub name: String,
    pub enabled: bool,
    pub device_name: String,
    pub data_source_xid: String,
    pub point_locator: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DataPoint {
    /// A new point on the given source with a fresh XID.
    pub fn on_source(data_source_xid: impl Into<String>, point_locator: Value) -> Self {
        let xid = new_xid();
        Self {
            id: None,
            name: format!("{xid} Name"),
            xid,
            enabled: false,
            device_name: String::new(),
            data_source_xid: data_source_xid.into(),
            point_locator,
            extra: Map::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_device_name(mut self, device_name: impl Into<String>) -> Self {
        self.device_name = device_name.into();
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}
