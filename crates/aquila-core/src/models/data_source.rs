//! Data source model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::common::{new_xid, PurgeSettings, TimePeriod};

/// A data source: a connection to some external system that produces
/// data points (virtual generator, SNMP agent, Modbus device, ...).
///
/// Module-specific fields (e.g. SNMP host settings) are carried in
/// `extra` so any source type round-trips through the REST API intact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    /// Server-assigned numeric id, absent until the source is saved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub xid: String,
    pub name: String,
    pub enabled: bool,
    /// Source type discriminator, e.g. `"VIRTUAL"` or `"SNMP"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,
    pub quantize: bool,
    pub use_cron: bool,
    pub cron_pattern: String,
    pub poll_period: TimePeriod,
    pub purge_settings: PurgeSettings,
    #[serde(default)]
    pub event_alarm_levels: Vec<Value>,
    pub edit_permission: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DataSource {
    /// A new data source with a fresh XID and the stock defaults:
    /// disabled, quantized, 5-second poll period, yearly purge.
    pub fn new() -> Self {
        let xid = new_xid();
        Self {
            id: None,
            name: format!("{xid} Name"),
            xid,
            enabled: false,
            model_type: None,
            quantize: true,
            use_cron: false,
            cron_pattern: String::new(),
            poll_period: TimePeriod::seconds(5),
            purge_settings: PurgeSettings::default(),
            event_alarm_levels: Vec::new(),
            edit_permission: None,
            extra: Map::new(),
        }
    }

    pub fn with_model_type(mut self, model_type: impl Into<String>) -> Self {
        self.model_type = Some(model_type.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl Default for DataSource {
    fn default() -> Self {
        Self::new()
    }
}
