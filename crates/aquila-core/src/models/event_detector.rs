//! Event detector model

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::common::{new_xid, AlarmLevel, TimePeriod};

/// Every point-event detector type the platform recognizes.
///
/// The type tag is a closed enum, so requesting defaults for an
/// unrecognized tag is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DetectorType {
    BinaryState,
    NoUpdate,
    NoChange,
    StateChangeCount,
    AlphanumericRegexState,
    AnalogChange,
    HighLimit,
    LowLimit,
    Range,
    NegativeCusum,
    PositiveCusum,
    Smoothness,
    MultistateState,
}

/// An event detector attached to a data point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetector {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub xid: String,
    pub name: String,
    pub alarm_level: AlarmLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detector_type: Option<DetectorType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detector_source_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<TimePeriod>,
    /// Type-specific threshold fields (limit, state, weight, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventDetector {
    /// A bare detector with a fresh XID and no type information, for
    /// callers that fill in the payload themselves.
    pub fn new() -> Self {
        let xid = new_xid();
        Self {
            id: None,
            name: format!("{xid} Name"),
            xid,
            alarm_level: AlarmLevel::None,
            detector_type: None,
            detector_source_type: None,
            source_id: None,
            duration: None,
            extra: Map::new(),
        }
    }

    /// Build a detector of the given type against a data point, with the
    /// stock threshold defaults for that type.
    pub fn for_data_point(source_id: i64, detector_type: DetectorType) -> Self {
        let mut detector = Self::new();
        detector.detector_type = Some(detector_type);
        detector.detector_source_type = Some("DATA_POINT".to_string());
        detector.source_id = Some(source_id);
        detector.duration = Some(TimePeriod::seconds(10));

        let extra = &mut detector.extra;
        let mut put = |key: &str, value: Value| {
            extra.insert(key.to_string(), value);
        };
        match detector_type {
            DetectorType::BinaryState => put("state", json!(true)),
            DetectorType::NoUpdate | DetectorType::NoChange => {}
            DetectorType::StateChangeCount => put("changeCount", json!(2)),
            DetectorType::AlphanumericRegexState => put("state", json!(".*")),
            DetectorType::AnalogChange => {
                put("checkIncrease", json!(true));
                put("checkDecrease", json!(false));
                put("limit", json!(15));
            }
            DetectorType::HighLimit => {
                put("resetLimit", json!(10));
                put("useResetLimit", json!(true));
                put("notHigher", json!(false));
                put("limit", json!(15));
            }
            DetectorType::LowLimit => {
                put("resetLimit", json!(10));
                put("useResetLimit", json!(true));
                put("notLower", json!(true));
                put("limit", json!(15));
            }
            DetectorType::Range => {
                put("high", json!(100));
                put("low", json!(50));
                put("withinRange", json!(true));
            }
            DetectorType::NegativeCusum => {
                put("limit", json!(50));
                put("weight", json!(100));
            }
            DetectorType::PositiveCusum => {
                put("limit", json!(10));
                put("weight", json!(50));
            }
            DetectorType::Smoothness => {
                put("limit", json!(100));
                put("boxcar", json!(3));
            }
            DetectorType::MultistateState => put("state", json!(1)),
        }

        detector
    }

    pub fn with_alarm_level(mut self, alarm_level: AlarmLevel) -> Self {
        self.alarm_level = alarm_level;
        self
    }
}

impl Default for EventDetector {
    fn default() -> Self {
        Self::new()
    }
}
