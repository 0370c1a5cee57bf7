//! Resource model types

pub mod common;
pub mod data_point;
pub mod data_source;
pub mod event_detector;
pub mod point_value;
pub mod user;

pub use common::{new_xid, AlarmLevel, PeriodType, PurgeSettings, TimePeriod};
pub use data_point::DataPoint;
pub use data_source::DataSource;
pub use event_detector::{DetectorType, EventDetector};
pub use point_value::{PointDataType, PointValue};
pub use user::User;
