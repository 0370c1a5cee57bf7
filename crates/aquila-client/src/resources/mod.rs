//! Typed clients for the server's REST resources
//!
//! Each client borrows the shared [`RestPipeline`](crate::RestPipeline)
//! and wraps one resource family's endpoints with typed requests and
//! responses. Anything not covered here can be reached through
//! [`AquilaClient::execute`](crate::AquilaClient::execute).

mod data_point;
mod data_source;
mod event_detector;
mod point_value;
mod user;

pub use data_point::DataPointsClient;
pub use data_source::DataSourcesClient;
pub use event_detector::EventDetectorsClient;
pub use point_value::PointValuesClient;
pub use user::UsersClient;

use serde::Deserialize;

/// Paged listing shape used by v3 endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: Option<i64>,
}

/// URL-encode a resource identifier for use as a path segment.
///
/// Identifiers may contain a literal `/`, which must become `%2F` so the
/// identifier stays a single path segment.
pub(crate) fn encode_path_segment(id: &str) -> String {
    id.replace('/', "%2F")
}
