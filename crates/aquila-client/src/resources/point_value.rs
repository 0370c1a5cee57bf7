//! Point value operations
//!
//! Time range queries send their bounds as ISO-8601 date-times with
//! millisecond precision; stored values carry epoch-millisecond
//! timestamps.

use std::sync::Arc;

use aquila_core::PointValue;
use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::error::Result;
use crate::rest::{RestPipeline, RestRequest};

use super::encode_path_segment;

const BASE_URL: &str = "/rest/v1/point-values";

/// Client for `/rest/v1/point-values`.
#[derive(Debug, Clone)]
pub struct PointValuesClient {
    pipeline: Arc<RestPipeline>,
}

impl PointValuesClient {
    pub(crate) fn new(pipeline: Arc<RestPipeline>) -> Self {
        Self { pipeline }
    }

    /// Insert a batch of values, each tagged with its point's XID.
    #[instrument(skip(self, values), fields(count = values.len()))]
    pub async fn insert(&self, values: &[PointValue]) -> Result<()> {
        let request = RestRequest::put(BASE_URL).json_body(&values)?;
        self.pipeline.execute(request).await?;
        Ok(())
    }

    /// The most recent values for a point, newest first.
    #[instrument(skip(self))]
    pub async fn latest(&self, xid: &str, limit: u32) -> Result<Vec<PointValue>> {
        let path = format!("{BASE_URL}/{}/latest", encode_path_segment(xid));
        let request = RestRequest::get(path).param("limit", limit);
        let response = self.pipeline.execute(request).await?;
        response.parse()
    }

    /// Values recorded for a point within `[from, to)`, optionally capped.
    #[instrument(skip(self))]
    pub async fn for_time_period(
        &self,
        xid: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: Option<u32>,
    ) -> Result<Vec<PointValue>> {
        let path = format!("{BASE_URL}/{}", encode_path_segment(xid));
        let mut request = RestRequest::get(path).param("from", from).param("to", to);
        if let Some(limit) = limit {
            request = request.param("limit", limit);
        }
        let response = self.pipeline.execute(request).await?;
        response.parse()
    }
}
