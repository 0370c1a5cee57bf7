//! Data point operations

use std::sync::Arc;

use aquila_core::DataPoint;
use tracing::instrument;

use crate::error::Result;
use crate::rest::{RestPipeline, RestRequest};

use super::encode_path_segment;

const BASE_URL: &str = "/rest/v1/data-points";

/// Client for `/rest/v1/data-points`.
#[derive(Debug, Clone)]
pub struct DataPointsClient {
    pipeline: Arc<RestPipeline>,
}

impl DataPointsClient {
    pub(crate) fn new(pipeline: Arc<RestPipeline>) -> Self {
        Self { pipeline }
    }

    /// Fetch a data point by XID.
    #[instrument(skip(self))]
    pub async fn get(&self, xid: &str) -> Result<DataPoint> {
        let path = format!("{BASE_URL}/{}", encode_path_segment(xid));
        let response = self.pipeline.execute(RestRequest::get(path)).await?;
        response.parse()
    }

    /// Create a new data point on its data source.
    #[instrument(skip(self, data_point), fields(xid = %data_point.xid))]
    pub async fn create(&self, data_point: &DataPoint) -> Result<DataPoint> {
        let request = RestRequest::post(BASE_URL).json_body(data_point)?;
        let response = self.pipeline.execute(request).await?;
        response.parse()
    }

    /// Update an existing data point identified by `xid`.
    #[instrument(skip(self, data_point))]
    pub async fn update(&self, xid: &str, data_point: &DataPoint) -> Result<DataPoint> {
        let path = format!("{BASE_URL}/{}", encode_path_segment(xid));
        let request = RestRequest::put(path).json_body(data_point)?;
        let response = self.pipeline.execute(request).await?;
        response.parse()
    }

    /// Create or update depending on whether the point has a
    /// server-assigned id.
    pub async fn save(&self, data_point: &DataPoint) -> Result<DataPoint> {
        if data_point.id.is_some() {
            self.update(&data_point.xid, data_point).await
        } else {
            self.create(data_point).await
        }
    }

    /// Delete a data point; returns the deleted representation.
    #[instrument(skip(self))]
    pub async fn delete(&self, xid: &str) -> Result<DataPoint> {
        let path = format!("{BASE_URL}/{}", encode_path_segment(xid));
        let response = self.pipeline.execute(RestRequest::delete(path)).await?;
        response.parse()
    }
}
