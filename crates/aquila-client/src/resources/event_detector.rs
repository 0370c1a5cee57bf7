//! Event detector operations

use std::sync::Arc;

use aquila_core::EventDetector;
use tracing::instrument;

use crate::error::Result;
use crate::rest::{RestPipeline, RestRequest};

use super::{encode_path_segment, Page};

const BASE_URL: &str = "/rest/v3/event-detectors";

/// Client for `/rest/v3/event-detectors`.
#[derive(Debug, Clone)]
pub struct EventDetectorsClient {
    pipeline: Arc<RestPipeline>,
}

impl EventDetectorsClient {
    pub(crate) fn new(pipeline: Arc<RestPipeline>) -> Self {
        Self { pipeline }
    }

    /// List all event detectors.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Page<EventDetector>> {
        let response = self.pipeline.execute(RestRequest::get(BASE_URL)).await?;
        response.parse()
    }

    /// Fetch an event detector by XID.
    #[instrument(skip(self))]
    pub async fn get(&self, xid: &str) -> Result<EventDetector> {
        let path = format!("{BASE_URL}/{}", encode_path_segment(xid));
        let response = self.pipeline.execute(RestRequest::get(path)).await?;
        response.parse()
    }

    /// Create a new event detector on its data point.
    #[instrument(skip(self, detector), fields(xid = %detector.xid))]
    pub async fn create(&self, detector: &EventDetector) -> Result<EventDetector> {
        let request = RestRequest::post(BASE_URL).json_body(detector)?;
        let response = self.pipeline.execute(request).await?;
        response.parse()
    }

    /// Update an existing event detector identified by `xid`.
    #[instrument(skip(self, detector))]
    pub async fn update(&self, xid: &str, detector: &EventDetector) -> Result<EventDetector> {
        let path = format!("{BASE_URL}/{}", encode_path_segment(xid));
        let request = RestRequest::put(path).json_body(detector)?;
        let response = self.pipeline.execute(request).await?;
        response.parse()
    }

    /// Create or update depending on whether the detector has a
    /// server-assigned id.
    pub async fn save(&self, detector: &EventDetector) -> Result<EventDetector> {
        if detector.id.is_some() {
            self.update(&detector.xid, detector).await
        } else {
            self.create(detector).await
        }
    }

    /// Delete an event detector; returns the deleted representation.
    #[instrument(skip(self))]
    pub async fn delete(&self, xid: &str) -> Result<EventDetector> {
        let path = format!("{BASE_URL}/{}", encode_path_segment(xid));
        let response = self.pipeline.execute(RestRequest::delete(path)).await?;
        response.parse()
    }
}
