//! Aquila HTTP client implementation

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::resources::{
    DataPointsClient, DataSourcesClient, EventDetectorsClient, PointValuesClient, UsersClient,
};
use crate::rest::{RestPipeline, RestRequest, RestResponse};
use crate::session::Session;

/// Aquila REST API client
///
/// Cheap to clone; all clones share the connection pool and the session
/// (cookie jar, anti-forgery token, default headers).
#[derive(Debug, Clone)]
pub struct AquilaClient {
    pipeline: Arc<RestPipeline>,
}

impl AquilaClient {
    /// Create a client from a configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            pipeline: Arc::new(RestPipeline::new(&config)?),
        })
    }

    /// Create a client for a local default server (`http://localhost:8080`).
    pub fn localhost() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Get the shared request pipeline, for endpoints without a typed
    /// wrapper.
    pub fn pipeline(&self) -> &RestPipeline {
        &self.pipeline
    }

    /// Execute a raw request through the shared pipeline.
    pub async fn execute(&self, request: RestRequest) -> Result<RestResponse> {
        self.pipeline.execute(request).await
    }

    /// Run a closure against the session (cookie jar + default headers).
    pub fn with_session<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        self.pipeline.with_session(f)
    }

    // =========================================================================
    // Resource clients
    // =========================================================================

    /// Data source operations (`/rest/v3/data-sources`)
    pub fn data_sources(&self) -> DataSourcesClient {
        DataSourcesClient::new(Arc::clone(&self.pipeline))
    }

    /// Data point operations (`/rest/v1/data-points`)
    pub fn data_points(&self) -> DataPointsClient {
        DataPointsClient::new(Arc::clone(&self.pipeline))
    }

    /// User and authentication operations (`/rest/v1/users`)
    pub fn users(&self) -> UsersClient {
        UsersClient::new(Arc::clone(&self.pipeline))
    }

    /// Event detector operations (`/rest/v3/event-detectors`)
    pub fn event_detectors(&self) -> EventDetectorsClient {
        EventDetectorsClient::new(Arc::clone(&self.pipeline))
    }

    /// Point value operations (`/rest/v1/point-values`)
    pub fn point_values(&self) -> PointValuesClient {
        PointValuesClient::new(Arc::clone(&self.pipeline))
    }
}
