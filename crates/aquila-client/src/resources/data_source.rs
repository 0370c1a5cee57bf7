//! Data source operations

use std::sync::Arc;

use aquila_core::DataSource;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::rest::{RestPipeline, RestRequest};

use super::{encode_path_segment, Page};

const BASE_URL: &str = "/rest/v3/data-sources";

/// Client for `/rest/v3/data-sources`.
#[derive(Debug, Clone)]
pub struct DataSourcesClient {
    pipeline: Arc<RestPipeline>,
}

impl DataSourcesClient {
    pub(crate) fn new(pipeline: Arc<RestPipeline>) -> Self {
        Self { pipeline }
    }

    /// List all data sources.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Page<DataSource>> {
        let response = self.pipeline.execute(RestRequest::get(BASE_URL)).await?;
        response.parse()
    }

    /// Fetch a data source by XID.
    #[instrument(skip(self))]
    pub async fn get(&self, xid: &str) -> Result<DataSource> {
        let path = format!("{BASE_URL}/{}", encode_path_segment(xid));
        let response = self.pipeline.execute(RestRequest::get(path)).await?;
        response.parse()
    }

    /// Create a new data source; returns the server's version with its
    /// assigned id.
    #[instrument(skip(self, data_source), fields(xid = %data_source.xid))]
    pub async fn create(&self, data_source: &DataSource) -> Result<DataSource> {
        let request = RestRequest::post(BASE_URL).json_body(data_source)?;
        let response = self.pipeline.execute(request).await?;
        response.parse()
    }

    /// Update an existing data source identified by `xid`.
    #[instrument(skip(self, data_source))]
    pub async fn update(&self, xid: &str, data_source: &DataSource) -> Result<DataSource> {
        let path = format!("{BASE_URL}/{}", encode_path_segment(xid));
        let request = RestRequest::put(path).json_body(data_source)?;
        let response = self.pipeline.execute(request).await?;
        response.parse()
    }

    /// Create or update depending on whether the data source has been
    /// saved before (a server-assigned id).
    pub async fn save(&self, data_source: &DataSource) -> Result<DataSource> {
        if data_source.id.is_some() {
            self.update(&data_source.xid, data_source).await
        } else {
            self.create(data_source).await
        }
    }

    /// Delete a data source; returns the deleted representation.
    #[instrument(skip(self))]
    pub async fn delete(&self, xid: &str) -> Result<DataSource> {
        let path = format!("{BASE_URL}/{}", encode_path_segment(xid));
        let response = self.pipeline.execute(RestRequest::delete(path)).await?;
        response.parse()
    }

    /// Copy a data source server-side, giving the copy a new XID and name.
    #[instrument(skip(self))]
    pub async fn copy(&self, xid: &str, copy_xid: &str, copy_name: &str) -> Result<DataSource> {
        let path = format!("{BASE_URL}/copy/{}", encode_path_segment(xid));
        debug!("copying data source");
        let request = RestRequest::put(path)
            .param("copyXid", copy_xid)
            .param("copyName", copy_name);
        let response = self.pipeline.execute(request).await?;
        response.parse()
    }
}
