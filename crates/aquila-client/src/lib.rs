//! Aquila Client Library
//!
//! A typed HTTP client for Aquila SCADA/IoT management servers. Remote
//! resources (data sources, data points, users, event detectors, point
//! values) are modelled as local objects backed by the server's REST API;
//! a small request pipeline handles cookies, CSRF double-submit, header
//! defaults, retries with a fixed delay, multipart upload, and streamed
//! download.
//!
//! # Example
//!
//! ```rust,no_run
//! use aquila_client::{AquilaClient, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = AquilaClient::new(ClientConfig::default())?;
//!
//!     // Authenticate; the session cookie is kept for later requests
//!     let user = client.users().login("admin", "admin").await?;
//!     println!("logged in as {}", user.username);
//!
//!     // Create a data source from the stock defaults
//!     let ds = aquila_core::DataSource::new().with_model_type("VIRTUAL");
//!     let saved = client.data_sources().create(&ds).await?;
//!     println!("saved with id {:?}", saved.id);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Raw requests
//!
//! Endpoints without a typed wrapper are reachable through the pipeline
//! directly:
//!
//! ```rust,no_run
//! use aquila_client::{AquilaClient, ClientConfig, RestRequest};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let client = AquilaClient::new(ClientConfig::default())?;
//! let response = client
//!     .execute(RestRequest::get("/rest/v2/server/system-info"))
//!     .await?;
//! println!("{:?}", response.data.as_json());
//! # Ok(())
//! # }
//! ```
//!
//! # Testing
//!
//! The `testing` module starts an axum router on an ephemeral port with a
//! ready-made client pointed at it:
//!
//! ```rust,ignore
//! use aquila_client::testing::TestServer;
//!
//! let server = TestServer::start(my_router).await?;
//! let response = server.client.execute(RestRequest::get("/ping")).await?;
//! ```

mod client;
mod config;
mod error;
pub mod resources;
mod rest;
mod session;
pub mod testing;

pub use client::AquilaClient;
pub use config::{ClientConfig, ClientConfigBuilder, ConfigError, Protocol, TimeoutsConfig};
pub use error::{ClientError, Result};
pub use rest::{
    DecodeMode, ParamValue, RequestBody, ResponseData, RestPipeline, RestRequest, RestResponse,
    DEFAULT_RETRY_DELAY,
};
pub use session::Session;

// Re-export the resource models for convenience
pub use aquila_core::{
    AlarmLevel, DataPoint, DataSource, DetectorType, EventDetector, PointValue, TimePeriod, User,
};
