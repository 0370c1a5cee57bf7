//! User and authentication operations
//!
//! Login establishes a server session: the response's `Set-Cookie`
//! headers land in the shared cookie jar, so subsequent requests from
//! the same client are authenticated.

use std::sync::Arc;
use std::time::Duration;

use aquila_core::User;
use serde_json::json;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::rest::{RestPipeline, RestRequest, DEFAULT_RETRY_DELAY};

use super::encode_path_segment;

const BASE_URL: &str = "/rest/v1/users";
const LOGIN_URL: &str = "/rest/v2/login";
const LOGOUT_URL: &str = "/rest/v2/logout";

/// Client for `/rest/v1/users` and the session endpoints.
#[derive(Debug, Clone)]
pub struct UsersClient {
    pipeline: Arc<RestPipeline>,
}

impl UsersClient {
    pub(crate) fn new(pipeline: Arc<RestPipeline>) -> Self {
        Self { pipeline }
    }

    /// Log in and return the authenticated user.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<User> {
        self.login_with_retries(username, password, 0, DEFAULT_RETRY_DELAY)
            .await
    }

    /// Log in, retrying while the server is still starting up.
    #[instrument(skip(self, password))]
    pub async fn login_with_retries(
        &self,
        username: &str,
        password: &str,
        retries: u32,
        retry_delay: Duration,
    ) -> Result<User> {
        let request = RestRequest::post(LOGIN_URL)
            .json(json!({ "username": username, "password": password }))
            .retries(retries)
            .retry_delay(retry_delay);
        let response = self.pipeline.execute(request).await?;
        debug!(username, "login successful");
        response.parse()
    }

    /// End the server session.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        self.pipeline.execute(RestRequest::post(LOGOUT_URL)).await?;
        Ok(())
    }

    /// The user the current session is authenticated as.
    #[instrument(skip(self))]
    pub async fn current(&self) -> Result<User> {
        let path = format!("{BASE_URL}/current");
        let response = self.pipeline.execute(RestRequest::get(path)).await?;
        response.parse()
    }

    /// List all users.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<User>> {
        let response = self.pipeline.execute(RestRequest::get(BASE_URL)).await?;
        response.parse()
    }

    /// Fetch a user by username.
    #[instrument(skip(self))]
    pub async fn get(&self, username: &str) -> Result<User> {
        let path = format!("{BASE_URL}/{}", encode_path_segment(username));
        let response = self.pipeline.execute(RestRequest::get(path)).await?;
        response.parse()
    }

    /// Create a new user.
    #[instrument(skip(self, user), fields(username = %user.username))]
    pub async fn create(&self, user: &User) -> Result<User> {
        let request = RestRequest::post(BASE_URL).json_body(user)?;
        let response = self.pipeline.execute(request).await?;
        response.parse()
    }

    /// Update an existing user identified by `username`.
    #[instrument(skip(self, user))]
    pub async fn update(&self, username: &str, user: &User) -> Result<User> {
        let path = format!("{BASE_URL}/{}", encode_path_segment(username));
        let request = RestRequest::put(path).json_body(user)?;
        let response = self.pipeline.execute(request).await?;
        response.parse()
    }

    /// Delete a user; returns the deleted representation.
    #[instrument(skip(self))]
    pub async fn delete(&self, username: &str) -> Result<User> {
        let path = format!("{BASE_URL}/{}", encode_path_segment(username));
        let response = self.pipeline.execute(RestRequest::delete(path)).await?;
        response.parse()
    }
}
