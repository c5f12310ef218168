//! HTTP client for the Pure research-information API.
//!
//! The [`PublicationApi`] trait is the seam between the pipelines and the
//! network: real runs use [`PureClient`], tests plug in a `mockall` mock.

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error};

use crate::config::Config;
use crate::publication::{OutputDetails, OutputsPage, ProjectOutputs};

#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure or undecodable response body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("GET {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// A details lookup for one Pure ID returned zero or several records.
    #[error("unexpected publication details for Pure ID {pure_id}: count {count}")]
    UnexpectedCount { pure_id: String, count: u64 },
}

/// Read access to the Pure API, reduced to the two queries the fetch
/// pipeline needs.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait PublicationApi: Send + Sync {
    /// Pure IDs of all outputs registered for the project.
    async fn project_outputs(&self, project_id: &str) -> Result<Vec<String>, ApiError>;

    /// Raw publication details for a single Pure ID.
    async fn output_details(&self, pure_id: &str) -> Result<OutputDetails, ApiError>;
}

/// Concrete client over reqwest. Requires network reachability to the
/// configured base URL (institutional perimeter, typically via VPN).
pub struct PureClient {
    http: reqwest::Client,
    base_url: String,
}

impl PureClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        debug!(url = url, "GET Pure API");
        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            error!(
                status = status.as_u16(),
                url = url,
                "GET did not succeed"
            );
            return Err(ApiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl PublicationApi for PureClient {
    async fn project_outputs(&self, project_id: &str) -> Result<Vec<String>, ApiError> {
        let url = format!("{}/project/{}", self.base_url, project_id);
        let project: ProjectOutputs = self.get_json(&url).await?;
        Ok(project
            .outputs
            .into_iter()
            .map(|output| output.pure_id)
            .collect())
    }

    async fn output_details(&self, pure_id: &str) -> Result<OutputDetails, ApiError> {
        let url = format!(
            "{}/outputs?limit=1&offset=0&guids={}",
            self.base_url, pure_id
        );
        let mut page: OutputsPage = self.get_json(&url).await?;
        if page.count != 1 || page.publications.len() != 1 {
            error!(
                pure_id = pure_id,
                count = page.count,
                "Unexpected publication details"
            );
            return Err(ApiError::UnexpectedCount {
                pure_id: pure_id.to_string(),
                count: page.count,
            });
        }
        Ok(page.publications.remove(0))
    }
}
