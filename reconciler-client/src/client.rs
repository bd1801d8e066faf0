//! Reconciler API Client

use crate::config::Config;
use crate::error::{ReconcilerError, Result};
use crate::model::{Cluster, State, StatusChange};
use crate::reconciler::Reconciler;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

/// Client for the reconciler HTTP API.
///
/// Every operation is exactly one request/response exchange. There are no
/// retries and no caching; polling and backoff belong to the caller. The
/// client holds no mutable state, so clones can be shared freely across
/// tasks.
#[derive(Clone, Debug)]
pub struct ReconcilerClient {
    http: reqwest::Client,
    config: Config,
}

impl ReconcilerClient {
    /// Create a client on top of a caller-provided transport.
    pub fn new(http: reqwest::Client, config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register a desired cluster configuration, creating a new
    /// reconciliation job.
    #[tracing::instrument(
        name = "apply_cluster_config",
        skip_all,
        fields(client = "reconciler", cluster = %cluster.cluster)
    )]
    pub async fn apply_cluster_config(&self, cluster: &Cluster) -> Result<State> {
        let state: State = self.post(&clusters_path(), cluster).await?;
        debug!(
            configuration_version = state.configuration_version,
            status = %state.status,
            "cluster configuration applied"
        );
        Ok(state)
    }

    /// Request deletion of a cluster's reconciliation state.
    #[tracing::instrument(name = "delete_cluster", skip(self), fields(client = "reconciler"))]
    pub async fn delete_cluster(&self, cluster_id: &str) -> Result<()> {
        self.delete(&cluster_path(cluster_id)).await?;
        debug!("cluster deletion requested");
        Ok(())
    }

    /// Status of one specific configuration version.
    #[tracing::instrument(name = "get_cluster", skip(self), fields(client = "reconciler"))]
    pub async fn get_cluster(&self, cluster_id: &str, config_version: i64) -> Result<State> {
        let state: State = self.get(&config_status_path(cluster_id, config_version)).await?;
        debug!(
            configuration_version = state.configuration_version,
            status = %state.status,
            "cluster status fetched"
        );
        Ok(state)
    }

    /// Status of whatever configuration version the service considers current.
    #[tracing::instrument(name = "get_latest_cluster", skip(self), fields(client = "reconciler"))]
    pub async fn get_latest_cluster(&self, cluster_id: &str) -> Result<State> {
        let state: State = self.get(&latest_status_path(cluster_id)).await?;
        debug!(
            configuration_version = state.configuration_version,
            status = %state.status,
            "latest cluster status fetched"
        );
        Ok(state)
    }

    /// Status transitions within `offset` (e.g. "1h"), most recent first.
    #[tracing::instrument(name = "get_status_change", skip(self), fields(client = "reconciler"))]
    pub async fn get_status_change(&self, cluster_id: &str, offset: &str) -> Result<Vec<StatusChange>> {
        let changes: Vec<StatusChange> = self.get(&status_changes_path(cluster_id, offset)).await?;
        debug!(count = changes.len(), "status changes fetched");
        Ok(changes)
    }

    /// Build headers for requests
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.config.base_url(), path);
        debug!(%method, %url, "sending request");

        let mut request = self.http.request(method, &url).headers(self.headers());
        if let Some(timeout) = self.config.timeout() {
            request = request.timeout(timeout);
        }
        request
    }

    /// GET request
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.request(Method::GET, path).send().await?;
        self.handle_response(response).await
    }

    /// POST request
    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<T> {
        let response = self.request(Method::POST, path).json(body).send().await?;
        self.handle_response(response).await
    }

    /// DELETE request; the body of a 2xx answer is ignored
    async fn delete(&self, path: &str) -> Result<()> {
        let response = self.request(Method::DELETE, path).send().await?;
        self.check_status(response).await.map(|_| ())
    }

    /// Fail on non-2xx, otherwise hand back the response untouched
    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        warn!(status = status.as_u16(), "reconciler returned unexpected status");
        let body = response.text().await?;
        Err(ReconcilerError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        })
    }

    /// Handle API response
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let response = self.check_status(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl Reconciler for ReconcilerClient {
    async fn apply_cluster_config(&self, cluster: &Cluster) -> Result<State> {
        ReconcilerClient::apply_cluster_config(self, cluster).await
    }

    async fn delete_cluster(&self, cluster_id: &str) -> Result<()> {
        ReconcilerClient::delete_cluster(self, cluster_id).await
    }

    async fn get_cluster(&self, cluster_id: &str, config_version: i64) -> Result<State> {
        ReconcilerClient::get_cluster(self, cluster_id, config_version).await
    }

    async fn get_latest_cluster(&self, cluster_id: &str) -> Result<State> {
        ReconcilerClient::get_latest_cluster(self, cluster_id).await
    }

    async fn get_status_change(&self, cluster_id: &str, offset: &str) -> Result<Vec<StatusChange>> {
        ReconcilerClient::get_status_change(self, cluster_id, offset).await
    }
}

// ============================================================================
// Paths
// ============================================================================

fn clusters_path() -> String {
    "/v1/clusters".to_string()
}

fn cluster_path(cluster_id: &str) -> String {
    format!("/v1/clusters/{}", urlencoding::encode(cluster_id))
}

fn config_status_path(cluster_id: &str, config_version: i64) -> String {
    format!("{}/configs/{}/status", cluster_path(cluster_id), config_version)
}

fn latest_status_path(cluster_id: &str) -> String {
    format!("{}/status", cluster_path(cluster_id))
}

fn status_changes_path(cluster_id: &str, offset: &str) -> String {
    format!(
        "{}/statusChanges/{}",
        cluster_path(cluster_id),
        urlencoding::encode(offset)
    )
}

/// Status URL of a configuration version, in the form the service hands out
pub fn status_url(base_url: &str, cluster_id: &str, config_version: i64) -> String {
    format!(
        "{}{}",
        base_url.trim_end_matches('/'),
        config_status_path(cluster_id, config_version)
    )
}
