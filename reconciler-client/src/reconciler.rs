//! Reconciler trait

use crate::error::Result;
use crate::model::{Cluster, State, StatusChange};
use async_trait::async_trait;

/// Operations offered by the reconciler service.
///
/// Provisioning steps depend on this trait rather than on the HTTP client so
/// they can run against [`crate::FakeReconcilerClient`] in tests.
#[async_trait]
pub trait Reconciler: Send + Sync {
    /// Register a desired cluster configuration
    async fn apply_cluster_config(&self, cluster: &Cluster) -> Result<State>;

    /// Delete a cluster's reconciliation state
    async fn delete_cluster(&self, cluster_id: &str) -> Result<()>;

    /// Status at a specific configuration version
    async fn get_cluster(&self, cluster_id: &str, config_version: i64) -> Result<State>;

    /// Status at the latest configuration version
    async fn get_latest_cluster(&self, cluster_id: &str) -> Result<State>;

    /// Status transitions within the given offset, most recent first
    async fn get_status_change(&self, cluster_id: &str, offset: &str) -> Result<Vec<StatusChange>>;
}
