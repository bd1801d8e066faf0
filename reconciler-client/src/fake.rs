//! In-memory reconciler for tests of code that depends on [`Reconciler`]

use crate::client::status_url;
use crate::duration::format_go_duration;
use crate::error::{ReconcilerError, Result};
use crate::model::{Cluster, State, StatusChange};
use crate::reconciler::Reconciler;
use crate::status::ReconciliationStatus;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

const DEFAULT_BASE_URL: &str = "http://reconciler.fake:8080";

#[derive(Debug)]
struct Entry {
    cluster: Cluster,
    states: Vec<State>,
    /// Oldest first; reversed when served
    changes: Vec<StatusChange>,
    since: Instant,
}

/// Fake reconciler keeping registrations in memory.
///
/// Behaves like the service for the parts callers rely on: configuration
/// versions increase per cluster, new submissions start as
/// `reconcile_pending`, and unknown clusters answer with a 404.
#[derive(Debug)]
pub struct FakeReconcilerClient {
    base_url: String,
    clusters: RwLock<HashMap<String, Entry>>,
}

impl Default for FakeReconcilerClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeReconcilerClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            clusters: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Entry>> {
        self.clusters.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Entry>> {
        self.clusters.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Move the latest configuration of a cluster to `status`
    pub fn change_status(
        &self,
        cluster_id: &str,
        status: impl Into<ReconciliationStatus>,
    ) -> Result<State> {
        let mut clusters = self.write();
        let entry = clusters.get_mut(cluster_id).ok_or_else(|| not_found(cluster_id))?;
        let status = status.into();

        close_current(entry);
        entry.changes.push(StatusChange {
            status: Some(status.clone()),
            duration: "0s".to_string(),
        });

        let latest = entry.states.last_mut().ok_or_else(|| not_found(cluster_id))?;
        latest.status = status;
        Ok(latest.clone())
    }

    pub fn is_registered(&self, cluster_id: &str) -> bool {
        self.read().contains_key(cluster_id)
    }

    /// Last cluster payload submitted for `cluster_id`
    pub fn last_cluster(&self, cluster_id: &str) -> Option<Cluster> {
        self.read().get(cluster_id).map(|e| e.cluster.clone())
    }
}

/// Record the time spent in the current status on its history entry
fn close_current(entry: &mut Entry) {
    let elapsed = entry.since.elapsed();
    if let Some(current) = entry.changes.last_mut() {
        current.duration = format_go_duration(elapsed);
    }
    entry.since = Instant::now();
}

fn not_found(cluster_id: &str) -> ReconcilerError {
    ReconcilerError::UnexpectedStatus {
        status: 404,
        body: format!("cluster '{}' not found", cluster_id),
    }
}

#[async_trait]
impl Reconciler for FakeReconcilerClient {
    async fn apply_cluster_config(&self, cluster: &Cluster) -> Result<State> {
        let mut clusters = self.write();
        let entry = clusters
            .entry(cluster.cluster.clone())
            .or_insert_with(|| Entry {
                cluster: cluster.clone(),
                states: Vec::new(),
                changes: Vec::new(),
                since: Instant::now(),
            });

        let version = entry.states.last().map_or(1, |s| s.configuration_version + 1);
        let state = State {
            cluster: cluster.cluster.clone(),
            cluster_version: entry.states.len() as i64 + 1,
            configuration_version: version,
            status: ReconciliationStatus::ReconcilePending,
            status_url: status_url(&self.base_url, &cluster.cluster, version),
        };

        close_current(entry);
        entry.changes.push(StatusChange {
            status: Some(ReconciliationStatus::ReconcilePending),
            duration: "0s".to_string(),
        });
        entry.cluster = cluster.clone();
        entry.states.push(state.clone());

        Ok(state)
    }

    async fn delete_cluster(&self, cluster_id: &str) -> Result<()> {
        self.write()
            .remove(cluster_id)
            .map(|_| ())
            .ok_or_else(|| not_found(cluster_id))
    }

    async fn get_cluster(&self, cluster_id: &str, config_version: i64) -> Result<State> {
        self.read()
            .get(cluster_id)
            .and_then(|e| {
                e.states
                    .iter()
                    .find(|s| s.configuration_version == config_version)
                    .cloned()
            })
            .ok_or_else(|| not_found(cluster_id))
    }

    async fn get_latest_cluster(&self, cluster_id: &str) -> Result<State> {
        self.read()
            .get(cluster_id)
            .and_then(|e| e.states.last().cloned())
            .ok_or_else(|| not_found(cluster_id))
    }

    async fn get_status_change(&self, cluster_id: &str, _offset: &str) -> Result<Vec<StatusChange>> {
        let clusters = self.read();
        let entry = clusters.get(cluster_id).ok_or_else(|| not_found(cluster_id))?;
        Ok(entry.changes.iter().rev().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster(id: &str) -> Cluster {
        Cluster {
            cluster: id.to_string(),
            kubeconfig: "fake kubeconfig".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_apply_assigns_increasing_versions() {
        let fake = FakeReconcilerClient::new();

        let first = fake.apply_cluster_config(&cluster("1")).await.unwrap();
        let second = fake.apply_cluster_config(&cluster("1")).await.unwrap();
        let other = fake.apply_cluster_config(&cluster("2")).await.unwrap();

        assert_eq!(first.configuration_version, 1);
        assert_eq!(second.configuration_version, 2);
        assert_eq!(second.cluster_version, 2);
        assert_eq!(other.configuration_version, 1);
        assert_eq!(first.status, ReconciliationStatus::ReconcilePending);
        assert_eq!(
            first.status_url,
            "http://reconciler.fake:8080/v1/clusters/1/configs/1/status"
        );
    }

    #[tokio::test]
    async fn test_get_cluster_by_version_and_latest() {
        let fake = FakeReconcilerClient::new();
        fake.apply_cluster_config(&cluster("1")).await.unwrap();
        fake.apply_cluster_config(&cluster("1")).await.unwrap();
        fake.change_status("1", ReconciliationStatus::Ready).unwrap();

        let v1 = fake.get_cluster("1", 1).await.unwrap();
        assert_eq!(v1.status, ReconciliationStatus::ReconcilePending);

        let latest = fake.get_latest_cluster("1").await.unwrap();
        assert_eq!(latest.configuration_version, 2);
        assert_eq!(latest.status, ReconciliationStatus::Ready);

        let missing = fake.get_cluster("1", 3).await.unwrap_err();
        assert!(missing.is_not_found());
    }

    #[tokio::test]
    async fn test_status_changes_most_recent_first() {
        let fake = FakeReconcilerClient::new();
        fake.apply_cluster_config(&cluster("1")).await.unwrap();
        fake.change_status("1", "reconciling").unwrap();
        fake.change_status("1", "ready").unwrap();

        let changes = fake.get_status_change("1", "1h").await.unwrap();
        let statuses: Vec<_> = changes
            .iter()
            .map(|c| c.status.clone().unwrap().to_string())
            .collect();
        assert_eq!(statuses, vec!["ready", "reconciling", "reconcile_pending"]);
        assert!(changes.iter().all(|c| c.parsed_duration().is_ok()));
    }

    #[tokio::test]
    async fn test_delete() {
        let fake = FakeReconcilerClient::new();
        fake.apply_cluster_config(&cluster("1")).await.unwrap();
        assert!(fake.is_registered("1"));

        fake.delete_cluster("1").await.unwrap();
        assert!(!fake.is_registered("1"));
        assert!(fake.get_latest_cluster("1").await.unwrap_err().is_not_found());
        assert!(fake.delete_cluster("1").await.unwrap_err().is_not_found());
    }

    #[test]
    fn test_change_status_unknown_cluster() {
        let fake = FakeReconcilerClient::new();
        assert!(fake.change_status("nope", "ready").unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_last_cluster_tracks_latest_payload() {
        let fake = FakeReconcilerClient::new();
        let mut payload = cluster("1");
        fake.apply_cluster_config(&payload).await.unwrap();
        payload.kyma_config.version = "2.1.0".to_string();
        fake.apply_cluster_config(&payload).await.unwrap();

        assert_eq!(fake.last_cluster("1").unwrap().kyma_config.version, "2.1.0");
        assert!(fake.last_cluster("2").is_none());
    }
}
