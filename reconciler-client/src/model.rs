//! Wire types exchanged with the reconciler service

use crate::duration::{parse_go_duration, DurationParseError};
use crate::status::ReconciliationStatus;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Desired state of a cluster submitted for reconciliation
#[derive(Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    /// External identifier the service groups reconciliation jobs by
    pub cluster: String,
    pub runtime_input: RuntimeInput,
    pub kyma_config: KymaConfig,
    pub metadata: Metadata,
    /// Credentials for the target cluster, passed through untouched
    pub kubeconfig: String,
}

// kubeconfig carries credentials
impl fmt::Debug for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cluster")
            .field("cluster", &self.cluster)
            .field("runtime_input", &self.runtime_input)
            .field("kyma_config", &self.kyma_config)
            .field("metadata", &self.metadata)
            .field("kubeconfig", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RuntimeInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KymaConfig {
    pub version: String,
    pub profile: String,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub administrators: Vec<String>,
}

/// Component to install, with its overrides
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Component {
    #[serde(rename = "URL", default)]
    pub url: String,
    pub component: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub configuration: Vec<Configuration>,
}

/// Single override entry; `value` is any JSON value
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub key: String,
    pub value: serde_json::Value,
    #[serde(default)]
    pub secret: bool,
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Configuration");
        s.field("key", &self.key);
        if self.secret {
            s.field("value", &"<redacted>");
        } else {
            s.field("value", &self.value);
        }
        s.field("secret", &self.secret).finish()
    }
}

/// Ownership identifiers of the runtime
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(rename = "globalAccountID")]
    pub global_account_id: String,
    #[serde(rename = "subAccountID", default)]
    pub sub_account_id: String,
    #[serde(rename = "serviceID", default)]
    pub service_id: String,
    #[serde(rename = "servicePlanID", default)]
    pub service_plan_id: String,
    #[serde(rename = "shootName", default)]
    pub shoot_name: String,
    #[serde(rename = "instanceID", default)]
    pub instance_id: String,
}

/// Status of a cluster at one configuration version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    pub cluster: String,
    /// Desired-state revision, assigned by the caller
    pub cluster_version: i64,
    /// Reconciliation attempt, assigned by the service
    pub configuration_version: i64,
    pub status: ReconciliationStatus,
    /// Absolute link for polling this exact version
    #[serde(default)]
    pub status_url: String,
}

/// One entry of a cluster's status history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    /// `None` when the service did not report a status
    #[serde(default)]
    pub status: Option<ReconciliationStatus>,
    /// Time spent in `status`, e.g. "40s"
    pub duration: String,
}

impl StatusChange {
    pub fn parsed_duration(&self) -> Result<Duration, DurationParseError> {
        parse_go_duration(&self.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_state_wire_format() {
        let state: State = serde_json::from_value(json!({
            "cluster": "1",
            "clusterVersion": 1,
            "configurationVersion": 2,
            "status": "reconcile_pending",
            "statusUrl": "reconciler-url:8080/v1/clusters/1/configs/2/status"
        }))
        .unwrap();

        assert_eq!(state.cluster, "1");
        assert_eq!(state.cluster_version, 1);
        assert_eq!(state.configuration_version, 2);
        assert_eq!(state.status, ReconciliationStatus::ReconcilePending);
        assert_eq!(state.status_url, "reconciler-url:8080/v1/clusters/1/configs/2/status");
    }

    #[test]
    fn test_state_without_status_url() {
        let state: State = serde_json::from_value(json!({
            "cluster": "1",
            "clusterVersion": 1,
            "configurationVersion": 1,
            "status": "ready"
        }))
        .unwrap();
        assert_eq!(state.status_url, "");
    }

    #[test]
    fn test_status_change_null_status() {
        let changes: Vec<StatusChange> = serde_json::from_value(json!([
            {"status": null, "duration": "5s"},
            {"duration": "1s"},
            {"status": "", "duration": "2s"}
        ]))
        .unwrap();

        assert_eq!(changes[0].status, None);
        assert_eq!(changes[1].status, None);
        assert_eq!(changes[2].status, Some(ReconciliationStatus::Other(String::new())));
    }

    #[test]
    fn test_status_change_parsed_duration() {
        let change = StatusChange {
            status: Some(ReconciliationStatus::Ready),
            duration: "1m30s".to_string(),
        };
        assert_eq!(change.parsed_duration().unwrap(), Duration::from_secs(90));
    }

    #[test]
    fn test_cluster_serializes_camel_case() {
        let cluster = Cluster {
            cluster: "c-1".to_string(),
            runtime_input: RuntimeInput {
                name: "runtime".to_string(),
                description: String::new(),
            },
            kyma_config: KymaConfig {
                version: "2.0.0".to_string(),
                profile: "production".to_string(),
                components: vec![Component {
                    url: String::new(),
                    component: "istio".to_string(),
                    namespace: "istio-system".to_string(),
                    configuration: vec![Configuration {
                        key: "global.domainName".to_string(),
                        value: json!("example.com"),
                        secret: false,
                    }],
                }],
                administrators: vec!["admin@example.com".to_string()],
            },
            metadata: Metadata {
                global_account_id: "ga".to_string(),
                ..Default::default()
            },
            kubeconfig: "fake kubeconfig".to_string(),
        };

        let value = serde_json::to_value(&cluster).unwrap();
        assert_eq!(value["cluster"], "c-1");
        assert_eq!(value["runtimeInput"]["name"], "runtime");
        assert_eq!(value["kymaConfig"]["profile"], "production");
        assert_eq!(value["kymaConfig"]["components"][0]["URL"], "");
        assert_eq!(value["metadata"]["globalAccountID"], "ga");
        assert_eq!(value["kubeconfig"], "fake kubeconfig");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let cluster = Cluster {
            kubeconfig: "super-secret".to_string(),
            ..Default::default()
        };
        assert!(!format!("{:?}", cluster).contains("super-secret"));

        let entry = Configuration {
            key: "password".to_string(),
            value: json!("hunter2"),
            secret: true,
        };
        assert!(!format!("{:?}", entry).contains("hunter2"));
    }
}
