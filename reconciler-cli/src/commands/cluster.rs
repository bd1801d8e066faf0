use crate::output::{self, OutputFormat};
use anyhow::{Context, Result};
use reconciler_client::{
    format_go_duration, Cluster, ReconcilerClient, State, StatusChange,
};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tabled::Tabled;

#[derive(Tabled, Serialize)]
struct StateRow {
    #[tabled(rename = "CLUSTER")]
    cluster: String,
    #[tabled(rename = "CLUSTER VERSION")]
    cluster_version: i64,
    #[tabled(rename = "CONFIG VERSION")]
    configuration_version: i64,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "STATUS URL")]
    status_url: String,
}

impl From<&State> for StateRow {
    fn from(s: &State) -> Self {
        Self {
            cluster: s.cluster.clone(),
            cluster_version: s.cluster_version,
            configuration_version: s.configuration_version,
            status: s.status.to_string(),
            status_url: output::truncate(&s.status_url, 60),
        }
    }
}

#[derive(Tabled, Serialize)]
struct StatusChangeRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "DURATION")]
    duration: String,
}

/// Read a cluster definition from a JSON or YAML file
pub fn load_cluster(path: &Path) -> Result<Cluster> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );

    let cluster = if is_yaml {
        serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse {} as YAML", path.display()))?
    } else {
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse {} as JSON", path.display()))?
    };

    Ok(cluster)
}

fn print_state(state: &State, format: OutputFormat) -> Result<()> {
    output::print_output(vec![StateRow::from(state)], state, format)?;
    if format == OutputFormat::Table {
        output::print_info(&format!(
            "cluster '{}' is {}",
            state.cluster,
            output::colorize_status(&state.status)
        ));
    }
    Ok(())
}

pub async fn handle_apply(client: &ReconcilerClient, file: &Path, format: OutputFormat) -> Result<()> {
    let cluster = load_cluster(file)?;
    tracing::info!(cluster = %cluster.cluster, file = %file.display(), "applying cluster configuration");

    let state = client
        .apply_cluster_config(&cluster)
        .await
        .with_context(|| format!("failed to apply configuration of cluster '{}'", cluster.cluster))?;

    if format == OutputFormat::Table {
        output::print_success(&format!(
            "Configuration version {} registered for cluster '{}'",
            state.configuration_version, state.cluster
        ));
    }
    print_state(&state, format)
}

pub async fn handle_delete(client: &ReconcilerClient, cluster_id: &str) -> Result<()> {
    client
        .delete_cluster(cluster_id)
        .await
        .with_context(|| format!("failed to delete cluster '{}'", cluster_id))?;
    output::print_deleted("Cluster", cluster_id);
    Ok(())
}

pub async fn handle_status(
    client: &ReconcilerClient,
    cluster_id: &str,
    config_version: Option<i64>,
    format: OutputFormat,
) -> Result<()> {
    let state = match config_version {
        Some(version) => client.get_cluster(cluster_id, version).await.with_context(|| {
            format!("failed to get cluster '{}' at configuration version {}", cluster_id, version)
        })?,
        None => client
            .get_latest_cluster(cluster_id)
            .await
            .with_context(|| format!("failed to get status of cluster '{}'", cluster_id))?,
    };

    print_state(&state, format)
}

/// Sum of the parsable durations and the number of entries that did not parse
fn total_duration(changes: &[StatusChange]) -> (Duration, usize) {
    changes.iter().fold((Duration::ZERO, 0), |(total, bad), change| {
        match change.parsed_duration() {
            Ok(d) => (total + d, bad),
            Err(_) => (total, bad + 1),
        }
    })
}

pub async fn handle_history(
    client: &ReconcilerClient,
    cluster_id: &str,
    offset: &str,
    format: OutputFormat,
) -> Result<()> {
    let changes = client
        .get_status_change(cluster_id, offset)
        .await
        .with_context(|| format!("failed to get status changes of cluster '{}'", cluster_id))?;

    let rows: Vec<StatusChangeRow> = changes
        .iter()
        .enumerate()
        .map(|(i, change)| StatusChangeRow {
            position: i + 1,
            status: change
                .status
                .as_ref()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            duration: change.duration.clone(),
        })
        .collect();

    output::print_output(rows, &changes, format)?;

    if format == OutputFormat::Table && !changes.is_empty() {
        let (total, unparsable) = total_duration(&changes);
        output::print_info(&format!(
            "{} transitions in the last {}, {} accounted for",
            changes.len(),
            offset,
            format_go_duration(total)
        ));
        if unparsable > 0 {
            output::print_warning(&format!("{} entries had an unreadable duration", unparsable));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconciler_client::ReconciliationStatus;
    use std::io::Write;

    const CLUSTER_JSON: &str = r#"{
        "cluster": "c-1",
        "runtimeInput": {"name": "runtime"},
        "kymaConfig": {"version": "2.0.0", "profile": "evaluation"},
        "metadata": {"globalAccountID": "ga-1"},
        "kubeconfig": "fake kubeconfig"
    }"#;

    const CLUSTER_YAML: &str = "cluster: c-1
runtimeInput:
  name: runtime
kymaConfig:
  version: 2.0.0
  profile: evaluation
metadata:
  globalAccountID: ga-1
kubeconfig: fake kubeconfig
";

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_cluster_json_and_yaml() {
        let dir = tempfile::tempdir().unwrap();

        let from_json = load_cluster(&write_file(&dir, "cluster.json", CLUSTER_JSON)).unwrap();
        let from_yaml = load_cluster(&write_file(&dir, "cluster.yaml", CLUSTER_YAML)).unwrap();

        assert_eq!(from_json.cluster, "c-1");
        assert_eq!(from_json.metadata.global_account_id, "ga-1");
        assert_eq!(from_json, from_yaml);
    }

    #[test]
    fn test_load_cluster_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "cluster.json", "{not json");
        assert!(load_cluster(&path).is_err());
        assert!(load_cluster(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_total_duration_skips_unparsable() {
        let changes = vec![
            StatusChange {
                status: Some(ReconciliationStatus::Ready),
                duration: "40s".to_string(),
            },
            StatusChange {
                status: None,
                duration: "1m".to_string(),
            },
            StatusChange {
                status: Some(ReconciliationStatus::Reconciling),
                duration: "soon".to_string(),
            },
        ];

        assert_eq!(total_duration(&changes), (Duration::from_secs(100), 1));
    }
}
