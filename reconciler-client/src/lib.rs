//! Client for the cluster reconciler HTTP API
//!
//! Registers desired cluster configurations, reads reconciliation status
//! (latest or at a given configuration version), fetches the history of
//! status transitions and requests deletion of a cluster's reconciliation
//! state. Each call is a single HTTP exchange; polling and retries are left
//! to the caller.
//!
//! ```no_run
//! use reconciler_client::{Config, ReconcilerClient};
//!
//! # async fn run() -> reconciler_client::Result<()> {
//! let client = ReconcilerClient::new(reqwest::Client::new(), Config::new("http://reconciler:8080"))?;
//! let state = client.get_latest_cluster("my-cluster").await?;
//! println!("{} at version {}", state.status, state.configuration_version);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod duration;
pub mod error;
pub mod fake;
pub mod model;
pub mod reconciler;
pub mod status;

pub use client::ReconcilerClient;
pub use config::Config;
pub use duration::{format_go_duration, parse_go_duration, DurationParseError};
pub use error::{ReconcilerError, Result};
pub use fake::FakeReconcilerClient;
pub use model::{Cluster, Component, Configuration, KymaConfig, Metadata, RuntimeInput, State, StatusChange};
pub use reconciler::Reconciler;
pub use status::ReconciliationStatus;
