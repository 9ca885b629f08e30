// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{bail, Result};
use std::env;
use std::time::Duration;

/// Bridge configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the kubeconfig for the KKP master cluster. In-cluster
    /// service account when unset.
    pub kkp_kubeconfig: Option<String>,
    /// Path to the kubeconfig for the Argo CD cluster. Falls back to the
    /// KKP side when unset.
    pub argo_kubeconfig: Option<String>,
    /// Namespace holding the Argo CD cluster secrets.
    pub argo_namespace: String,
    /// Interval between two sync cycles.
    pub sync_interval: Duration,
    /// Path to a cluster secret template overriding the built-in one.
    pub cluster_secret_template: Option<String>,
    /// Delete secrets whose cluster is gone while its seed is reachable.
    pub cleanup_removed_clusters: bool,
    /// Delete secrets orphaned by an unreachable seed after the timeout.
    pub cleanup_timed_clusters: bool,
    /// Grace period before an unreachable seed's secrets are deleted.
    pub cluster_timeout: Duration,
    /// Discriminator added to secrets when several KKP installations share
    /// one Argo CD namespace.
    pub kkp_cluster_name: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            kkp_kubeconfig: env::var("KKP_KUBECONFIG").ok().filter(|v| !v.is_empty()),
            argo_kubeconfig: env::var("ARGO_KUBECONFIG").ok().filter(|v| !v.is_empty()),
            argo_namespace: env::var("ARGO_NAMESPACE").unwrap_or_else(|_| "argocd".to_string()),
            sync_interval: parse_secs(env::var("SYNC_INTERVAL_SECS").ok().as_deref(), 60)?,
            cluster_secret_template: env::var("CLUSTER_SECRET_TEMPLATE")
                .ok()
                .filter(|v| !v.is_empty()),
            cleanup_removed_clusters: parse_bool(
                env::var("CLEANUP_REMOVED_CLUSTERS").ok().as_deref(),
            )?,
            cleanup_timed_clusters: parse_bool(env::var("CLEANUP_TIMED_CLUSTERS").ok().as_deref())?,
            cluster_timeout: parse_secs(env::var("CLUSTER_TIMEOUT_SECS").ok().as_deref(), 30)?,
            kkp_cluster_name: env::var("KKP_CLUSTER_NAME").ok().filter(|v| !v.is_empty()),
        })
    }

    /// True when at least one cleanup mode is enabled.
    pub fn cleanup_enabled(&self) -> bool {
        self.cleanup_removed_clusters || self.cleanup_timed_clusters
    }
}

fn parse_secs(value: Option<&str>, default_secs: u64) -> Result<Duration> {
    match value {
        None | Some("") => Ok(Duration::from_secs(default_secs)),
        Some(v) => match v.parse::<u64>() {
            Ok(secs) => Ok(Duration::from_secs(secs)),
            Err(_) => bail!("Invalid duration '{}', expected seconds as an integer", v),
        },
    }
}

fn parse_bool(value: Option<&str>) -> Result<bool> {
    match value {
        None | Some("") => Ok(false),
        Some(v) => match v.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => bail!("Invalid boolean '{}'", other),
        },
    }
}
