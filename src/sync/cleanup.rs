// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cleanup of managed secrets whose user cluster has disappeared.
//!
//! Two independently enabled modes: immediate removal when the owning
//! seed is reachable and confirms the cluster is gone, and timeout-based
//! removal when the seed itself is unreachable. The timeout state lives
//! on the secret (the `timeout-start` label), never in process memory.

use crate::argo::ArgoConnector;
use crate::config::Config;
use crate::constants::labels;
use crate::error::Result;
use crate::kkp::UserCluster;
use k8s_openapi::api::core::v1::Secret;
use kube::ResourceExt;
use std::collections::HashSet;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{info, instrument, warn};

/// Per-cycle cleanup counters
#[derive(Debug, Default, Clone, Copy)]
pub struct CleanupOutcome {
    /// Secrets deleted (both modes)
    pub deleted: usize,
    /// Secrets freshly stamped with a timeout marker
    pub marked: usize,
    /// Secrets skipped as invalid or with an unparseable marker
    pub skipped: usize,
}

/// State of one managed secret, re-derived every cycle.
/// Variants are checked in priority order; the first match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Missing an identity label; foreign or corrupt, never touched
    Invalid { reason: &'static str },
    /// Its cluster was discovered this cycle
    Live,
    /// Seed reachable, cluster gone: upstream deletion is confirmed
    ConfirmedOrphan,
    /// Seed unreachable, no timeout marker yet
    TimeoutNotStarted,
    /// Seed unreachable, marker set, grace period still running
    TimeoutPending { since_millis: i64 },
    /// Seed unreachable, grace period elapsed
    TimeoutExpired { since_millis: i64 },
    /// Timeout marker exists but is not a unix-millis integer
    MarkerUnparseable,
}

/// Classify one managed secret against this cycle's snapshot.
///
/// The confirmed-absence check deliberately precedes the timeout check: a
/// seed flapping between reachable and unreachable must not restart the
/// timeout clock.
pub fn classify(
    secret: &Secret,
    live_cluster_ids: &HashSet<String>,
    reachable_seeds: &HashSet<String>,
    now_millis: i64,
    timeout: Duration,
) -> Classification {
    let secret_labels = secret.metadata.labels.clone().unwrap_or_default();

    let Some(cluster_id) = secret_labels.get(labels::CLUSTER_ID) else {
        return Classification::Invalid {
            reason: "missing cluster-id label",
        };
    };
    let Some(seed) = secret_labels.get(labels::SEED) else {
        return Classification::Invalid {
            reason: "missing seed label",
        };
    };

    if live_cluster_ids.contains(cluster_id) {
        return Classification::Live;
    }

    if reachable_seeds.contains(seed) {
        return Classification::ConfirmedOrphan;
    }

    match secret_labels.get(labels::TIMEOUT_START) {
        None => Classification::TimeoutNotStarted,
        Some(raw) => match raw.parse::<i64>() {
            Err(_) => Classification::MarkerUnparseable,
            Ok(since_millis) => {
                if now_millis - since_millis >= timeout.as_millis() as i64 {
                    Classification::TimeoutExpired { since_millis }
                } else {
                    Classification::TimeoutPending { since_millis }
                }
            }
        },
    }
}

/// Run cleanup for one cycle. A failed delete or update is logged and the
/// secret is retried next cycle from its persisted state.
#[instrument(skip_all)]
pub async fn run_cleanup(
    argo: &ArgoConnector,
    config: &Config,
    clusters: &[UserCluster],
    reachable_seeds: &[String],
    now_millis: i64,
) -> Result<CleanupOutcome> {
    let mut outcome = CleanupOutcome::default();
    if !config.cleanup_enabled() {
        return Ok(outcome);
    }

    let live_ids: HashSet<String> = clusters.iter().map(|c| c.id.clone()).collect();
    let reachable: HashSet<String> = reachable_seeds.iter().cloned().collect();

    for secret in argo.managed_secrets().await? {
        let name = secret.name_any();
        match classify(
            &secret,
            &live_ids,
            &reachable,
            now_millis,
            config.cluster_timeout,
        ) {
            Classification::Invalid { reason } => {
                warn!("Ignoring invalid managed secret {} ({})", name, reason);
                outcome.skipped += 1;
            }
            Classification::Live => {}
            Classification::ConfirmedOrphan => {
                if config.cleanup_removed_clusters {
                    info!("Deleting secret {} for removed cluster", name);
                    match argo.delete_secret(&name).await {
                        Ok(()) => outcome.deleted += 1,
                        Err(e) => warn!("Failed to delete secret {}: {}", name, e),
                    }
                }
            }
            Classification::TimeoutNotStarted => {
                if config.cleanup_timed_clusters {
                    info!(
                        "Seed unreachable, starting removal timeout for secret {}",
                        name
                    );
                    match argo
                        .replace_secret(&name, &with_timeout_marker(&secret, now_millis))
                        .await
                    {
                        Ok(()) => outcome.marked += 1,
                        Err(e) => warn!("Failed to stamp timeout on secret {}: {}", name, e),
                    }
                }
            }
            Classification::TimeoutPending { .. } => {}
            Classification::TimeoutExpired { since_millis } => {
                if config.cleanup_timed_clusters {
                    info!(
                        "Deleting secret {} whose seed has been unreachable since {}",
                        name, since_millis
                    );
                    match argo.delete_secret(&name).await {
                        Ok(()) => outcome.deleted += 1,
                        Err(e) => warn!("Failed to delete secret {}: {}", name, e),
                    }
                }
            }
            Classification::MarkerUnparseable => {
                warn!("Secret {} has an unparseable timeout marker", name);
                outcome.skipped += 1;
            }
        }
    }

    Ok(outcome)
}

fn with_timeout_marker(secret: &Secret, now_millis: i64) -> Secret {
    let mut stamped = secret.clone();
    stamped
        .metadata
        .labels
        .get_or_insert_with(Default::default)
        .insert(labels::TIMEOUT_START.to_string(), now_millis.to_string());
    stamped
}

/// Current wall clock as unix milliseconds, the persisted marker format
pub fn unix_millis_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
