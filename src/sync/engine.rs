// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The periodic reconciliation loop: snapshot the KKP side, synthesize
//! secrets, then run cleanup against the same snapshot.

use crate::argo::ArgoConnector;
use crate::config::Config;
use crate::error::Result;
use crate::kkp::{KkpConnector, UserCluster};
use crate::sync::cleanup::{self, CleanupOutcome};
use crate::sync::synthesis;
use crate::template::Renderer;
use std::time::Instant;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{error, info, warn};

/// Counters of one sync cycle, logged at cycle end
#[derive(Debug, Default, Clone, Copy)]
pub struct CycleSummary {
    pub clusters: usize,
    pub reachable_seeds: usize,
    pub reconciled: usize,
    pub failed: usize,
    pub cleanup: CleanupOutcome,
}

pub struct Bridge {
    config: Config,
    kkp: KkpConnector,
    argo: ArgoConnector,
    renderer: Renderer,
}

impl Bridge {
    pub fn new(config: Config, kkp: KkpConnector, argo: ArgoConnector, renderer: Renderer) -> Self {
        Self {
            config,
            kkp,
            argo,
            renderer,
        }
    }

    /// Run sync cycles until the shutdown flag flips. The in-flight cycle
    /// always completes; only the sleep between cycles is interrupted.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        info!(
            "Bridge started, syncing every {:?}",
            self.config.sync_interval
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let started = Instant::now();
            match self.sync_once().await {
                Ok(summary) => info!(
                    "Sync cycle took {:?}: {} clusters on {} reachable seeds, {} reconciled, {} failed, {} deleted, {} pending timeout",
                    started.elapsed(),
                    summary.clusters,
                    summary.reachable_seeds,
                    summary.reconciled,
                    summary.failed,
                    summary.cleanup.deleted,
                    summary.cleanup.marked,
                ),
                Err(e) => error!("Sync cycle failed: {}", e),
            }

            let remaining = self.config.sync_interval.saturating_sub(started.elapsed());
            tokio::select! {
                _ = sleep(remaining) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Bridge stopped");
        Ok(())
    }

    /// One full cycle: discovery, synthesis for every cluster, cleanup.
    /// Synthesis always runs before cleanup, so a cluster discovered this
    /// cycle can never be cleaned up in the same cycle.
    pub async fn sync_once(&self) -> Result<CycleSummary> {
        let projects = self.kkp.get_projects().await?;
        let seeds = self.kkp.get_seeds().await?;

        let mut clusters: Vec<UserCluster> = Vec::new();
        let mut reachable_seeds: Vec<String> = Vec::new();
        for seed in &seeds {
            match seed.get_user_clusters().await {
                Ok(found) => {
                    reachable_seeds.push(seed.name().to_string());
                    clusters.extend(found);
                }
                Err(e) => {
                    warn!(
                        "Failed to list user clusters on seed {}: {}",
                        seed.name(),
                        e
                    );
                }
            }
        }

        info!(
            "Discovered {} user clusters across {} reachable seeds",
            clusters.len(),
            reachable_seeds.len()
        );

        let outcome = synthesis::store_clusters(
            &self.argo,
            &self.renderer,
            &clusters,
            &projects,
            self.config.kkp_cluster_name.as_deref(),
        )
        .await;

        let cleanup_outcome = cleanup::run_cleanup(
            &self.argo,
            &self.config,
            &clusters,
            &reachable_seeds,
            cleanup::unix_millis_now(),
        )
        .await?;

        Ok(CycleSummary {
            clusters: clusters.len(),
            reachable_seeds: reachable_seeds.len(),
            reconciled: outcome.reconciled,
            failed: outcome.failed,
            cleanup: cleanup_outcome,
        })
    }
}
