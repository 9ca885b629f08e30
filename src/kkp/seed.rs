// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Per-seed client listing KKP user clusters and their admin kubeconfigs.

use crate::constants::{ADMIN_KUBECONFIG_SECRET, KUBECONFIG_DATA_KEY};
use crate::error::{BridgeError, Result};
use crate::kubernetes::client_from_kubeconfig_bytes;
use crate::types::Cluster;
use k8s_openapi::api::core::v1::Secret;
use kube::{api::ListParams, Api, Client};
use std::collections::BTreeMap;
use tracing::{info, instrument, warn};

/// A user cluster discovered on a seed, together with everything the
/// template needs to render its Argo CD secret. Rebuilt fresh every cycle.
#[derive(Debug, Clone)]
pub struct UserCluster {
    /// Cluster ID, unique within the seed
    pub id: String,
    /// Human readable display name
    pub name: String,
    /// Name of the seed this cluster was found on
    pub seed: String,
    /// ID of the owning project, when labelled
    pub project_id: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    /// Raw admin kubeconfig for the cluster
    pub kubeconfig: Vec<u8>,
}

/// Handle to one reachable seed cluster
pub struct SeedClient {
    name: String,
    client: Client,
}

impl SeedClient {
    /// Connect to a seed from the kubeconfig stored on the KKP master
    pub async fn from_kubeconfig(name: &str, kubeconfig: &[u8]) -> Result<Self> {
        let client = client_from_kubeconfig_bytes(kubeconfig).await?;
        Ok(Self {
            name: name.to_string(),
            client,
        })
    }

    /// Build a seed handle from an existing client, used by tests
    pub fn with_client(name: &str, client: Client) -> Self {
        Self {
            name: name.to_string(),
            client,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// List the user clusters on this seed. A cluster whose admin
    /// kubeconfig cannot be fetched is logged and skipped.
    #[instrument(skip(self), fields(seed = %self.name))]
    pub async fn get_user_clusters(&self) -> Result<Vec<UserCluster>> {
        let clusters: Api<Cluster> = Api::all(self.client.clone());
        let cluster_list = clusters.list(&ListParams::default()).await?;

        let mut user_clusters = Vec::new();
        for cluster in cluster_list.items {
            let id = cluster.id();
            match self.fetch_admin_kubeconfig(&cluster).await {
                Ok(kubeconfig) => user_clusters.push(UserCluster {
                    id,
                    name: cluster.display_name().to_string(),
                    seed: self.name.clone(),
                    project_id: cluster.project_id(),
                    labels: cluster.labels_map(),
                    annotations: cluster.annotations_map(),
                    kubeconfig,
                }),
                Err(e) => {
                    warn!(
                        "Failed to get admin kubeconfig for cluster {} on seed {}: {}",
                        id, self.name, e
                    );
                }
            }
        }

        info!(
            "Found {} user clusters on seed {}",
            user_clusters.len(),
            self.name
        );
        Ok(user_clusters)
    }

    async fn fetch_admin_kubeconfig(&self, cluster: &Cluster) -> Result<Vec<u8>> {
        let namespace = cluster.control_plane_namespace();
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), &namespace);
        let secret = secrets.get(ADMIN_KUBECONFIG_SECRET).await?;

        secret
            .data
            .as_ref()
            .and_then(|d| d.get(KUBECONFIG_DATA_KEY))
            .map(|b| b.0.clone())
            .ok_or_else(|| {
                BridgeError::KubeconfigError(format!(
                    "Secret {}/{} does not contain '{}' key",
                    namespace, ADMIN_KUBECONFIG_SECRET, KUBECONFIG_DATA_KEY
                ))
            })
    }
}
