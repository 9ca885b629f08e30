// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Connector against the KKP master cluster: projects, seeds, and the
//! kubeconfig secrets needed to reach each seed.

use crate::constants::KUBECONFIG_DATA_KEY;
use crate::error::{BridgeError, Result};
use crate::kkp::seed::SeedClient;
use crate::types::{Project, Seed};
use k8s_openapi::api::core::v1::Secret;
use kube::{api::ListParams, Api, Client, ResourceExt};
use tracing::{instrument, warn};

pub struct KkpConnector {
    client: Client,
}

impl KkpConnector {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Verify the KKP CRDs are served by the master cluster. Used as a
    /// fatal startup check.
    pub async fn verify_crds(&self) -> Result<()> {
        let seeds: Api<Seed> = Api::all(self.client.clone());
        seeds.list(&ListParams::default().limit(1)).await?;
        let projects: Api<Project> = Api::all(self.client.clone());
        projects.list(&ListParams::default().limit(1)).await?;
        Ok(())
    }

    pub async fn get_projects(&self) -> Result<Vec<Project>> {
        let projects: Api<Project> = Api::all(self.client.clone());
        Ok(projects.list(&ListParams::default()).await?.items)
    }

    /// Connect to every registered seed. A seed whose kubeconfig cannot be
    /// fetched or parsed is logged and dropped for this cycle; its clusters
    /// are then treated as "seed unreachable" by cleanup.
    #[instrument(skip(self))]
    pub async fn get_seeds(&self) -> Result<Vec<SeedClient>> {
        let seeds: Api<Seed> = Api::all(self.client.clone());
        let seed_list = seeds.list(&ListParams::default()).await?;

        let mut connected = Vec::new();
        for seed in seed_list.items {
            let name = seed.name_any();
            match self.connect_seed(&seed).await {
                Ok(client) => connected.push(client),
                Err(e) => warn!("Failed to connect to seed {}: {}", name, e),
            }
        }
        Ok(connected)
    }

    async fn connect_seed(&self, seed: &Seed) -> Result<SeedClient> {
        let name = seed.name_any();
        let reference = &seed.spec.kubeconfig;
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), &reference.namespace);
        let secret = secrets.get(&reference.name).await?;

        let kubeconfig = secret
            .data
            .as_ref()
            .and_then(|d| d.get(KUBECONFIG_DATA_KEY))
            .map(|b| b.0.clone())
            .ok_or_else(|| {
                BridgeError::KubeconfigError(format!(
                    "Kubeconfig secret {}/{} for seed {} does not contain '{}' key",
                    reference.namespace, reference.name, name, KUBECONFIG_DATA_KEY
                ))
            })?;

        SeedClient::from_kubeconfig(&name, &kubeconfig).await
    }
}
