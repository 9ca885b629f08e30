// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Thin CRUD layer over the cluster secrets in the Argo CD namespace.

use crate::constants::labels;
use crate::error::Result;
use k8s_openapi::api::core::v1::{Namespace, Secret};
use kube::{
    api::{DeleteParams, ListParams, PostParams},
    Api, Client,
};

pub struct ArgoConnector {
    client: Client,
    namespace: String,
    kkp_cluster_name: Option<String>,
}

impl ArgoConnector {
    pub fn new(client: Client, namespace: &str, kkp_cluster_name: Option<&str>) -> Self {
        Self {
            client,
            namespace: namespace.to_string(),
            kkp_cluster_name: kkp_cluster_name.map(|s| s.to_string()),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn secrets(&self) -> Api<Secret> {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    /// The target namespace must pre-exist. Fatal startup check.
    pub async fn verify_namespace(&self) -> Result<()> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        namespaces.get(&self.namespace).await?;
        Ok(())
    }

    /// Label selector matching the secrets this bridge instance owns.
    /// Matches only the bridge's own identity labels; the
    /// `argocd.argoproj.io/secret-type` label is template-controlled and
    /// deliberately not part of the selector.
    pub fn managed_selector(&self) -> String {
        let mut selector = format!("{}=true", labels::MANAGED);
        if let Some(name) = &self.kkp_cluster_name {
            selector.push_str(&format!(",{}={}", labels::KKP_CLUSTER, name));
        }
        selector
    }

    /// All secrets currently managed by this bridge instance
    pub async fn managed_secrets(&self) -> Result<Vec<Secret>> {
        let lp = ListParams::default().labels(&self.managed_selector());
        Ok(self.secrets().list(&lp).await?.items)
    }

    /// Get a secret by name, `None` when it does not exist
    pub async fn get_secret(&self, name: &str) -> Result<Option<Secret>> {
        Ok(self.secrets().get_opt(name).await?)
    }

    pub async fn create_secret(&self, secret: &Secret) -> Result<()> {
        self.secrets()
            .create(&PostParams::default(), secret)
            .await?;
        Ok(())
    }

    pub async fn replace_secret(&self, name: &str, secret: &Secret) -> Result<()> {
        self.secrets()
            .replace(name, &PostParams::default(), secret)
            .await?;
        Ok(())
    }

    pub async fn delete_secret(&self, name: &str) -> Result<()> {
        self.secrets()
            .delete(name, &DeleteParams::default())
            .await?;
        Ok(())
    }
}
