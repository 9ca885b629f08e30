// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Data exposed to the cluster secret template.

use crate::constants::BASE_LABEL;
use crate::error::{BridgeError, Result};
use crate::kkp::UserCluster;
use crate::types::Project;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything a cluster secret template can reference.
#[derive(Serialize, Debug, Clone)]
pub struct TemplateContext {
    pub cluster: ClusterContext,
    pub project: ProjectContext,
    /// Project labels overlaid by cluster labels, cluster wins
    pub labels: BTreeMap<String, String>,
    /// Project annotations overlaid by cluster annotations, cluster wins
    pub annotations: BTreeMap<String, String>,
    pub credentials: CredentialsContext,
    pub base_label: String,
    /// Discriminator when several KKP installations share one namespace,
    /// empty when unset
    pub kkp_cluster_name: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct ClusterContext {
    pub id: String,
    pub name: String,
    pub seed: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    /// Raw admin kubeconfig, for templates embedding it wholesale
    pub kubeconfig: String,
}

#[derive(Serialize, Debug, Clone, Default)]
pub struct ProjectContext {
    pub id: String,
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
}

/// Connection fields extracted from the cluster's admin kubeconfig.
/// Certificate and key fields keep the base64 encoding they have in the
/// kubeconfig, matching what Argo CD expects in its cluster config.
#[derive(Serialize, Debug, Clone, Default)]
pub struct CredentialsContext {
    pub server: String,
    pub ca_data: String,
    pub cert_data: String,
    pub key_data: String,
    pub token: String,
}

impl TemplateContext {
    /// Assemble the context for one user cluster. Fails when the admin
    /// kubeconfig cannot be decoded; such failures abort only this
    /// cluster's sync.
    pub fn build(
        cluster: &UserCluster,
        project: Option<&Project>,
        kkp_cluster_name: Option<&str>,
    ) -> Result<Self> {
        let kubeconfig = String::from_utf8(cluster.kubeconfig.clone())
            .map_err(|e| BridgeError::CredentialDecode(format!("kubeconfig is not UTF-8: {}", e)))?;
        let credentials = CredentialsContext::from_kubeconfig(&kubeconfig)?;

        let project_ctx = match project {
            Some(p) => ProjectContext {
                id: p.id(),
                name: p.display_name().to_string(),
                labels: p.labels_map(),
                annotations: p.annotations_map(),
            },
            None => ProjectContext::default(),
        };

        let mut labels = project_ctx.labels.clone();
        labels.extend(cluster.labels.clone());
        let mut annotations = project_ctx.annotations.clone();
        annotations.extend(cluster.annotations.clone());

        Ok(TemplateContext {
            cluster: ClusterContext {
                id: cluster.id.clone(),
                name: cluster.name.clone(),
                seed: cluster.seed.clone(),
                labels: cluster.labels.clone(),
                annotations: cluster.annotations.clone(),
                kubeconfig,
            },
            project: project_ctx,
            labels,
            annotations,
            credentials,
            base_label: BASE_LABEL.to_string(),
            kkp_cluster_name: kkp_cluster_name.unwrap_or_default().to_string(),
        })
    }
}

impl CredentialsContext {
    /// Pick the connection fields of the current context out of a
    /// kubeconfig. Only the fields the template needs are parsed.
    pub fn from_kubeconfig(kubeconfig: &str) -> Result<Self> {
        let raw: RawKubeconfig = serde_yaml::from_str(kubeconfig)
            .map_err(|e| BridgeError::CredentialDecode(format!("invalid kubeconfig: {}", e)))?;

        let context = match &raw.current_context {
            Some(name) => raw.contexts.iter().find(|c| &c.name == name),
            None => raw.contexts.first(),
        }
        .map(|c| &c.context);

        let cluster = match context {
            Some(ctx) => raw.clusters.iter().find(|c| c.name == ctx.cluster),
            None => raw.clusters.first(),
        }
        .ok_or_else(|| {
            BridgeError::CredentialDecode("kubeconfig contains no cluster entry".to_string())
        })?;

        let user = match context.and_then(|ctx| ctx.user.as_ref()) {
            Some(name) => raw.users.iter().find(|u| &u.name == name),
            None => raw.users.first(),
        }
        .map(|u| u.user.clone())
        .unwrap_or_default();

        Ok(CredentialsContext {
            server: cluster.cluster.server.clone(),
            ca_data: cluster
                .cluster
                .certificate_authority_data
                .clone()
                .unwrap_or_default(),
            cert_data: user.client_certificate_data.unwrap_or_default(),
            key_data: user.client_key_data.unwrap_or_default(),
            token: user.token.unwrap_or_default(),
        })
    }
}

#[derive(Deserialize)]
struct RawKubeconfig {
    #[serde(default)]
    clusters: Vec<NamedCluster>,
    #[serde(default)]
    users: Vec<NamedUser>,
    #[serde(default)]
    contexts: Vec<NamedContext>,
    #[serde(rename = "current-context", default)]
    current_context: Option<String>,
}

#[derive(Deserialize)]
struct NamedCluster {
    name: String,
    cluster: ClusterEndpoint,
}

#[derive(Deserialize)]
struct ClusterEndpoint {
    server: String,
    #[serde(rename = "certificate-authority-data", default)]
    certificate_authority_data: Option<String>,
}

#[derive(Deserialize)]
struct NamedUser {
    name: String,
    user: UserAuth,
}

#[derive(Deserialize, Clone, Default)]
struct UserAuth {
    #[serde(rename = "client-certificate-data", default)]
    client_certificate_data: Option<String>,
    #[serde(rename = "client-key-data", default)]
    client_key_data: Option<String>,
    #[serde(default)]
    token: Option<String>,
}

#[derive(Deserialize)]
struct NamedContext {
    name: String,
    context: ContextRef,
}

#[derive(Deserialize)]
struct ContextRef {
    cluster: String,
    #[serde(default)]
    user: Option<String>,
}
