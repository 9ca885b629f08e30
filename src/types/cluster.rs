// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::PROJECT_ID_LABEL;
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[kube(group = "kubermatic.k8c.io", version = "v1", kind = "Cluster")]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    /// Display name chosen by the user when creating the cluster.
    pub human_readable_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pause: Option<bool>,
}

impl Cluster {
    /// Cluster ID, unique within its seed. KKP uses the object name.
    pub fn id(&self) -> String {
        self.name_any()
    }

    pub fn display_name(&self) -> &str {
        &self.spec.human_readable_name
    }

    /// Namespace on the seed cluster holding this cluster's control plane
    /// and its admin kubeconfig secret.
    pub fn control_plane_namespace(&self) -> String {
        format!("cluster-{}", self.name_any())
    }

    /// ID of the owning project, taken from the `project-id` label.
    pub fn project_id(&self) -> Option<String> {
        self.metadata
            .labels
            .as_ref()
            .and_then(|l| l.get(PROJECT_ID_LABEL))
            .cloned()
    }

    pub fn labels_map(&self) -> BTreeMap<String, String> {
        self.metadata.labels.clone().unwrap_or_default()
    }

    pub fn annotations_map(&self) -> BTreeMap<String, String> {
        self.metadata.annotations.clone().unwrap_or_default()
    }
}
