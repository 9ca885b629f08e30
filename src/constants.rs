// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Identity string of the bridge, used as the prefix of every reserved
/// label and annotation key.
pub const BASE_LABEL: &str = "kkp-argo-bridge";

/// Labels owned by the bridge on managed Argo CD cluster secrets.
pub mod labels {
    /// Marks a secret as created and owned by the bridge.
    pub const MANAGED: &str = "kkp-argo-bridge/managed";
    /// ID of the KKP user cluster the secret represents.
    pub const CLUSTER_ID: &str = "kkp-argo-bridge/cluster-id";
    /// Name of the KKP seed the user cluster lives on.
    pub const SEED: &str = "kkp-argo-bridge/seed";
    /// Optional discriminator when several KKP installations share one
    /// Argo CD namespace.
    pub const KKP_CLUSTER: &str = "kkp-argo-bridge/kkp-cluster";
    /// Unix-millis timestamp stamped when the owning seed first became
    /// unreachable. Present only while the secret is pending timeout.
    pub const TIMEOUT_START: &str = "kkp-argo-bridge/timeout-start";
}

/// Annotations owned by the bridge on managed Argo CD cluster secrets.
pub mod annotations {
    /// JSON array of the label keys written on the previous sync.
    pub const LAST_LABELS: &str = "kkp-argo-bridge/last-labels";
    /// JSON array of the annotation keys written on the previous sync.
    pub const LAST_ANNOTATIONS: &str = "kkp-argo-bridge/last-annotations";
}

/// Built-in cluster secret template, used when no override file is given.
pub const DEFAULT_CLUSTER_SECRET_TEMPLATE: &str =
    include_str!("../templates/cluster-secret.yaml");

/// Name of the secret holding a user cluster's admin kubeconfig.
pub const ADMIN_KUBECONFIG_SECRET: &str = "admin-kubeconfig";

/// Data key under which KKP stores kubeconfigs in secrets.
pub const KUBECONFIG_DATA_KEY: &str = "kubeconfig";

/// Cluster label KKP sets to tie a user cluster to its project.
pub const PROJECT_ID_LABEL: &str = "project-id";
