// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Secret synthesis: render each user cluster's secret and upsert it into
//! the Argo CD namespace, merging instead of overwriting.

use crate::argo::merge::{encode_tracked_keys, merge_metadata};
use crate::argo::ArgoConnector;
use crate::constants::{annotations, labels};
use crate::error::Result;
use crate::kkp::UserCluster;
use crate::template::{RenderedSecret, Renderer, TemplateContext};
use crate::types::Project;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::api::ObjectMeta;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

/// Per-cycle synthesis counters
#[derive(Debug, Default, Clone, Copy)]
pub struct SynthesisOutcome {
    pub reconciled: usize,
    pub failed: usize,
}

/// Upsert a secret for every user cluster. A failure for one cluster is
/// logged and never aborts the others.
pub async fn store_clusters(
    argo: &ArgoConnector,
    renderer: &Renderer,
    clusters: &[UserCluster],
    projects: &[Project],
    kkp_cluster_name: Option<&str>,
) -> SynthesisOutcome {
    let mut outcome = SynthesisOutcome::default();

    for cluster in clusters {
        let project = cluster
            .project_id
            .as_deref()
            .and_then(|id| projects.iter().find(|p| p.id() == id));

        match store_cluster(argo, renderer, cluster, project, kkp_cluster_name).await {
            Ok(()) => outcome.reconciled += 1,
            Err(e) => {
                warn!(
                    "Failed to reconcile secret for cluster {} on seed {}: {}",
                    cluster.id, cluster.seed, e
                );
                outcome.failed += 1;
            }
        }
    }

    info!(
        "Reconciled Argo secrets for {} of {} user clusters",
        outcome.reconciled,
        clusters.len()
    );
    outcome
}

#[instrument(skip(argo, renderer, cluster, project, kkp_cluster_name), fields(cluster = %cluster.id))]
async fn store_cluster(
    argo: &ArgoConnector,
    renderer: &Renderer,
    cluster: &UserCluster,
    project: Option<&Project>,
    kkp_cluster_name: Option<&str>,
) -> Result<()> {
    let context = TemplateContext::build(cluster, project, kkp_cluster_name)?;
    let mut rendered = renderer.render(&context)?;
    apply_identity_labels(&mut rendered.labels, cluster, kkp_cluster_name);

    match argo.get_secret(&rendered.name).await? {
        None => {
            debug!("Creating secret {}", rendered.name);
            let secret = new_secret(argo.namespace(), &rendered)?;
            argo.create_secret(&secret).await
        }
        Some(existing) => {
            debug!("Updating secret {}", rendered.name);
            let secret = merged_secret(&existing, &rendered)?;
            argo.replace_secret(&rendered.name, &secret).await
        }
    }
}

/// The three identity labels (plus the optional discriminator) are owned
/// by the engine and stamped on every upsert, whatever the template says.
fn apply_identity_labels(
    rendered_labels: &mut BTreeMap<String, String>,
    cluster: &UserCluster,
    kkp_cluster_name: Option<&str>,
) {
    rendered_labels.insert(labels::MANAGED.to_string(), "true".to_string());
    rendered_labels.insert(labels::CLUSTER_ID.to_string(), cluster.id.clone());
    rendered_labels.insert(labels::SEED.to_string(), cluster.seed.clone());
    if let Some(name) = kkp_cluster_name {
        rendered_labels.insert(labels::KKP_CLUSTER.to_string(), name.to_string());
    }
}

/// Build a fresh secret for a cluster seen for the first time
fn new_secret(namespace: &str, rendered: &RenderedSecret) -> Result<Secret> {
    let mut secret_annotations = rendered.annotations.clone();
    stamp_bookkeeping(&mut secret_annotations, rendered)?;

    Ok(Secret {
        metadata: ObjectMeta {
            name: Some(rendered.name.clone()),
            namespace: Some(namespace.to_string()),
            labels: Some(rendered.labels.clone()),
            annotations: Some(secret_annotations),
            ..Default::default()
        },
        data: Some(to_byte_data(&rendered.data)),
        ..Default::default()
    })
}

/// Merge the rendered secret into an existing one: data is replaced
/// wholesale, labels and annotations are merged with drift removal, and a
/// pending timeout marker is cancelled.
fn merged_secret(existing: &Secret, rendered: &RenderedSecret) -> Result<Secret> {
    let existing_labels = existing.metadata.labels.clone().unwrap_or_default();
    let existing_annotations = existing.metadata.annotations.clone().unwrap_or_default();

    let mut merged_labels = merge_metadata(
        &existing_labels,
        &rendered.labels,
        existing_annotations
            .get(annotations::LAST_LABELS)
            .map(String::as_str),
    )?;
    // the cluster is back, cancel any pending timeout
    merged_labels.remove(labels::TIMEOUT_START);

    let mut merged_annotations = merge_metadata(
        &existing_annotations,
        &rendered.annotations,
        existing_annotations
            .get(annotations::LAST_ANNOTATIONS)
            .map(String::as_str),
    )?;
    stamp_bookkeeping(&mut merged_annotations, rendered)?;

    let mut secret = existing.clone();
    secret.metadata.labels = Some(merged_labels);
    secret.metadata.annotations = Some(merged_annotations);
    secret.data = Some(to_byte_data(&rendered.data));
    secret.string_data = None;
    Ok(secret)
}

fn stamp_bookkeeping(
    secret_annotations: &mut BTreeMap<String, String>,
    rendered: &RenderedSecret,
) -> Result<()> {
    secret_annotations.insert(
        annotations::LAST_LABELS.to_string(),
        encode_tracked_keys(&rendered.labels)?,
    );
    secret_annotations.insert(
        annotations::LAST_ANNOTATIONS.to_string(),
        encode_tracked_keys(&rendered.annotations)?,
    );
    Ok(())
}

fn to_byte_data(data: &BTreeMap<String, String>) -> BTreeMap<String, ByteString> {
    data.iter()
        .map(|(k, v)| (k.clone(), ByteString(v.clone().into_bytes())))
        .collect()
}
