// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::{CustomResource, ResourceExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[kube(group = "kubermatic.k8c.io", version = "v1", kind = "Project")]
#[serde(rename_all = "camelCase")]
pub struct ProjectSpec {
    /// Human readable project name. The object name is the project ID.
    pub name: String,
}

impl Project {
    /// Project ID as used in the `project-id` label of user clusters
    pub fn id(&self) -> String {
        self.name_any()
    }

    pub fn display_name(&self) -> &str {
        &self.spec.name
    }

    pub fn labels_map(&self) -> BTreeMap<String, String> {
        self.metadata.labels.clone().unwrap_or_default()
    }

    pub fn annotations_map(&self) -> BTreeMap<String, String> {
        self.metadata.annotations.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::api::ObjectMeta;

    fn make_project(id: &str, name: &str) -> Project {
        Project {
            metadata: ObjectMeta {
                name: Some(id.to_string()),
                labels: Some(BTreeMap::from([("tier".to_string(), "prod".to_string())])),
                ..Default::default()
            },
            spec: ProjectSpec {
                name: name.to_string(),
            },
        }
    }

    #[test]
    fn test_id_is_object_name() {
        let project = make_project("x7f2kq9s4t", "payments");
        assert_eq!(project.id(), "x7f2kq9s4t");
        assert_eq!(project.display_name(), "payments");
    }

    #[test]
    fn test_labels_map() {
        let project = make_project("x7f2kq9s4t", "payments");
        assert_eq!(project.labels_map().get("tier").unwrap(), "prod");
    }

    #[test]
    fn test_empty_maps_when_unset() {
        let project = Project {
            metadata: ObjectMeta::default(),
            spec: ProjectSpec {
                name: "payments".to_string(),
            },
        };
        assert!(project.labels_map().is_empty());
        assert!(project.annotations_map().is_empty());
    }
}
