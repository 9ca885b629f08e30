// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Handlebars rendering of the cluster secret template and projection of
//! the result into the `{name, labels, annotations, data}` shape.

use crate::error::{BridgeError, Result};
use crate::template::TemplateContext;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use handlebars::{handlebars_helper, Handlebars};
use serde_yaml::Value;
use std::collections::BTreeMap;

const TEMPLATE_NAME: &str = "cluster-secret";

handlebars_helper!(base64_helper: |v: str| BASE64.encode(v.as_bytes()));

/// A rendered cluster secret document, flattened to string maps.
/// Data values become the secret's byte values on upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSecret {
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    pub data: BTreeMap<String, String>,
}

pub struct Renderer {
    handlebars: Handlebars<'static>,
}

impl Renderer {
    /// Compile the template. Fails on malformed template source, which is
    /// fatal at startup.
    pub fn new(template_source: &str) -> Result<Self> {
        let mut handlebars = Handlebars::new();
        // Undefined fields in the template must fail the render, not
        // silently produce empty strings.
        handlebars.set_strict_mode(true);
        // The output is YAML, not HTML: interpolated values must land
        // verbatim, base64 padding and URLs included.
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.register_helper("base64", Box::new(base64_helper));
        handlebars
            .register_template_string(TEMPLATE_NAME, template_source)
            .map_err(|e| BridgeError::TemplateParse(Box::new(e)))?;
        Ok(Self { handlebars })
    }

    /// Render the template for one cluster and project the result.
    pub fn render(&self, context: &TemplateContext) -> Result<RenderedSecret> {
        let rendered = self.handlebars.render(TEMPLATE_NAME, context)?;
        let document: Value = serde_yaml::from_str(&rendered)?;
        project_document(&document)
    }
}

/// Project the dynamically typed document into the expected secret shape,
/// with a typed error on any mismatch.
fn project_document(document: &Value) -> Result<RenderedSecret> {
    if document.as_mapping().is_none() {
        return Err(BridgeError::Projection(
            "rendered document is not a mapping".to_string(),
        ));
    }

    let name = document
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| BridgeError::Projection("'name' must be a string".to_string()))?
        .to_string();

    Ok(RenderedSecret {
        name,
        labels: flatten_to_string_map(document.get("labels"), "labels")?,
        annotations: flatten_to_string_map(document.get("annotations"), "annotations")?,
        data: flatten_to_string_map(document.get("data"), "data")?,
    })
}

/// Flatten one document subtree into a string map. String values pass
/// through, everything else is serialized to its canonical JSON text.
fn flatten_to_string_map(value: Option<&Value>, key: &str) -> Result<BTreeMap<String, String>> {
    let value = value.ok_or_else(|| BridgeError::Flatten {
        key: key.to_string(),
        reason: "key is missing".to_string(),
    })?;
    let mapping = value.as_mapping().ok_or_else(|| BridgeError::Flatten {
        key: key.to_string(),
        reason: "value is not a mapping".to_string(),
    })?;

    let mut flattened = BTreeMap::new();
    for (k, v) in mapping {
        let k = k.as_str().ok_or_else(|| BridgeError::Flatten {
            key: key.to_string(),
            reason: "mapping contains a non-string key".to_string(),
        })?;
        let v = match v {
            Value::String(s) => s.clone(),
            other => serde_json::to_string(other)?,
        };
        flattened.insert(k.to_string(), v);
    }
    Ok(flattened)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_CLUSTER_SECRET_TEMPLATE;
    use crate::template::context::{ClusterContext, CredentialsContext, ProjectContext};

    fn make_context() -> TemplateContext {
        TemplateContext {
            cluster: ClusterContext {
                id: "g9d7k2xq4m".to_string(),
                name: "staging".to_string(),
                seed: "europe-west".to_string(),
                labels: BTreeMap::new(),
                annotations: BTreeMap::new(),
                kubeconfig: "apiVersion: v1".to_string(),
            },
            project: ProjectContext {
                id: "x7f2kq9s4t".to_string(),
                name: "payments".to_string(),
                ..Default::default()
            },
            labels: BTreeMap::new(),
            annotations: BTreeMap::new(),
            credentials: CredentialsContext {
                server: "https://g9d7k2xq4m.europe-west.kkp.example.com:6443".to_string(),
                ca_data: "Q0EtREFUQQ==".to_string(),
                cert_data: "Q0VSVC1EQVRB".to_string(),
                key_data: "S0VZLURBVEE=".to_string(),
                token: String::new(),
            },
            base_label: "kkp-argo-bridge".to_string(),
            kkp_cluster_name: String::new(),
        }
    }

    #[test]
    fn test_default_template_renders() {
        let renderer = Renderer::new(DEFAULT_CLUSTER_SECRET_TEMPLATE).unwrap();
        let secret = renderer.render(&make_context()).unwrap();

        assert_eq!(secret.name, "g9d7k2xq4m");
        assert_eq!(
            secret.labels.get("argocd.argoproj.io/secret-type").unwrap(),
            "cluster"
        );
        assert_eq!(
            secret.annotations.get("kkp-project-id").unwrap(),
            "x7f2kq9s4t"
        );
        assert_eq!(secret.data.get("name").unwrap(), "staging");
        assert_eq!(
            secret.data.get("server").unwrap(),
            "https://g9d7k2xq4m.europe-west.kkp.example.com:6443"
        );
        assert!(secret.data.get("config").unwrap().contains("Q0EtREFUQQ=="));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let renderer = Renderer::new(DEFAULT_CLUSTER_SECRET_TEMPLATE).unwrap();
        let first = renderer.render(&make_context()).unwrap();
        let second = renderer.render(&make_context()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_undefined_field_fails_render() {
        let renderer = Renderer::new(
            "name: \"{{ cluster.id }}\"\nlabels: {}\nannotations: {}\ndata:\n  x: \"{{ cluster.no_such_field }}\"\n",
        )
        .unwrap();
        let result = renderer.render(&make_context());
        assert!(matches!(result, Err(BridgeError::TemplateRender(_))));
    }

    #[test]
    fn test_malformed_template_fails_compile() {
        let result = Renderer::new("name: {{ cluster.id");
        assert!(matches!(result, Err(BridgeError::TemplateParse(_))));
    }

    #[test]
    fn test_unparseable_output_is_a_document_error() {
        let renderer = Renderer::new("name: 'unterminated\nlabels: {}\n").unwrap();
        let result = renderer.render(&make_context());
        assert!(matches!(result, Err(BridgeError::DocumentParse(_))));
    }

    #[test]
    fn test_double_brace_values_are_not_html_escaped() {
        // base64 padding, ampersands and quotes must come through raw
        let renderer = Renderer::new(
            "name: \"{{ cluster.id }}\"\nlabels: {}\nannotations: {}\ndata:\n  ca: \"{{ credentials.ca_data }}\"\n  server: \"{{ credentials.server }}\"\n",
        )
        .unwrap();
        let mut context = make_context();
        context.credentials.server =
            "https://g9d7k2xq4m.example.com:6443/?a=1&b=2".to_string();

        let secret = renderer.render(&context).unwrap();

        assert_eq!(secret.data.get("ca").unwrap(), "Q0EtREFUQQ==");
        assert_eq!(
            secret.data.get("server").unwrap(),
            "https://g9d7k2xq4m.example.com:6443/?a=1&b=2"
        );
    }

    #[test]
    fn test_base64_helper() {
        let renderer = Renderer::new(
            "name: \"{{ cluster.id }}\"\nlabels: {}\nannotations: {}\ndata:\n  kubeconfig: \"{{ base64 cluster.kubeconfig }}\"\n",
        )
        .unwrap();
        let secret = renderer.render(&make_context()).unwrap();
        assert_eq!(
            secret.data.get("kubeconfig").unwrap(),
            &BASE64.encode("apiVersion: v1")
        );
    }

    #[test]
    fn test_missing_name_is_a_projection_error() {
        let renderer =
            Renderer::new("labels: {}\nannotations: {}\ndata: {}\n").unwrap();
        let result = renderer.render(&make_context());
        assert!(matches!(result, Err(BridgeError::Projection(_))));
    }

    #[test]
    fn test_non_mapping_labels_is_a_flatten_error() {
        let renderer = Renderer::new(
            "name: \"x\"\nlabels: just-a-string\nannotations: {}\ndata: {}\n",
        )
        .unwrap();
        let result = renderer.render(&make_context());
        match result {
            Err(BridgeError::Flatten { key, .. }) => assert_eq!(key, "labels"),
            other => panic!("expected flatten error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_non_string_scalars_are_serialized() {
        let renderer = Renderer::new(
            "name: \"x\"\nlabels:\n  replicas: 3\n  enabled: true\nannotations: {}\ndata: {}\n",
        )
        .unwrap();
        let secret = renderer.render(&make_context()).unwrap();
        assert_eq!(secret.labels.get("replicas").unwrap(), "3");
        assert_eq!(secret.labels.get("enabled").unwrap(), "true");
    }
}
