// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to parse kubeconfig: {0}")]
    KubeconfigError(String),

    #[error("Failed to parse secret template: {0}")]
    TemplateParse(#[from] Box<handlebars::TemplateError>),

    #[error("Failed to render secret template: {0}")]
    TemplateRender(#[from] handlebars::RenderError),

    #[error("Rendered secret is not valid YAML: {0}")]
    DocumentParse(#[from] serde_yaml::Error),

    #[error("Invalid secret document: {0}")]
    Projection(String),

    #[error("Cannot flatten '{key}' to a string map: {reason}")]
    Flatten { key: String, reason: String },

    #[error("Failed to decode cluster credentials: {0}")]
    CredentialDecode(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
