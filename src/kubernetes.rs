// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes client creation from kubeconfig files, secrets, or the
//! in-cluster service account.

use crate::error::{BridgeError, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Client;

/// Create a client from an optional kubeconfig path. Without a path the
/// in-cluster service account (or the local default config) is used.
pub async fn create_client(kubeconfig_path: Option<&str>) -> Result<Client> {
    match kubeconfig_path {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                BridgeError::KubeconfigError(format!("Failed to read {}: {}", path, e))
            })?;
            client_from_kubeconfig(kubeconfig).await
        }
        None => Client::try_default()
            .await
            .map_err(BridgeError::KubeError),
    }
}

/// Create a client from raw kubeconfig bytes, as stored in KKP secrets
pub async fn client_from_kubeconfig_bytes(kubeconfig: &[u8]) -> Result<Client> {
    let text = std::str::from_utf8(kubeconfig)
        .map_err(|e| BridgeError::KubeconfigError(format!("Kubeconfig is not UTF-8: {}", e)))?;
    let parsed: Kubeconfig = serde_yaml::from_str(text)
        .map_err(|e| BridgeError::KubeconfigError(format!("Failed to parse kubeconfig: {}", e)))?;
    client_from_kubeconfig(parsed).await
}

async fn client_from_kubeconfig(kubeconfig: Kubeconfig) -> Result<Client> {
    let client_config =
        kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .map_err(|e| BridgeError::KubeconfigError(format!("Failed to create config: {}", e)))?;

    Client::try_from(client_config)
        .map_err(|e| BridgeError::KubeconfigError(format!("Failed to create client: {}", e)))
}
