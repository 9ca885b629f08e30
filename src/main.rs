// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::info;

use kkp_argo_bridge::argo::ArgoConnector;
use kkp_argo_bridge::config::Config;
use kkp_argo_bridge::constants::DEFAULT_CLUSTER_SECRET_TEMPLATE;
use kkp_argo_bridge::kkp::KkpConnector;
use kkp_argo_bridge::kubernetes::create_client;
use kkp_argo_bridge::sync::Bridge;
use kkp_argo_bridge::template::Renderer;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting kkp-argo-bridge");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: argo_namespace={}, sync_interval={:?}",
        config.argo_namespace, config.sync_interval
    );

    // Compile the cluster secret template (built-in or override file)
    let template_source = match &config.cluster_secret_template {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read cluster secret template {}", path))?,
        None => DEFAULT_CLUSTER_SECRET_TEMPLATE.to_string(),
    };
    let renderer =
        Renderer::new(&template_source).context("Failed to parse cluster secret template")?;

    // Create clients for both sides
    let kkp_client = create_client(config.kkp_kubeconfig.as_deref()).await?;
    let argo_client = match &config.argo_kubeconfig {
        Some(path) => create_client(Some(path)).await?,
        None => {
            info!("No Argo CD kubeconfig provided, using the KKP cluster for both");
            kkp_client.clone()
        }
    };

    let kkp = KkpConnector::new(kkp_client);
    let argo = ArgoConnector::new(
        argo_client,
        &config.argo_namespace,
        config.kkp_cluster_name.as_deref(),
    );

    // Fatal startup checks
    kkp.verify_crds()
        .await
        .context("KKP CRDs are not served by the master cluster")?;
    argo.verify_namespace().await.with_context(|| {
        format!(
            "The Argo CD namespace '{}' does not exist",
            config.argo_namespace
        )
    })?;

    // Stop after the in-flight cycle on SIGINT/SIGTERM
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Termination signal received, stopping after the current cycle");
        let _ = shutdown_tx.send(true);
    });

    Bridge::new(config, kkp, argo, renderer).run(shutdown_rx).await
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
    }
}
