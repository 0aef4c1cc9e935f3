//! Per-context clients built from the user's kubeconfig.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterOptions {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self { connect_timeout: Duration::from_secs(10), read_timeout: Duration::from_secs(60) }
    }
}

/// One kubeconfig context as exposed to agents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContextInfo {
    pub name: String,
    pub cluster_name: String,
    pub is_current: bool,
}

/// Contexts of `kubeconfig`, sorted by name.
pub fn contexts_from(kubeconfig: &Kubeconfig) -> Vec<ContextInfo> {
    let current = kubeconfig.current_context.as_deref();
    let mut out: Vec<ContextInfo> = kubeconfig
        .contexts
        .iter()
        .map(|c| ContextInfo {
            name: c.name.clone(),
            cluster_name: c.context.as_ref().map(|ctx| ctx.cluster.clone()).unwrap_or_default(),
            is_current: current == Some(c.name.as_str()),
        })
        .collect();
    out.sort_by(|a, b| a.name.cmp(&b.name));
    out
}

/// Read the default kubeconfig (KUBECONFIG or ~/.kube/config) and list its contexts.
pub fn list_contexts() -> Result<Vec<ContextInfo>> {
    let kubeconfig = Kubeconfig::read().context("failed to load kubeconfig")?;
    Ok(contexts_from(&kubeconfig))
}

/// Verify `context` is declared in `kubeconfig`.
pub fn ensure_context(kubeconfig: &Kubeconfig, context: &str) -> Result<()> {
    if kubeconfig.contexts.iter().any(|c| c.name == context) {
        Ok(())
    } else {
        Err(anyhow!("context \"{}\" does not exist in kubeconfig", context))
    }
}

/// Build a client for `context`; an empty context uses the kubeconfig's
/// current context (or in-cluster config when no kubeconfig is present).
pub async fn client_for_context(context: &str, opts: &ClusterOptions) -> Result<Client> {
    let mut config = if context.is_empty() {
        Config::infer().await.context("failed to infer kube config")?
    } else {
        let kubeconfig = Kubeconfig::read().context("failed to load kubeconfig")?;
        ensure_context(&kubeconfig, context)?;
        Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions { context: Some(context.to_string()), ..Default::default() })
            .await
            .with_context(|| format!("failed to load kubeconfig for context \"{}\"", context))?
    };
    config.connect_timeout = Some(opts.connect_timeout);
    config.read_timeout = Some(opts.read_timeout);
    debug!(context = %context, cluster_url = %config.cluster_url, "building client");
    Client::try_from(config).with_context(|| format!("failed to create client for context \"{}\"", context))
}
