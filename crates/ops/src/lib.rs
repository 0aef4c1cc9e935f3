//! kmcp ops: read-only imperative operations that sit beside generic
//! list/get, namely pod logs and `kubectl top`-style usage.

#![forbid(unsafe_code)]

use anyhow::Result;
use kmcp_kubehub::KubeHub;

pub mod logs;
pub mod top;

pub use logs::{parse_go_duration, pod_logs, LogOptions, LogOptionsError};
pub use top::{node_metrics_from, pod_metrics_from, ContainerMetrics, NodeMetrics, PodMetrics};

/// Context-aware entry point over [`KubeHub`] clients.
#[derive(Debug, Clone, Default)]
pub struct KubeOps {
    hub: KubeHub,
}

impl KubeOps {
    pub fn new(hub: KubeHub) -> Self { Self { hub } }

    pub async fn logs(&self, context: &str, namespace: &str, pod: &str, opts: &LogOptions) -> Result<String> {
        let client = self.hub.client(context).await?;
        logs::pod_logs(client, namespace, pod, opts).await
    }

    pub async fn node_metrics(&self, context: &str) -> Result<Vec<NodeMetrics>> {
        let client = self.hub.client(context).await?;
        top::node_metrics(client).await
    }

    pub async fn pod_metrics(&self, context: &str, namespace: &str) -> Result<Vec<PodMetrics>> {
        let client = self.hub.client(context).await?;
        top::pod_metrics(client, namespace).await
    }
}
