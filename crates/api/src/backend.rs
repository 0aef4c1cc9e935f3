//! Cluster access seam used by the tool handlers.

use anyhow::Result;
use async_trait::async_trait;
use kmcp_kubehub::{
    list_contexts, ApiResourceInfo, ClusterOptions, ContextInfo, KubeHub, ResolveError, RestMapper, RestMapperProvider, RestMapping,
};
use kmcp_ops::{KubeOps, LogOptions, NodeMetrics, PodMetrics};
use serde_json::Value;

/// Everything the handlers need from a cluster. Implementations must also
/// provide discovery for the resolver.
#[async_trait]
pub trait ClusterAccess: RestMapperProvider {
    async fn list(&self, context: &str, mapping: &RestMapping, namespace: &str) -> Result<Vec<Value>>;

    async fn get(&self, context: &str, mapping: &RestMapping, namespace: &str, name: &str) -> Result<Value>;

    async fn api_resources(&self, context: &str, group: Option<&str>) -> Result<Vec<ApiResourceInfo>>;

    async fn node_metrics(&self, context: &str) -> Result<Vec<NodeMetrics>>;

    async fn pod_metrics(&self, context: &str, namespace: &str) -> Result<Vec<PodMetrics>>;

    async fn pod_logs(&self, context: &str, namespace: &str, pod: &str, opts: &LogOptions) -> Result<String>;

    fn contexts(&self) -> Result<Vec<ContextInfo>>;
}

/// Live implementation over kubeconfig-selected clusters.
#[derive(Debug, Clone, Default)]
pub struct KubeBackend {
    hub: KubeHub,
    ops: KubeOps,
}

impl KubeBackend {
    pub fn new(opts: ClusterOptions) -> Self {
        let hub = KubeHub::new(opts);
        Self { ops: KubeOps::new(hub.clone()), hub }
    }
}

#[async_trait]
impl RestMapperProvider for KubeBackend {
    async fn rest_mapper(&self, context: &str, group: &str) -> Result<Box<dyn RestMapper + Send + Sync>, ResolveError> {
        self.hub.rest_mapper(context, group).await
    }
}

#[async_trait]
impl ClusterAccess for KubeBackend {
    async fn list(&self, context: &str, mapping: &RestMapping, namespace: &str) -> Result<Vec<Value>> {
        self.hub.list(context, mapping, namespace).await
    }

    async fn get(&self, context: &str, mapping: &RestMapping, namespace: &str, name: &str) -> Result<Value> {
        self.hub.get(context, mapping, namespace, name).await
    }

    async fn api_resources(&self, context: &str, group: Option<&str>) -> Result<Vec<ApiResourceInfo>> {
        self.hub.api_resources(context, group).await
    }

    async fn node_metrics(&self, context: &str) -> Result<Vec<NodeMetrics>> { self.ops.node_metrics(context).await }

    async fn pod_metrics(&self, context: &str, namespace: &str) -> Result<Vec<PodMetrics>> {
        self.ops.pod_metrics(context, namespace).await
    }

    async fn pod_logs(&self, context: &str, namespace: &str, pod: &str, opts: &LogOptions) -> Result<String> {
        self.ops.logs(context, namespace, pod, opts).await
    }

    fn contexts(&self) -> Result<Vec<ContextInfo>> { list_contexts() }
}
