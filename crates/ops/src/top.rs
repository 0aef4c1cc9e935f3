//! Resource usage from metrics.k8s.io, rendered like `kubectl top`.

use anyhow::{Context, Result};
use kmcp_core::extract;
use kmcp_core::quantity::{format_cpu, format_memory, parse_quantity};
use kube::api::{Api, ApiResource, DynamicObject, ListParams};
use kube::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

const METRICS_GROUP: &str = "metrics.k8s.io";
const METRICS_VERSION: &str = "v1beta1";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetrics {
    pub name: String,
    pub cpu_usage: String,
    pub memory_usage: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContainerMetrics {
    pub name: String,
    pub cpu_usage: String,
    pub memory_usage: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PodMetrics {
    pub name: String,
    pub namespace: String,
    /// Sum over containers.
    pub cpu_usage: String,
    pub memory_usage: String,
    pub containers: Vec<ContainerMetrics>,
}

fn metrics_resource(kind: &str, plural: &str) -> ApiResource {
    ApiResource {
        group: METRICS_GROUP.into(),
        version: METRICS_VERSION.into(),
        api_version: format!("{METRICS_GROUP}/{METRICS_VERSION}"),
        kind: kind.into(),
        plural: plural.into(),
    }
}

/// (cores, bytes) from a `usage` map; unparseable entries count as zero.
fn usage(v: &Value) -> (f64, f64) {
    let q = |ptr: &str| extract::str_at(v, ptr).and_then(parse_quantity).unwrap_or(0.0);
    (q("/usage/cpu"), q("/usage/memory"))
}

pub fn node_metrics_from(obj: &Value) -> NodeMetrics {
    let (cpu, mem) = usage(obj);
    NodeMetrics { name: extract::name(obj), cpu_usage: format_cpu(cpu), memory_usage: format_memory(mem) }
}

pub fn pod_metrics_from(obj: &Value) -> PodMetrics {
    let mut total = (0f64, 0f64);
    let containers = extract::array_at(obj, "/containers")
        .into_iter()
        .flatten()
        .map(|c| {
            let (cpu, mem) = usage(c);
            total.0 += cpu;
            total.1 += mem;
            ContainerMetrics { name: extract::string_at(c, "/name"), cpu_usage: format_cpu(cpu), memory_usage: format_memory(mem) }
        })
        .collect();
    PodMetrics {
        name: extract::name(obj),
        namespace: extract::namespace(obj),
        cpu_usage: format_cpu(total.0),
        memory_usage: format_memory(total.1),
        containers,
    }
}

async fn list_metrics(api: Api<DynamicObject>) -> Result<Vec<Value>> {
    let list = api.list(&ListParams::default()).await?;
    list.items.iter().map(|o| serde_json::to_value(o).context("serializing metrics object")).collect()
}

pub async fn node_metrics(client: Client) -> Result<Vec<NodeMetrics>> {
    let api: Api<DynamicObject> = Api::all_with(client, &metrics_resource("NodeMetrics", "nodes"));
    let items = list_metrics(api).await.context("failed to list node metrics")?;
    info!(count = items.len(), "node metrics");
    Ok(items.iter().map(node_metrics_from).collect())
}

/// Pod usage in `namespace`, or across all namespaces when empty.
pub async fn pod_metrics(client: Client, namespace: &str) -> Result<Vec<PodMetrics>> {
    let ar = metrics_resource("PodMetrics", "pods");
    let api: Api<DynamicObject> = if namespace.is_empty() { Api::all_with(client, &ar) } else { Api::namespaced_with(client, namespace, &ar) };
    let items = list_metrics(api).await.context("failed to list pod metrics")?;
    info!(ns = %namespace, count = items.len(), "pod metrics");
    Ok(items.iter().map(pod_metrics_from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn node_usage() {
        let obj = json!({
            "metadata": {"name": "node-a"},
            "timestamp": "2024-05-01T12:00:00Z", "window": "20s",
            "usage": {"cpu": "250000000n", "memory": "2048Mi"}
        });
        assert_eq!(
            node_metrics_from(&obj),
            NodeMetrics { name: "node-a".into(), cpu_usage: "250m".into(), memory_usage: "2048Mi".into() }
        );
    }

    #[test]
    fn pod_usage_sums_containers() {
        let obj = json!({
            "metadata": {"name": "web-0", "namespace": "shop"},
            "containers": [
                {"name": "app", "usage": {"cpu": "120m", "memory": "100Mi"}},
                {"name": "proxy", "usage": {"cpu": "5123456n", "memory": "12000Ki"}}
            ]
        });
        let m = pod_metrics_from(&obj);
        assert_eq!(m.containers[0].cpu_usage, "120m");
        assert_eq!(m.containers[1].cpu_usage, "6m");
        assert_eq!(m.containers[1].memory_usage, "11Mi");
        assert_eq!(m.cpu_usage, "126m");
        assert_eq!(m.memory_usage, "111Mi");
        let v = serde_json::to_value(&m).unwrap();
        assert_eq!(v["cpuUsage"], "126m");
        assert_eq!(v["containers"][0]["memoryUsage"], "100Mi");
    }

    #[test]
    fn small_and_missing_usage() {
        let obj = json!({"metadata": {"name": "tiny", "namespace": "x"}, "containers": [{"name": "c", "usage": {"memory": "512Ki"}}]});
        let m = pod_metrics_from(&obj);
        assert_eq!(m.memory_usage, "524288");
        assert_eq!(m.cpu_usage, "0m");
        let empty = pod_metrics_from(&json!({"metadata": {"name": "none"}}));
        assert!(empty.containers.is_empty());
    }
}
