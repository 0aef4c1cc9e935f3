//! Tool catalog and handlers. Each handler resolves, fetches through
//! [`ClusterAccess`], then projects or renders the result as text.

use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use kmcp_core::{project_list, project_one, Gvk, MapperRegistry};
use kmcp_kubehub::resolve_mapping;
use kmcp_ops::LogOptions;
use metrics::{counter, histogram};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::args::ToolArgs;
use crate::backend::ClusterAccess;
use crate::guidance::enrich_context_error;
use crate::template::Template;

const CONTEXT_DESC: &str =
    "The Kubernetes context to use. To discover available contexts or resolve cluster aliases use the kubeconfig://contexts MCP resource.";
const DEFAULT_TAIL: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    ListResources,
    GetResource,
    ListApiResources,
    GetMetrics,
    GetPodLogs,
}

impl Tool {
    pub const ALL: [Tool; 5] = [Tool::ListResources, Tool::GetResource, Tool::ListApiResources, Tool::GetMetrics, Tool::GetPodLogs];

    pub fn name(self) -> &'static str {
        match self {
            Tool::ListResources => "list_k8s_resources",
            Tool::GetResource => "get_k8s_resource",
            Tool::ListApiResources => "list_k8s_api_resources",
            Tool::GetMetrics => "get_k8s_metrics",
            Tool::GetPodLogs => "get_k8s_pod_logs",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> { Self::ALL.into_iter().find(|t| t.name() == name) }

    pub fn description(self) -> &'static str {
        match self {
            Tool::ListResources => "List Kubernetes resources of one kind, projected to a compact per-kind summary",
            Tool::GetResource => "Get a single Kubernetes resource with optional field-path template formatting",
            Tool::ListApiResources => "List available Kubernetes API resources (equivalent to `kubectl api-resources`)",
            Tool::GetMetrics => "Get Kubernetes resource metrics (CPU/memory usage) for nodes or pods, similar to kubectl top",
            Tool::GetPodLogs => "Get logs from a Kubernetes pod, similar to kubectl logs",
        }
    }

    pub fn input_schema(self) -> Value {
        let context = json!({"type": "string", "description": CONTEXT_DESC});
        let group = json!({"type": "string", "description": "The Kubernetes resource API Group. Empty for the core group."});
        let version = json!({"type": "string", "description": "The Kubernetes resource API Version.", "default": "v1"});
        let kind = json!({"type": "string", "description": "The Kubernetes resource Kind."});
        match self {
            Tool::ListResources => json!({
                "type": "object",
                "properties": {
                    "context": context,
                    "namespace": {"type": "string", "description": "The Kubernetes namespace to use. Defaults to all namespaces."},
                    "group": group,
                    "version": version,
                    "kind": kind,
                },
                "required": ["context", "kind"],
            }),
            Tool::GetResource => json!({
                "type": "object",
                "properties": {
                    "context": context,
                    "name": {"type": "string", "description": "The name of the resource to fetch."},
                    "namespace": {"type": "string", "description": "The Kubernetes namespace to use. Required for namespaced resources."},
                    "group": group,
                    "version": version,
                    "kind": kind,
                    "go_template": {
                        "type": "string",
                        "description": "Optional field-path template for formatting output (e.g., '{{.metadata.name}}: {{.status.phase}}')."
                    },
                },
                "required": ["context", "name", "kind"],
            }),
            Tool::ListApiResources => json!({
                "type": "object",
                "properties": {
                    "context": context,
                    "group": {"type": "string", "description": "Filter by API group ('core' or empty for the core group). Omit for all groups."},
                },
                "required": ["context"],
            }),
            Tool::GetMetrics => json!({
                "type": "object",
                "properties": {
                    "context": context,
                    "kind": {"type": "string", "enum": ["node", "pod"], "description": "The resource type to get metrics for. Must be 'node' or 'pod'."},
                    "namespace": {"type": "string", "description": "Ignored for nodes. If not provided for pods, shows metrics for all namespaces."},
                },
                "required": ["context", "kind"],
            }),
            Tool::GetPodLogs => json!({
                "type": "object",
                "properties": {
                    "context": context,
                    "namespace": {"type": "string", "description": "The Kubernetes namespace of the pod."},
                    "name": {"type": "string", "description": "The name of the pod to get logs from."},
                    "container": {"type": "string", "description": "Optional container name. If not specified, uses the default container."},
                    "since": {"type": "string", "description": "Return logs since a relative time (e.g., '5m', '1h', '30s'). Cannot be used with sinceTime."},
                    "sinceTime": {"type": "string", "description": "Return logs since an RFC3339 timestamp. Cannot be used with since."},
                    "tail": {"type": "number", "description": "Number of lines to return from the end of the log. Defaults to 10.", "default": DEFAULT_TAIL},
                    "previous": {"type": "boolean", "description": "Return logs from the previous terminated container instance."},
                },
                "required": ["context", "namespace", "name"],
            }),
        }
    }

    /// `tools/list` entry.
    pub fn describe(self) -> Value {
        json!({"name": self.name(), "description": self.description(), "inputSchema": self.input_schema()})
    }
}

/// Text handed back to the agent; `is_error` marks a failed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self { Self { text: text.into(), is_error: false } }

    pub fn error(text: impl Into<String>) -> Self { Self { text: text.into(), is_error: true } }

    pub fn into_result(self) -> Value {
        json!({"content": [{"type": "text", "text": self.text}], "isError": self.is_error})
    }
}

fn to_json_text<T: Serialize + ?Sized>(v: &T) -> Result<String> {
    serde_json::to_string(v).context("failed to encode result")
}

/// Run `tool` and fold any failure into an error output.
pub async fn call_tool(tool: Tool, registry: &MapperRegistry, cluster: &dyn ClusterAccess, arguments: &Value) -> ToolOutput {
    let started = Instant::now();
    let args = ToolArgs::new(arguments);
    let res = match tool {
        Tool::ListResources => list_resources(registry, cluster, &args).await,
        Tool::GetResource => get_resource(registry, cluster, &args).await,
        Tool::ListApiResources => list_api_resources(cluster, &args).await,
        Tool::GetMetrics => get_metrics(cluster, &args).await,
        Tool::GetPodLogs => get_pod_logs(cluster, &args).await,
    };
    let ms = started.elapsed().as_secs_f64() * 1000.0;
    counter!("kmcp_tool_calls_total", 1u64, "tool" => tool.name());
    histogram!("kmcp_tool_call_ms", ms, "tool" => tool.name());
    match res {
        Ok(text) => {
            debug!(tool = tool.name(), took_ms = ms, bytes = text.len(), "tool ok");
            ToolOutput::text(text)
        }
        Err(e) => {
            counter!("kmcp_tool_errors_total", 1u64, "tool" => tool.name());
            let msg = enrich_context_error(&format!("{e:#}"));
            warn!(tool = tool.name(), took_ms = ms, error = %msg, "tool failed");
            ToolOutput::error(msg)
        }
    }
}

fn gvk_from(args: &ToolArgs) -> Result<Gvk> {
    let kind = args.require_str("kind")?;
    Ok(Gvk::new(args.str_or("group", ""), args.str_or("version", "v1"), kind))
}

async fn list_resources(registry: &MapperRegistry, cluster: &dyn ClusterAccess, args: &ToolArgs) -> Result<String> {
    let context = args.require_str("context")?;
    let gvk = gvk_from(args)?;
    let namespace = args.str_or("namespace", "");
    let mapping = resolve_mapping(cluster, &context, &gvk).await?;
    let items = cluster.list(&context, &mapping, &namespace).await.context("Failed to list resources")?;
    info!(context = %context, gvk = %gvk, ns = %namespace, count = items.len(), "list_k8s_resources");
    to_json_text(&project_list(registry, &items, &gvk))
}

async fn get_resource(registry: &MapperRegistry, cluster: &dyn ClusterAccess, args: &ToolArgs) -> Result<String> {
    let context = args.require_str("context")?;
    let name = args.require_str("name")?;
    let gvk = gvk_from(args)?;
    let namespace = args.str_or("namespace", "");
    let template = args.str_or("go_template", "");
    let parsed = if template.is_empty() {
        None
    } else {
        Some(Template::parse(&template).map_err(|e| anyhow!("Failed to parse template: {e}"))?)
    };
    let mapping = resolve_mapping(cluster, &context, &gvk).await?;
    let obj = cluster.get(&context, &mapping, &namespace, &name).await.context("Failed to get resource")?;
    info!(context = %context, gvk = %gvk, ns = %namespace, name = %name, templated = parsed.is_some(), "get_k8s_resource");
    match parsed {
        Some(t) => Ok(t.render(&obj)),
        None => to_json_text(&project_one(registry, &obj, &gvk)),
    }
}

async fn list_api_resources(cluster: &dyn ClusterAccess, args: &ToolArgs) -> Result<String> {
    let context = args.require_str("context")?;
    let group = args.str_or("group", "");
    let filter = if group.is_empty() { None } else { Some(group.as_str()) };
    let rows = cluster.api_resources(&context, filter).await?;
    info!(context = %context, group = %group, count = rows.len(), "list_k8s_api_resources");
    to_json_text(&rows)
}

async fn get_metrics(cluster: &dyn ClusterAccess, args: &ToolArgs) -> Result<String> {
    let context = args.require_str("context")?;
    let kind = args.require_str("kind")?.to_lowercase();
    let namespace = args.str_or("namespace", "");
    match kind.as_str() {
        "node" => {
            let rows = cluster.node_metrics(&context).await.context("Failed to get node metrics")?;
            to_json_text(&rows)
        }
        "pod" => {
            let rows = cluster.pod_metrics(&context, &namespace).await.context("Failed to get pod metrics")?;
            to_json_text(&rows)
        }
        _ => Err(anyhow!("kind must be 'node' or 'pod'")),
    }
}

async fn get_pod_logs(cluster: &dyn ClusterAccess, args: &ToolArgs) -> Result<String> {
    let context = args.require_str("context")?;
    let namespace = args.require_str("namespace")?;
    let name = args.require_str("name")?;
    let opts = LogOptions::from_args(
        &args.str_or("container", ""),
        &args.str_or("since", ""),
        &args.str_or("sinceTime", ""),
        args.i64_or("tail", DEFAULT_TAIL),
        args.bool_or("previous", false),
    )?;
    cluster.pod_logs(&context, &namespace, &name, &opts).await.context("Failed to get pod logs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for t in Tool::ALL {
            assert_eq!(Tool::from_name(t.name()), Some(t));
        }
        assert_eq!(Tool::from_name("delete_k8s_resource"), None);
    }

    #[test]
    fn schemas_declare_required_context() {
        for t in Tool::ALL {
            let d = t.describe();
            assert_eq!(d["inputSchema"]["type"], "object");
            let required: Vec<&str> = d["inputSchema"]["required"].as_array().unwrap().iter().filter_map(|v| v.as_str()).collect();
            assert!(required.contains(&"context"), "{}", t.name());
            for r in required {
                assert!(d["inputSchema"]["properties"].get(r).is_some(), "{} lacks {r}", t.name());
            }
        }
    }

    #[test]
    fn output_shape() {
        let v = ToolOutput::error("boom").into_result();
        assert_eq!(v["isError"], true);
        assert_eq!(v["content"][0]["type"], "text");
        assert_eq!(v["content"][0]["text"], "boom");
    }
}
