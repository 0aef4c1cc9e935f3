//! Request dispatch and the newline-delimited stdio loop.

use std::sync::Arc;

use anyhow::{Context, Result};
use kmcp_core::MapperRegistry;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::backend::ClusterAccess;
use crate::jsonrpc::{JsonRpcRequest, JsonRpcResponse, INVALID_PARAMS, INVALID_REQUEST, JSONRPC_VERSION, METHOD_NOT_FOUND, PARSE_ERROR};
use crate::tools::{call_tool, Tool};
use crate::{prompts, resources};

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "kmcp";

const INSTRUCTIONS: &str = "Read-only access to Kubernetes clusters selected by kubeconfig context. \
Nothing here can modify a cluster. Read the kubeconfig://contexts resource to find context names and to resolve \
aliases such as 'prod' or 'staging'. Tools: list_k8s_resources, get_k8s_resource, list_k8s_api_resources, \
get_k8s_metrics, get_k8s_pod_logs. Custom resources are supported through discovery. Prompts: \
memory_pressure_analysis, workload_instability_analysis.";

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Deserialize)]
struct ReadParams {
    uri: String,
}

#[derive(Debug, Deserialize)]
struct PromptGetParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// Protocol server over an immutable mapper registry and a cluster backend.
#[derive(Clone)]
pub struct McpServer {
    registry: Arc<MapperRegistry>,
    cluster: Arc<dyn ClusterAccess>,
}

impl McpServer {
    pub fn new(registry: Arc<MapperRegistry>, cluster: Arc<dyn ClusterAccess>) -> Self { Self { registry, cluster } }

    /// Handle one request. Notifications produce no response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            debug!(method = %request.method, "notification");
            return None;
        }
        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(request.id, INVALID_REQUEST, "Invalid JSON-RPC version"));
        }
        let id = request.id;
        let params = request.params;
        let resp = match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(id, self.initialize_result()),
            "ping" | "notifications/initialized" | "initialized" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => {
                let tools: Vec<Value> = Tool::ALL.iter().map(|t| t.describe()).collect();
                JsonRpcResponse::success(id, json!({ "tools": tools }))
            }
            "tools/call" => self.tools_call(id, params).await,
            "resources/list" => JsonRpcResponse::success(id, resources::list()),
            "resources/read" => self.resources_read(id, params),
            "prompts/list" => JsonRpcResponse::success(id, prompts::list()),
            "prompts/get" => Self::prompts_get(id, params),
            other => {
                debug!(method = %other, "unknown method");
                JsonRpcResponse::error(id, METHOD_NOT_FOUND, format!("Method not found: {other}"))
            }
        };
        Some(resp)
    }

    fn initialize_result(&self) -> Value {
        info!(mappers = self.registry.len(), "client initialized");
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {"listChanged": false},
                "resources": {"subscribe": false, "listChanged": false},
                "prompts": {"listChanged": false},
            },
            "serverInfo": {"name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION")},
            "instructions": INSTRUCTIONS,
        })
    }

    async fn tools_call(&self, id: Option<Value>, params: Value) -> JsonRpcResponse {
        let p: ToolCallParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {e}")),
        };
        let Some(tool) = Tool::from_name(&p.name) else {
            return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Unknown tool: {}", p.name));
        };
        let out = call_tool(tool, &self.registry, self.cluster.as_ref(), &p.arguments).await;
        JsonRpcResponse::success(id, out.into_result())
    }

    fn resources_read(&self, id: Option<Value>, params: Value) -> JsonRpcResponse {
        let p: ReadParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {e}")),
        };
        match resources::read(self.cluster.as_ref(), &p.uri) {
            Ok(v) => JsonRpcResponse::success(id, v),
            Err(e) => {
                warn!(uri = %p.uri, error = %format!("{e:#}"), "resource read failed");
                JsonRpcResponse::error(id, INVALID_PARAMS, format!("{e:#}"))
            }
        }
    }

    fn prompts_get(id: Option<Value>, params: Value) -> JsonRpcResponse {
        let p: PromptGetParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {e}")),
        };
        match prompts::get(&p.name, &p.arguments) {
            Ok(v) => JsonRpcResponse::success(id, v),
            Err(e) => JsonRpcResponse::error(id, INVALID_PARAMS, e.to_string()),
        }
    }

    /// Serve newline-delimited JSON-RPC until `reader` hits EOF.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await.context("reading request")? {
            let line = line.trim();
            if line.is_empty() { continue; }
            let resp = match serde_json::from_str::<JsonRpcRequest>(line) {
                Ok(req) => self.handle_request(req).await,
                Err(e) => {
                    warn!(error = %e, "unparseable request");
                    Some(JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {e}")))
                }
            };
            if let Some(resp) = resp {
                let mut out = serde_json::to_string(&resp).context("encoding response")?;
                out.push('\n');
                writer.write_all(out.as_bytes()).await.context("writing response")?;
                writer.flush().await.context("flushing response")?;
            }
        }
        info!("input closed");
        Ok(())
    }

    pub async fn serve_stdio(&self) -> Result<()> {
        info!("listening on stdio");
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
    }
}
