//! kmcp api – the agent-tool protocol surface: JSON-RPC envelopes, the
//! tool/prompt/resource catalogs and the stdio serve loop.
//!
//! Handlers reach the cluster only through [`ClusterAccess`], so the whole
//! surface can be driven in-process against a fake backend.

#![forbid(unsafe_code)]

pub mod args;
pub mod backend;
pub mod guidance;
pub mod jsonrpc;
pub mod prompts;
pub mod resources;
pub mod server;
pub mod template;
pub mod tools;

pub use args::{ToolArgs, ToolError};
pub use backend::{ClusterAccess, KubeBackend};
pub use guidance::enrich_context_error;
pub use jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use server::McpServer;
pub use template::{Template, TemplateError};
pub use tools::{call_tool, Tool, ToolOutput};
