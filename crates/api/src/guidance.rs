//! Error text rewriting at the protocol boundary.

pub const CONTEXTS_URI: &str = "kubeconfig://contexts";

const CONTEXT_HINT: &str =
    ". To discover available contexts or resolve cluster aliases, use the kubeconfig://contexts MCP resource";

/// Append a pointer to the contexts resource when `msg` reads like an unknown
/// kubeconfig context.
pub fn enrich_context_error(msg: &str) -> String {
    let about_context = msg.contains("context");
    let missing = ["does not exist", "not found", "no such context"].iter().any(|p| msg.contains(p));
    if about_context && missing { format!("{msg}{CONTEXT_HINT}") } else { msg.to_string() }
}
