//! Static resources: the kubeconfig context listing.

use anyhow::{anyhow, Context, Result};
use serde_json::{json, Value};

use crate::backend::ClusterAccess;
use crate::guidance::CONTEXTS_URI;

const CONTEXTS_NAME: &str = "kubeconfig_contexts";
const JSON_MIME: &str = "application/json";

/// `resources/list` payload.
pub fn list() -> Value {
    json!({
        "resources": [{
            "uri": CONTEXTS_URI,
            "name": CONTEXTS_NAME,
            "description": "Kubeconfig contexts of the current user, mapping context names to cluster names. Use it to resolve \
                cluster aliases like 'prod' or 'sandbox' to real context names instead of running `kubectl config`.",
            "mimeType": JSON_MIME,
        }]
    })
}

/// `resources/read` payload for `uri`.
pub fn read(cluster: &dyn ClusterAccess, uri: &str) -> Result<Value> {
    if uri != CONTEXTS_URI { return Err(anyhow!("unknown resource: {uri}")); }
    let contexts = cluster.contexts()?;
    let text = serde_json::to_string(&contexts).context("failed to marshal contexts")?;
    Ok(json!({"contents": [{"uri": CONTEXTS_URI, "mimeType": JSON_MIME, "text": text}]}))
}
