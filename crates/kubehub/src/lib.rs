//! kmcp kubehub – per-context kube clients, discovery-backed GVK→GVR
//! resolution and dynamic list/get.

#![forbid(unsafe_code)]

pub mod client;
pub mod hub;
pub mod mapping;

pub use client::{client_for_context, contexts_from, ensure_context, list_contexts, ClusterOptions, ContextInfo};
pub use hub::{flatten_api_resources, matches_group, ApiResourceInfo, KubeHub};
pub use mapping::{
    pick_resource, resolve, resolve_mapping, DiscoveryRestMapper, ResolveError, RestMapper, RestMapperProvider, RestMapping,
};

/// Parse `v1/Kind` or `group/version/Kind`.
pub fn parse_gvk_key(key: &str) -> anyhow::Result<kmcp_core::Gvk> {
    let parts: Vec<_> = key.split('/').collect();
    match parts.as_slice() {
        [version, kind] => Ok(kmcp_core::Gvk::new("", *version, *kind)),
        [group, version, kind] => Ok(kmcp_core::Gvk::new(*group, *version, *kind)),
        _ => Err(anyhow::anyhow!("invalid gvk key: {} (expect v1/Kind or group/v1/Kind)", key)),
    }
}
