//! Discovery-backed REST mapping and the GVK→GVR resolver.

use async_trait::async_trait;
use kube::{core::ApiResource, Client};
use kube::discovery::{self, ApiCapabilities, Scope};
use kmcp_core::{normalize_kind, Gvk, Gvr};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("failed to create k8s clients: {0}")]
    Client(String),
    #[error("failed to map kind to resource: {0}")]
    Discovery(#[source] kube::Error),
    #[error("failed to map kind to resource: no matches for kind \"{kind}\" in version \"{api_version}\"")]
    UnknownKind { kind: String, api_version: String },
    #[error("failed to map kind to resource: the server does not serve \"{api_version}\"")]
    UnknownGroupVersion { api_version: String },
}

impl ResolveError {
    fn outcome(&self) -> &'static str {
        match self {
            ResolveError::Client(_) => "client_error",
            ResolveError::Discovery(_) => "discovery_error",
            ResolveError::UnknownKind { .. } => "unknown_kind",
            ResolveError::UnknownGroupVersion { .. } => "unknown_group_version",
        }
    }
}

/// Where a kind is served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestMapping {
    pub resource: Gvr,
    /// Kind as spelled by the server.
    pub kind: String,
    pub namespaced: bool,
}

impl RestMapping {
    pub fn api_resource(&self) -> ApiResource {
        let api_version = if self.resource.group.is_empty() {
            self.resource.version.clone()
        } else {
            format!("{}/{}", self.resource.group, self.resource.version)
        };
        ApiResource {
            group: self.resource.group.clone(),
            version: self.resource.version.clone(),
            api_version,
            kind: self.kind.clone(),
            plural: self.resource.resource_plural.clone(),
        }
    }
}

pub trait RestMapper {
    fn rest_mapping(&self, group: &str, kind: &str, version: &str) -> Result<RestMapping, ResolveError>;
}

/// Source of REST mappers scoped to one context.
#[async_trait]
pub trait RestMapperProvider: Send + Sync {
    async fn rest_mapper(&self, context: &str, group: &str) -> Result<Box<dyn RestMapper + Send + Sync>, ResolveError>;
}

/// Snapshot of one API group's discovery document.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryRestMapper {
    pub group: String,
    pub preferred_version: String,
    pub served_versions: Vec<String>,
    pub resources: Vec<(ApiResource, ApiCapabilities)>,
}

impl DiscoveryRestMapper {
    /// Query discovery for `group` (`""` is the core group).
    pub async fn discover(client: &Client, group: &str) -> Result<Self, ResolveError> {
        let api_group = match discovery::group(client, group).await {
            Ok(g) => g,
            Err(kube::Error::Discovery(_)) => {
                return Err(ResolveError::UnknownGroupVersion { api_version: if group.is_empty() { "v1".into() } else { group.to_string() } })
            }
            Err(e) => return Err(ResolveError::Discovery(e)),
        };
        let served_versions: Vec<String> = api_group.versions().map(str::to_string).collect();
        let mut resources = Vec::new();
        for v in &served_versions {
            resources.extend(api_group.versioned_resources(v));
        }
        Ok(Self { group: group.to_string(), preferred_version: api_group.preferred_version_or_latest().to_string(), served_versions, resources })
    }
}

impl RestMapper for DiscoveryRestMapper {
    fn rest_mapping(&self, group: &str, kind: &str, version: &str) -> Result<RestMapping, ResolveError> {
        let version = if version.is_empty() { self.preferred_version.as_str() } else { version };
        let api_version = if group.is_empty() { version.to_string() } else { format!("{group}/{version}") };
        if group != self.group || !self.served_versions.iter().any(|v| v == version) {
            return Err(ResolveError::UnknownGroupVersion { api_version });
        }
        pick_resource(&self.resources, group, version, kind).ok_or(ResolveError::UnknownKind { kind: kind.to_string(), api_version })
    }
}

/// Case-insensitive kind match among discovered resources of one group/version.
pub fn pick_resource(resources: &[(ApiResource, ApiCapabilities)], group: &str, version: &str, kind: &str) -> Option<RestMapping> {
    resources
        .iter()
        .find(|(ar, _)| ar.group == group && ar.version == version && ar.kind.eq_ignore_ascii_case(kind))
        .map(|(ar, caps)| RestMapping {
            resource: Gvr { group: ar.group.clone(), version: ar.version.clone(), resource_plural: ar.plural.clone() },
            kind: ar.kind.clone(),
            namespaced: matches!(caps.scope, Scope::Namespaced),
        })
}

/// Resolve a caller-supplied identity to its REST endpoint. Every call
/// consults discovery afresh.
pub async fn resolve_mapping<P>(provider: &P, context: &str, gvk: &Gvk) -> Result<RestMapping, ResolveError>
where
    P: RestMapperProvider + ?Sized,
{
    let kind = normalize_kind(&gvk.kind);
    let res = match provider.rest_mapper(context, &gvk.group).await {
        Ok(mapper) => mapper.rest_mapping(&gvk.group, &kind, &gvk.version),
        Err(e) => Err(e),
    };
    match &res {
        Ok(m) => {
            metrics::counter!("kmcp_resolve_total", 1u64, "outcome" => "ok");
            debug!(context = %context, gvk = %gvk, gvr = %m.resource, "resolved");
        }
        Err(e) => {
            metrics::counter!("kmcp_resolve_total", 1u64, "outcome" => e.outcome());
            info!(context = %context, gvk = %gvk, error = %e, "resolve failed");
        }
    }
    res
}

/// Contract form of [`resolve_mapping`]: the resolved GVR only.
pub async fn resolve<P>(provider: &P, context: &str, gvk: &Gvk) -> Result<Gvr, ResolveError>
where
    P: RestMapperProvider + ?Sized,
{
    resolve_mapping(provider, context, gvk).await.map(|m| m.resource)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn ar(group: &str, version: &str, kind: &str, plural: &str) -> ApiResource {
        let api_version = if group.is_empty() { version.to_string() } else { format!("{group}/{version}") };
        ApiResource { group: group.into(), version: version.into(), api_version, kind: kind.into(), plural: plural.into() }
    }

    fn caps(scope: Scope) -> ApiCapabilities { ApiCapabilities { scope, subresources: vec![], operations: vec![] } }

    fn apps() -> DiscoveryRestMapper {
        DiscoveryRestMapper {
            group: "apps".into(),
            preferred_version: "v1".into(),
            served_versions: vec!["v1".into()],
            resources: vec![
                (ar("apps", "v1", "Deployment", "deployments"), caps(Scope::Namespaced)),
                (ar("apps", "v1", "StatefulSet", "statefulsets"), caps(Scope::Namespaced)),
            ],
        }
    }

    #[test]
    fn multi_word_kind_resolves_despite_normalization() {
        let m = apps().rest_mapping("apps", &normalize_kind("statefulset"), "v1").unwrap();
        assert_eq!(m.resource.resource_plural, "statefulsets");
        assert_eq!(m.kind, "StatefulSet");
        assert!(m.namespaced);
        assert_eq!(m.api_resource().api_version, "apps/v1");
    }

    #[test]
    fn unknown_kind_and_version() {
        let err = apps().rest_mapping("apps", "Widget", "v1").unwrap_err();
        assert_eq!(err.to_string(), "failed to map kind to resource: no matches for kind \"Widget\" in version \"apps/v1\"");
        let err = apps().rest_mapping("apps", "Deployment", "v1beta9").unwrap_err();
        assert!(matches!(err, ResolveError::UnknownGroupVersion { .. }));
    }

    #[test]
    fn empty_version_uses_preferred() {
        let m = apps().rest_mapping("apps", "Deployment", "").unwrap();
        assert_eq!(m.resource, Gvr { group: "apps".into(), version: "v1".into(), resource_plural: "deployments".into() });
    }

    #[test]
    fn cluster_scoped_pick() {
        let rs = vec![(ar("", "v1", "Node", "nodes"), caps(Scope::Cluster)), (ar("", "v1", "Pod", "pods"), caps(Scope::Namespaced))];
        let m = pick_resource(&rs, "", "v1", "NODE").unwrap();
        assert!(!m.namespaced);
        assert_eq!(m.resource.to_string(), "v1/nodes");
        assert!(pick_resource(&rs, "apps", "v1", "Pod").is_none());
    }

    struct Recording {
        seen: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl RestMapperProvider for Recording {
        async fn rest_mapper(&self, context: &str, group: &str) -> Result<Box<dyn RestMapper + Send + Sync>, ResolveError> {
            self.seen.lock().unwrap().push((context.to_string(), group.to_string()));
            if self.fail { return Err(ResolveError::Client("context \"nope\" does not exist in kubeconfig".into())); }
            Ok(Box::new(apps()))
        }
    }

    #[tokio::test]
    async fn resolve_normalizes_and_never_caches() {
        let p = Recording { seen: Mutex::new(vec![]), fail: false };
        for kind in ["deployment", "DEPLOYMENT"] {
            let gvr = resolve(&p, "prod", &Gvk::new("apps", "v1", kind)).await.unwrap();
            assert_eq!(gvr.resource_plural, "deployments");
        }
        assert_eq!(p.seen.lock().unwrap().len(), 2);
        assert_eq!(p.seen.lock().unwrap()[0], ("prod".to_string(), "apps".to_string()));
    }

    #[tokio::test]
    async fn resolve_surfaces_client_errors() {
        let p = Recording { seen: Mutex::new(vec![]), fail: true };
        let err = resolve(&p, "nope", &Gvk::new("apps", "v1", "Deployment")).await.unwrap_err();
        assert_eq!(err.to_string(), "failed to create k8s clients: context \"nope\" does not exist in kubeconfig");
    }
}
