//! Dynamic reads against a resolved endpoint and API-resource discovery.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::future::join_all;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::APIResourceList;
use kube::api::{Api, DynamicObject, ListParams};
use kube::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::client::{client_for_context, ClusterOptions};
use crate::mapping::{DiscoveryRestMapper, ResolveError, RestMapper, RestMapperProvider, RestMapping};

/// One row of `kubectl api-resources`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiResourceInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub short_names: Vec<String>,
    pub api_version: String,
    pub namespaced: bool,
    pub kind: String,
}

/// Entry point for cluster reads; builds a fresh client per call.
#[derive(Debug, Clone, Default)]
pub struct KubeHub {
    opts: ClusterOptions,
}

impl KubeHub {
    pub fn new(opts: ClusterOptions) -> Self { Self { opts } }

    pub fn options(&self) -> &ClusterOptions { &self.opts }

    pub async fn client(&self, context: &str) -> Result<Client> { client_for_context(context, &self.opts).await }

    fn dynamic_api(client: Client, mapping: &RestMapping, namespace: &str) -> Api<DynamicObject> {
        let ar = mapping.api_resource();
        if mapping.namespaced && !namespace.is_empty() {
            Api::namespaced_with(client, namespace, &ar)
        } else {
            Api::all_with(client, &ar)
        }
    }

    /// List objects; an empty namespace lists across all namespaces.
    pub async fn list(&self, context: &str, mapping: &RestMapping, namespace: &str) -> Result<Vec<Value>> {
        let client = self.client(context).await?;
        let api = Self::dynamic_api(client, mapping, namespace);
        let list = api
            .list(&ListParams::default())
            .await
            .with_context(|| format!("failed to list {}", mapping.resource))?;
        info!(context = %context, gvr = %mapping.resource, ns = %namespace, count = list.items.len(), "listed");
        list.items.iter().map(|o| serde_json::to_value(o).context("serializing DynamicObject")).collect()
    }

    pub async fn get(&self, context: &str, mapping: &RestMapping, namespace: &str, name: &str) -> Result<Value> {
        let client = self.client(context).await?;
        let api = Self::dynamic_api(client, mapping, namespace);
        let obj = api
            .get(name)
            .await
            .with_context(|| format!("failed to get {} \"{}\"", mapping.resource, name))?;
        debug!(context = %context, gvr = %mapping.resource, ns = %namespace, name = %name, "fetched");
        serde_json::to_value(&obj).context("serializing DynamicObject")
    }

    /// Every served group/version with its resources. Individual
    /// group/version failures are skipped as long as something was listed.
    pub async fn api_resources(&self, context: &str, group: Option<&str>) -> Result<Vec<ApiResourceInfo>> {
        let client = self.client(context).await?;
        let mut group_versions: Vec<String> = Vec::new();
        let mut last_err: Option<anyhow::Error> = None;

        match client.list_core_api_versions().await {
            Ok(core) => group_versions.extend(core.versions),
            Err(e) => last_err = Some(anyhow!(e).context("listing core api versions")),
        }
        match client.list_api_groups().await {
            Ok(groups) => {
                for g in groups.groups {
                    group_versions.extend(g.versions.into_iter().map(|v| v.group_version));
                }
            }
            Err(e) => last_err = Some(anyhow!(e).context("listing api groups")),
        }

        let fetches = group_versions.iter().map(|gv| {
            let client = client.clone();
            async move {
                if gv.contains('/') { client.list_api_group_resources(gv).await } else { client.list_core_api_resources(gv).await }
            }
        });
        let mut lists: Vec<APIResourceList> = Vec::new();
        for (gv, res) in group_versions.iter().zip(join_all(fetches).await) {
            match res {
                Ok(list) => lists.push(list),
                Err(e) => {
                    warn!(context = %context, group_version = %gv, error = %e, "api resource discovery failed");
                    last_err = Some(anyhow!(e).context(format!("listing resources for {gv}")));
                }
            }
        }
        if lists.is_empty() {
            return Err(last_err.unwrap_or_else(|| anyhow!("no api resources discovered")).context("failed to get API resources"));
        }
        Ok(flatten_api_resources(&lists, group))
    }
}

#[async_trait]
impl RestMapperProvider for KubeHub {
    async fn rest_mapper(&self, context: &str, group: &str) -> Result<Box<dyn RestMapper + Send + Sync>, ResolveError> {
        let client = self.client(context).await.map_err(|e| ResolveError::Client(format!("{e:#}")))?;
        Ok(Box::new(DiscoveryRestMapper::discover(&client, group).await?))
    }
}

/// `""` and `"core"` select the core `v1` group; anything else compares the
/// group part of `group_version`.
pub fn matches_group(group_version: &str, filter: &str) -> bool {
    if filter.is_empty() || filter == "core" {
        return group_version == "v1";
    }
    match group_version.split_once('/') {
        Some((group, _)) => group == filter,
        None => false,
    }
}

/// Flatten discovery lists into rows, dropping subresources.
pub fn flatten_api_resources(lists: &[APIResourceList], group: Option<&str>) -> Vec<ApiResourceInfo> {
    let mut out = Vec::new();
    for list in lists {
        if let Some(filter) = group.filter(|g| !g.is_empty()) {
            if !matches_group(&list.group_version, filter) { continue; }
        }
        for r in &list.resources {
            if r.name.contains('/') { continue; }
            out.push(ApiResourceInfo {
                name: r.name.clone(),
                short_names: r.short_names.clone().unwrap_or_default(),
                api_version: list.group_version.clone(),
                namespaced: r.namespaced,
                kind: r.kind.clone(),
            });
        }
    }
    out
}
