use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::{object_age, to_projection};
use crate::extract;
use crate::{Gvk, MapperRegistry, Projection};

const ROLE_PREFIX: &str = "node-role.kubernetes.io/";
const NO_ROLES: &str = "<none>";

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NodeProjection {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub age: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(rename = "internalIP", skip_serializing_if = "String::is_empty")]
    pub internal_ip: String,
    #[serde(rename = "externalIP", skip_serializing_if = "String::is_empty")]
    pub external_ip: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub os_image: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub kernel_version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub container_runtime: String,
}

pub fn node_at(obj: &Value, now: DateTime<Utc>) -> NodeProjection {
    let mut out = NodeProjection {
        name: extract::name(obj),
        age: object_age(obj, now),
        version: extract::string_at(obj, "/status/nodeInfo/kubeletVersion"),
        os_image: extract::string_at(obj, "/status/nodeInfo/osImage"),
        kernel_version: extract::string_at(obj, "/status/nodeInfo/kernelVersion"),
        container_runtime: extract::string_at(obj, "/status/nodeInfo/containerRuntimeVersion"),
        ..Default::default()
    };

    for cond in extract::array_at(obj, "/status/conditions").into_iter().flatten() {
        if extract::str_at(cond, "/type") != Some("Ready") { continue; }
        if let Some(status) = extract::str_at(cond, "/status") {
            out.status = if status == "True" { "Ready" } else { "NotReady" }.to_string();
        }
    }

    if let Some(labels) = extract::object_at(obj, "/metadata/labels") {
        let mut roles: Vec<String> = labels
            .keys()
            .filter_map(|k| k.strip_prefix(ROLE_PREFIX))
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect();
        roles.sort();
        if roles.is_empty() { roles.push(NO_ROLES.to_string()); }
        out.roles = roles;
    }

    for addr in extract::array_at(obj, "/status/addresses").into_iter().flatten() {
        let (Some(kind), Some(ip)) = (extract::str_at(addr, "/type"), extract::str_at(addr, "/address")) else { continue };
        match kind {
            "InternalIP" => out.internal_ip = ip.to_string(),
            "ExternalIP" => out.external_ip = ip.to_string(),
            _ => {}
        }
    }
    out
}

pub fn map_node(obj: &Value) -> Projection { to_projection(&node_at(obj, Utc::now())) }

pub fn register(reg: &mut MapperRegistry) {
    reg.register_fn(&Gvk::new("", "v1", "Node"), map_node);
}
