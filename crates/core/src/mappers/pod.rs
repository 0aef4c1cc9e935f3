use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::{object_age, to_projection};
use crate::extract::{self, is_zero};
use crate::{parse_memory_to_mib, Gvk, MapperRegistry, Projection};

const OOM_KILLED: &str = "OOMKilled";

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PodProjection {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ready: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub restarts: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub age: String,
    #[serde(rename = "memoryRequestMiB", skip_serializing_if = "is_zero")]
    pub memory_request_mib: i64,
    #[serde(rename = "memoryLimitMiB", skip_serializing_if = "is_zero")]
    pub memory_limit_mib: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub oom_kills: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_termination_reason: String,
}

pub fn pod_at(obj: &Value, now: DateTime<Utc>) -> PodProjection {
    let mut out = PodProjection {
        name: extract::name(obj),
        namespace: extract::namespace(obj),
        status: extract::string_at(obj, "/status/phase"),
        age: object_age(obj, now),
        ..Default::default()
    };

    if let Some(containers) = extract::array_at(obj, "/spec/containers") {
        for c in containers {
            if let Some(q) = extract::str_at(c, "/resources/requests/memory") { out.memory_request_mib = out.memory_request_mib.saturating_add(parse_memory_to_mib(q)); }
            if let Some(q) = extract::str_at(c, "/resources/limits/memory") { out.memory_limit_mib = out.memory_limit_mib.saturating_add(parse_memory_to_mib(q)); }
        }
    }

    if let Some(statuses) = extract::array_at(obj, "/status/containerStatuses") {
        let mut ready = 0usize;
        for cs in statuses {
            if extract::bool_at(cs, "/ready") == Some(true) { ready += 1; }
            out.restarts = out.restarts.saturating_add(extract::i64_at(cs, "/restartCount").unwrap_or(0));
            // last and current termination are counted independently
            if let Some(reason) = extract::str_at(cs, "/lastState/terminated/reason") {
                out.last_termination_reason = reason.to_string();
                if reason == OOM_KILLED { out.oom_kills = out.oom_kills.saturating_add(1); }
            }
            if extract::str_at(cs, "/state/terminated/reason") == Some(OOM_KILLED) { out.oom_kills = out.oom_kills.saturating_add(1); }
        }
        out.ready = format!("{}/{}", ready, statuses.len());
    }
    out
}

pub fn map_pod(obj: &Value) -> Projection { to_projection(&pod_at(obj, Utc::now())) }

pub fn register(reg: &mut MapperRegistry) {
    reg.register_fn(&Gvk::new("", "v1", "Pod"), map_pod);
}
