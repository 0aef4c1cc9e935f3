//! apps/v1 controllers: Deployment, StatefulSet, DaemonSet.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::{object_age, to_projection};
use crate::extract::{self, is_zero};
use crate::{Gvk, MapperRegistry, Projection};

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentProjection {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ready: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub up_to_date: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub available: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub age: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatefulSetProjection {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ready: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub age: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DaemonSetProjection {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub desired: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub current: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub ready: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub up_to_date: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub available: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub age: String,
}

/// `ready/desired`, with ready defaulting to 0; empty when desired is unknown.
fn ready_ratio(obj: &Value, desired_ptr: &str) -> String {
    match extract::i64_at(obj, desired_ptr) {
        Some(desired) => format!("{}/{}", extract::i64_at(obj, "/status/readyReplicas").unwrap_or(0), desired),
        None => String::new(),
    }
}

pub fn deployment_at(obj: &Value, now: DateTime<Utc>) -> DeploymentProjection {
    DeploymentProjection {
        name: extract::name(obj),
        namespace: extract::namespace(obj),
        ready: ready_ratio(obj, "/status/replicas"),
        up_to_date: extract::i64_at(obj, "/status/updatedReplicas").unwrap_or(0),
        available: extract::i64_at(obj, "/status/availableReplicas").unwrap_or(0),
        age: object_age(obj, now),
    }
}

pub fn statefulset_at(obj: &Value, now: DateTime<Utc>) -> StatefulSetProjection {
    StatefulSetProjection {
        name: extract::name(obj),
        namespace: extract::namespace(obj),
        ready: ready_ratio(obj, "/spec/replicas"),
        age: object_age(obj, now),
    }
}

pub fn daemonset_at(obj: &Value, now: DateTime<Utc>) -> DaemonSetProjection {
    let n = |ptr: &str| extract::i64_at(obj, ptr).unwrap_or(0);
    DaemonSetProjection {
        name: extract::name(obj),
        namespace: extract::namespace(obj),
        desired: n("/status/desiredNumberScheduled"),
        current: n("/status/currentNumberScheduled"),
        ready: n("/status/numberReady"),
        up_to_date: n("/status/updatedNumberScheduled"),
        available: n("/status/numberAvailable"),
        age: object_age(obj, now),
    }
}

pub fn map_deployment(obj: &Value) -> Projection { to_projection(&deployment_at(obj, Utc::now())) }

pub fn map_statefulset(obj: &Value) -> Projection { to_projection(&statefulset_at(obj, Utc::now())) }

pub fn map_daemonset(obj: &Value) -> Projection { to_projection(&daemonset_at(obj, Utc::now())) }

pub fn register(reg: &mut MapperRegistry) {
    reg.register_fn(&Gvk::new("apps", "v1", "Deployment"), map_deployment);
    reg.register_fn(&Gvk::new("apps", "v1", "StatefulSet"), map_statefulset);
    reg.register_fn(&Gvk::new("apps", "v1", "DaemonSet"), map_daemonset);
}
