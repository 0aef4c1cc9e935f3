//! Events from both `v1` and `events.k8s.io`, folded into one shape.
//!
//! The two API versions name the same data differently (`message` vs `note`,
//! `involvedObject` vs `regarding`, `firstTimestamp` vs `eventTime`); the
//! projection reads whichever is present.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::to_projection;
use crate::extract::{self, is_zero};
use crate::{age, Gvk, MapperRegistry, Projection};

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventProjection {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub event_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub reason: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub involved_object: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub source: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub count: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub first_timestamp: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_timestamp: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub event_time: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub age: String,
}

fn first_str<'a>(obj: &'a Value, ptrs: &[&str]) -> Option<&'a str> {
    ptrs.iter().find_map(|p| extract::str_at(obj, p).filter(|s| !s.is_empty()))
}

fn object_ref(obj: &Value) -> String {
    let target = ["/involvedObject", "/regarding"].iter().find_map(|p| obj.pointer(p).filter(|v| v.is_object()));
    match target {
        Some(t) => extract::join_pair(extract::str_at(t, "/kind"), extract::str_at(t, "/name"), "/"),
        None => String::new(),
    }
}

fn source(obj: &Value) -> String {
    for p in ["/source", "/deprecatedSource"] {
        if let Some(src) = obj.pointer(p).filter(|v| v.is_object()) {
            let s = extract::join_pair(extract::str_at(src, "/component"), extract::str_at(src, "/host"), "@");
            if !s.is_empty() { return s; }
        }
    }
    extract::join_pair(extract::str_at(obj, "/reportingController"), extract::str_at(obj, "/reportingInstance"), "@")
}

pub fn event_at(obj: &Value, now: DateTime<Utc>) -> EventProjection {
    let first_timestamp = extract::string_at(obj, "/firstTimestamp");
    let event_time = extract::string_at(obj, "/eventTime");
    let age = [
        Some(first_timestamp.as_str()),
        Some(event_time.as_str()),
        extract::str_at(obj, "/deprecatedFirstTimestamp"),
        extract::creation_timestamp(obj),
    ]
    .into_iter()
    .flatten()
    .find_map(|ts| age::age_between(ts, now))
    .unwrap_or_default();

    EventProjection {
        name: extract::name(obj),
        namespace: extract::namespace(obj),
        event_type: extract::string_at(obj, "/type"),
        reason: extract::string_at(obj, "/reason"),
        message: first_str(obj, &["/message", "/note"]).unwrap_or_default().to_string(),
        involved_object: object_ref(obj),
        source: source(obj),
        count: ["/count", "/series/count", "/deprecatedCount"]
            .iter()
            .find_map(|p| extract::i64_at(obj, p))
            .unwrap_or(0),
        first_timestamp,
        last_timestamp: first_str(obj, &["/lastTimestamp", "/series/lastObservedTime"]).unwrap_or_default().to_string(),
        event_time,
        age,
    }
}

pub fn map_event(obj: &Value) -> Projection { to_projection(&event_at(obj, Utc::now())) }

pub fn register(reg: &mut MapperRegistry) {
    reg.register_fn(&Gvk::new("", "v1", "Event"), map_event);
    reg.register_fn(&Gvk::new("events.k8s.io", "v1beta1", "Event"), map_event);
    reg.register_fn(&Gvk::new("events.k8s.io", "v1", "Event"), map_event);
}
