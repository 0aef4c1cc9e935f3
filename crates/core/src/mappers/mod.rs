//! Built-in per-kind projections.
//!
//! Every mapper is total: it reads what it can from the raw object and leaves
//! the rest out. Each kind exposes a typed `*_at(obj, now)` constructor for
//! deterministic use and a `map_*` wrapper matching [`ResourceMapper`].
//!
//! [`ResourceMapper`]: crate::ResourceMapper

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::{age, extract, Projection};

pub mod batch;
pub mod crd;
pub mod event;
pub mod generic;
pub mod network;
pub mod node;
pub mod pod;
pub mod workloads;

pub use generic::map_generic;

pub(crate) fn to_projection<T: Serialize>(t: &T) -> Projection { serde_json::to_value(t).unwrap_or(Value::Null) }

/// Age derived from `metadata.creationTimestamp`, empty when unavailable.
pub(crate) fn object_age(obj: &Value, now: DateTime<Utc>) -> String {
    extract::creation_timestamp(obj).and_then(|ts| age::age_between(ts, now)).unwrap_or_default()
}
