use serde::Serialize;
use serde_json::Value;

use super::to_projection;
use crate::{extract, Projection};

/// Minimal shape used for kinds without a dedicated mapper.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct GenericProjection {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
}

pub fn generic(obj: &Value) -> GenericProjection {
    GenericProjection { name: extract::name(obj), namespace: extract::namespace(obj) }
}

pub fn map_generic(obj: &Value) -> Projection { to_projection(&generic(obj)) }
