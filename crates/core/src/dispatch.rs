//! Content projection: registry lookup with the generic fallback.

use serde_json::Value;
use tracing::trace;

use crate::mappers::map_generic;
use crate::{Gvk, MapperRegistry, Projection};

pub fn project_one(registry: &MapperRegistry, obj: &Value, gvk: &Gvk) -> Projection {
    match registry.lookup(gvk) {
        Some(mapper) => mapper(obj),
        None => {
            trace!(gvk = %gvk, "no mapper registered; generic projection");
            map_generic(obj)
        }
    }
}

/// Project every item with a single mapper resolved once for the whole list.
pub fn project_list(registry: &MapperRegistry, items: &[Value], gvk: &Gvk) -> Vec<Projection> {
    match registry.lookup(gvk) {
        Some(mapper) => items.iter().map(|o| mapper(o)).collect(),
        None => {
            trace!(gvk = %gvk, count = items.len(), "no mapper registered; generic projection");
            items.iter().map(map_generic).collect()
        }
    }
}
