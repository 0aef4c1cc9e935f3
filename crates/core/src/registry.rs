//! Kind normalization and the mapper registry.
//!
//! The registry is built once at startup (see [`MapperRegistry::builtin`]) and
//! is read-only afterwards; callers share it behind an `Arc`.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde_json::Value;
use tracing::debug;

use crate::{mappers, Gvk, Projection};

/// A pure, total projection from a raw object to its kind-specific shape.
pub type ResourceMapper = Arc<dyn Fn(&Value) -> Projection + Send + Sync>;

/// Canonical lookup form of a kind: first character upper-cased, the rest
/// lower-cased. `ConfigMap` becomes `Configmap`; both sides of the registry
/// apply it, so the key stays consistent.
pub fn normalize_kind(kind: &str) -> String {
    let mut chars = kind.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
    }
}

#[derive(Default, Clone)]
pub struct MapperRegistry {
    map: FxHashMap<Gvk, ResourceMapper>,
}

impl std::fmt::Debug for MapperRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<String> = self.map.keys().map(|k| k.to_string()).collect();
        keys.sort();
        f.debug_struct("MapperRegistry").field("kinds", &keys).finish()
    }
}

impl MapperRegistry {
    pub fn new() -> Self { Self::default() }

    /// Registry populated with every built-in kind mapper.
    pub fn builtin() -> Self {
        let mut reg = Self::new();
        mappers::pod::register(&mut reg);
        mappers::workloads::register(&mut reg);
        mappers::network::register(&mut reg);
        mappers::batch::register(&mut reg);
        mappers::node::register(&mut reg);
        mappers::event::register(&mut reg);
        mappers::crd::register(&mut reg);
        debug!(entries = reg.len(), "mapper registry built");
        reg
    }

    /// Insert or overwrite the mapper for `gvk` (kind normalized first).
    pub fn register(&mut self, gvk: &Gvk, mapper: ResourceMapper) {
        self.map.insert(gvk.normalized(), mapper);
    }

    /// Convenience for plain functions.
    pub fn register_fn<F>(&mut self, gvk: &Gvk, f: F)
    where
        F: Fn(&Value) -> Projection + Send + Sync + 'static,
    {
        self.register(gvk, Arc::new(f));
    }

    pub fn lookup(&self, gvk: &Gvk) -> Option<ResourceMapper> {
        self.map.get(&gvk.normalized()).cloned()
    }

    pub fn contains(&self, gvk: &Gvk) -> bool { self.map.contains_key(&gvk.normalized()) }

    pub fn len(&self) -> usize { self.map.len() }

    pub fn is_empty(&self) -> bool { self.map.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_examples() {
        assert_eq!(normalize_kind(""), "");
        assert_eq!(normalize_kind("pod"), "Pod");
        assert_eq!(normalize_kind("POD"), "Pod");
        assert_eq!(normalize_kind("pOd"), "Pod");
        assert_eq!(normalize_kind("ConfigMap"), "Configmap");
        assert_eq!(normalize_kind("x"), "X");
        assert_eq!(normalize_kind("éVÉNEMENT"), "Événement");
    }

    #[test]
    fn normalize_is_idempotent() {
        for s in ["", "a", "Pod", "deployment", "CUSTOMRESOURCEDEFINITION", "ingRess", "1abc", "ÅNGSTRÖM"] {
            let once = normalize_kind(s);
            assert_eq!(normalize_kind(&once), once, "input {s:?}");
        }
    }

    #[test]
    fn lookup_ignores_kind_casing() {
        let mut reg = MapperRegistry::new();
        reg.register_fn(&Gvk::new("", "v1", "pod"), |_| json!({"hit": true}));
        for k in ["POD", "Pod", "pOd", "pod"] {
            let m = reg.lookup(&Gvk::new("", "v1", k)).expect("registered");
            assert_eq!(m(&json!({})), json!({"hit": true}));
        }
        assert!(reg.lookup(&Gvk::new("", "v2", "Pod")).is_none());
        assert!(reg.lookup(&Gvk::new("core", "v1", "Pod")).is_none());
    }

    #[test]
    fn last_registration_wins() {
        let mut reg = MapperRegistry::new();
        reg.register_fn(&Gvk::new("apps", "v1", "deployment"), |_| json!("first"));
        reg.register_fn(&Gvk::new("apps", "v1", "DEPLOYMENT"), |_| json!("second"));
        assert_eq!(reg.len(), 1);
        let m = reg.lookup(&Gvk::new("apps", "v1", "Deployment")).unwrap();
        assert_eq!(m(&json!({})), json!("second"));
    }

    #[test]
    fn builtin_has_every_kind() {
        let reg = MapperRegistry::builtin();
        assert_eq!(reg.len(), 14);
        for (g, v, k) in [
            ("", "v1", "Pod"),
            ("apps", "v1", "Deployment"),
            ("apps", "v1", "StatefulSet"),
            ("apps", "v1", "DaemonSet"),
            ("", "v1", "Service"),
            ("networking.k8s.io", "v1", "Ingress"),
            ("batch", "v1", "Job"),
            ("batch", "v1", "CronJob"),
            ("", "v1", "Node"),
            ("", "v1", "Event"),
            ("events.k8s.io", "v1beta1", "Event"),
            ("events.k8s.io", "v1", "Event"),
            ("apiextensions.k8s.io", "v1", "CustomResourceDefinition"),
            ("apiextensions.k8s.io", "v1beta1", "CustomResourceDefinition"),
        ] {
            assert!(reg.contains(&Gvk::new(g, v, k)), "{g}/{v}/{k}");
        }
    }
}
