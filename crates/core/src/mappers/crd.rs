use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::{object_age, to_projection};
use crate::extract;
use crate::{Gvk, MapperRegistry, Projection};

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CrdProjection {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub age: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub group: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub scope: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub singular: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub plural: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub short_name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub versions: Vec<String>,
}

pub fn crd_at(obj: &Value, now: DateTime<Utc>) -> CrdProjection {
    let mut versions: Vec<String> = extract::array_at(obj, "/spec/versions")
        .map(|vs| vs.iter().filter_map(|v| extract::str_at(v, "/name")).map(str::to_string).collect())
        .unwrap_or_default();
    // v1beta1 objects may only carry the single legacy `spec.version`
    if versions.is_empty() {
        if let Some(v) = extract::str_at(obj, "/spec/version").filter(|v| !v.is_empty()) { versions.push(v.to_string()); }
    }
    CrdProjection {
        name: extract::name(obj),
        age: object_age(obj, now),
        group: extract::string_at(obj, "/spec/group"),
        scope: extract::string_at(obj, "/spec/scope"),
        kind: extract::string_at(obj, "/spec/names/kind"),
        singular: extract::string_at(obj, "/spec/names/singular"),
        plural: extract::string_at(obj, "/spec/names/plural"),
        short_name: extract::string_at(obj, "/spec/names/shortNames/0"),
        versions,
    }
}

pub fn map_crd(obj: &Value) -> Projection { to_projection(&crd_at(obj, Utc::now())) }

pub fn register(reg: &mut MapperRegistry) {
    reg.register_fn(&Gvk::new("apiextensions.k8s.io", "v1", "CustomResourceDefinition"), map_crd);
    reg.register_fn(&Gvk::new("apiextensions.k8s.io", "v1beta1", "CustomResourceDefinition"), map_crd);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn now() -> DateTime<Utc> { crate::age::parse_timestamp("2024-05-01T12:00:00Z").unwrap() }

    #[test]
    fn v1_crd() {
        let obj = json!({
            "metadata": {"name": "certificates.cert-manager.io", "creationTimestamp": "2024-05-01T11:59:10Z"},
            "spec": {
                "group": "cert-manager.io", "scope": "Namespaced",
                "names": {"kind": "Certificate", "singular": "certificate", "plural": "certificates", "shortNames": ["cert", "certs"]},
                "versions": [{"name": "v1", "served": true}, {"name": "v1alpha2", "served": false}]
            }
        });
        assert_eq!(
            to_projection(&crd_at(&obj, now())),
            json!({
                "name": "certificates.cert-manager.io", "age": "< 1m", "group": "cert-manager.io", "scope": "Namespaced",
                "kind": "Certificate", "singular": "certificate", "plural": "certificates", "shortName": "cert",
                "versions": ["v1", "v1alpha2"]
            })
        );
    }

    #[test]
    fn v1beta1_legacy_version_field() {
        let obj = json!({"metadata": {"name": "widgets.example.com"}, "spec": {"group": "example.com", "version": "v1beta1", "names": {"shortNames": []}}});
        let crd = crd_at(&obj, now());
        assert_eq!(crd.versions, vec!["v1beta1"]);
        assert_eq!(crd.short_name, "");
    }
}
