#![forbid(unsafe_code)]

use kmcp_core::{normalize_kind, project_list, project_one, Gvk, MapperRegistry};
use serde_json::json;

fn obj(name: &str, ns: Option<&str>) -> serde_json::Value {
    let mut meta = json!({ "name": name, "creationTimestamp": "2020-01-01T00:00:00Z" });
    if let Some(ns) = ns { meta["namespace"] = serde_json::Value::String(ns.to_string()); }
    json!({ "metadata": meta })
}

#[test]
fn casing_never_changes_which_mapper_runs() {
    let reg = MapperRegistry::builtin();
    let mut pod = obj("web-0", Some("shop"));
    pod["status"] = json!({"phase": "Running", "containerStatuses": [{"ready": true, "restartCount": 0}]});
    let canonical = project_one(&reg, &pod, &Gvk::new("", "v1", "Pod"));
    for kind in ["pod", "POD", "pOd", "PoD"] {
        assert_eq!(project_one(&reg, &pod, &Gvk::new("", "v1", kind)), canonical, "kind {kind}");
    }
    assert_eq!(canonical["ready"], "1/1");
    assert_eq!(canonical["status"], "Running");
}

#[test]
fn multi_word_kinds_collapse_consistently() {
    let reg = MapperRegistry::builtin();
    assert_eq!(normalize_kind("CustomResourceDefinition"), "Customresourcedefinition");
    let mut crd = obj("widgets.example.com", None);
    crd["spec"] = json!({"group": "example.com", "names": {"kind": "Widget"}});
    for kind in ["CustomResourceDefinition", "customresourcedefinition", "CUSTOMRESOURCEDEFINITION"] {
        let out = project_one(&reg, &crd, &Gvk::new("apiextensions.k8s.io", "v1", kind));
        assert_eq!(out["group"], "example.com", "kind {kind}");
    }
}

#[test]
fn group_and_version_must_match_exactly() {
    let reg = MapperRegistry::builtin();
    let mut dep = obj("api", Some("prod"));
    dep["status"] = json!({"replicas": 2, "readyReplicas": 2});
    // the core group never matches "apps"
    assert_eq!(project_one(&reg, &dep, &Gvk::new("", "v1", "Deployment")), json!({"name": "api", "namespace": "prod"}));
    assert_eq!(project_one(&reg, &dep, &Gvk::new("apps", "v1beta2", "Deployment")), json!({"name": "api", "namespace": "prod"}));
    assert_eq!(project_one(&reg, &dep, &Gvk::new("apps", "v1", "deployment"))["ready"], "2/2");
}

#[test]
fn fallback_projects_every_list_item() {
    let reg = MapperRegistry::builtin();
    let items = vec![obj("a", Some("ns1")), obj("b", None), obj("c", Some(""))];
    let out = project_list(&reg, &items, &Gvk::new("example.com", "v1alpha1", "Widget"));
    assert_eq!(out, vec![json!({"name": "a", "namespace": "ns1"}), json!({"name": "b"}), json!({"name": "c"})]);
}

#[test]
fn builtin_list_projection_keeps_order() {
    let reg = MapperRegistry::builtin();
    let mut items = Vec::new();
    for (i, phase) in ["Running", "Pending", "Failed"].iter().enumerate() {
        let mut p = obj(&format!("p{i}"), Some("default"));
        p["status"] = json!({ "phase": phase });
        items.push(p);
    }
    let out = project_list(&reg, &items, &Gvk::new("", "v1", "pods".trim_end_matches('s')));
    let phases: Vec<_> = out.iter().map(|p| p["status"].as_str().unwrap_or_default().to_string()).collect();
    assert_eq!(phases, vec!["Running", "Pending", "Failed"]);
    assert!(out.iter().all(|p| p["age"].as_str().is_some_and(|a| a.ends_with('d'))));
}
