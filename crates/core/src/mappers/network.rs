//! Service and Ingress.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::{object_age, to_projection};
use crate::extract;
use crate::{Gvk, MapperRegistry, Projection};

const INGRESS_PORTS: &str = "80,443";

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceProjection {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub service_type: String,
    #[serde(rename = "clusterIP", skip_serializing_if = "String::is_empty")]
    pub cluster_ip: String,
    #[serde(rename = "externalIP", skip_serializing_if = "Vec::is_empty")]
    pub external_ips: Vec<String>,
    /// First declared port only.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub port: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub age: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IngressProjection {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub class: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub address: String,
    pub ports: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub age: String,
}

pub fn service_at(obj: &Value, now: DateTime<Utc>) -> ServiceProjection {
    let external_ips = extract::array_at(obj, "/spec/externalIPs")
        .map(|ips| ips.iter().filter_map(|ip| ip.as_str()).map(str::to_string).collect())
        .unwrap_or_default();
    let port = extract::array_at(obj, "/spec/ports")
        .and_then(|ports| ports.first())
        .and_then(|first| {
            let port = extract::i64_at(first, "/port")?;
            Some(match extract::str_at(first, "/protocol") {
                Some(proto) => format!("{port}/{proto}"),
                None => port.to_string(),
            })
        })
        .unwrap_or_default();
    ServiceProjection {
        name: extract::name(obj),
        namespace: extract::namespace(obj),
        service_type: extract::string_at(obj, "/spec/type"),
        cluster_ip: extract::string_at(obj, "/spec/clusterIP"),
        external_ips,
        port,
        age: object_age(obj, now),
    }
}

pub fn ingress_at(obj: &Value, now: DateTime<Utc>) -> IngressProjection {
    let mut hosts: Vec<String> = Vec::new();
    for rule in extract::array_at(obj, "/spec/rules").into_iter().flatten() {
        if let Some(host) = extract::str_at(rule, "/host").filter(|h| !h.is_empty()) {
            if !hosts.iter().any(|h| h == host) { hosts.push(host.to_string()); }
        }
    }
    let mut addresses: Vec<&str> = Vec::new();
    for lb in extract::array_at(obj, "/status/loadBalancer/ingress").into_iter().flatten() {
        if let Some(ip) = extract::str_at(lb, "/ip").filter(|s| !s.is_empty()) { addresses.push(ip); }
        if let Some(host) = extract::str_at(lb, "/hostname").filter(|s| !s.is_empty()) { addresses.push(host); }
    }
    IngressProjection {
        name: extract::name(obj),
        namespace: extract::namespace(obj),
        class: extract::string_at(obj, "/spec/ingressClassName"),
        hosts,
        address: addresses.join(","),
        ports: INGRESS_PORTS.to_string(),
        age: object_age(obj, now),
    }
}

pub fn map_service(obj: &Value) -> Projection { to_projection(&service_at(obj, Utc::now())) }

pub fn map_ingress(obj: &Value) -> Projection { to_projection(&ingress_at(obj, Utc::now())) }

pub fn register(reg: &mut MapperRegistry) {
    reg.register_fn(&Gvk::new("", "v1", "Service"), map_service);
    reg.register_fn(&Gvk::new("networking.k8s.io", "v1", "Ingress"), map_ingress);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn now() -> DateTime<Utc> { crate::age::parse_timestamp("2024-05-01T12:00:00Z").unwrap() }

    #[test]
    fn service_first_port_only() {
        let obj = json!({
            "metadata": {"name": "web", "namespace": "default"},
            "spec": {
                "type": "LoadBalancer", "clusterIP": "10.0.0.12",
                "externalIPs": ["203.0.113.5", 42, "203.0.113.6"],
                "ports": [{"port": 443, "protocol": "TCP"}, {"port": 80, "protocol": "TCP"}]
            }
        });
        assert_eq!(
            to_projection(&service_at(&obj, now())),
            json!({
                "name": "web", "namespace": "default", "type": "LoadBalancer", "clusterIP": "10.0.0.12",
                "externalIP": ["203.0.113.5", "203.0.113.6"], "port": "443/TCP"
            })
        );
    }

    #[test]
    fn service_port_without_protocol() {
        let obj = json!({"metadata": {"name": "dns"}, "spec": {"ports": [{"port": 53}]}});
        assert_eq!(service_at(&obj, now()).port, "53");
        let none = json!({"metadata": {"name": "headless"}, "spec": {"ports": []}});
        assert_eq!(service_at(&none, now()).port, "");
    }

    #[test]
    fn ingress_hosts_and_addresses() {
        let obj = json!({
            "metadata": {"name": "edge", "namespace": "web"},
            "spec": {
                "ingressClassName": "nginx",
                "rules": [{"host": "a.example.com"}, {"host": ""}, {"http": {}}, {"host": "b.example.com"}, {"host": "a.example.com"}]
            },
            "status": {"loadBalancer": {"ingress": [{"ip": "198.51.100.7"}, {"hostname": "lb.example.net"}, {"ip": ""}]}}
        });
        assert_eq!(
            to_projection(&ingress_at(&obj, now())),
            json!({
                "name": "edge", "namespace": "web", "class": "nginx",
                "hosts": ["a.example.com", "b.example.com"],
                "address": "198.51.100.7,lb.example.net", "ports": "80,443"
            })
        );
    }

    #[test]
    fn ingress_always_reports_ports() {
        assert_eq!(map_ingress(&json!({"metadata": {"name": "bare"}})), json!({"name": "bare", "ports": "80,443"}));
    }
}
