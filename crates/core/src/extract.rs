//! Lenient accessors over raw JSON objects. A missing path and a value of
//! the wrong type both read as `None`.

use serde_json::{Map, Value};

pub fn str_at<'a>(v: &'a Value, ptr: &str) -> Option<&'a str> { v.pointer(ptr).and_then(|x| x.as_str()) }

/// Owned string at `ptr`, or empty when absent.
pub fn string_at(v: &Value, ptr: &str) -> String { str_at(v, ptr).unwrap_or_default().to_string() }

pub fn i64_at(v: &Value, ptr: &str) -> Option<i64> { v.pointer(ptr).and_then(|x| x.as_i64()) }

pub fn bool_at(v: &Value, ptr: &str) -> Option<bool> { v.pointer(ptr).and_then(|x| x.as_bool()) }

pub fn array_at<'a>(v: &'a Value, ptr: &str) -> Option<&'a Vec<Value>> { v.pointer(ptr).and_then(|x| x.as_array()) }

pub fn object_at<'a>(v: &'a Value, ptr: &str) -> Option<&'a Map<String, Value>> { v.pointer(ptr).and_then(|x| x.as_object()) }

pub fn name(v: &Value) -> String { string_at(v, "/metadata/name") }

pub fn namespace(v: &Value) -> String { string_at(v, "/metadata/namespace") }

pub fn creation_timestamp(v: &Value) -> Option<&str> { str_at(v, "/metadata/creationTimestamp") }

/// Join two optional parts with `sep`, falling back to whichever is present.
pub fn join_pair(a: Option<&str>, b: Option<&str>, sep: &str) -> String {
    match (a, b) {
        (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => format!("{a}{sep}{b}"),
        (Some(a), _) if !a.is_empty() => a.to_string(),
        (_, Some(b)) => b.to_string(),
        _ => String::new(),
    }
}

pub(crate) fn is_zero(n: &i64) -> bool { *n == 0 }

pub(crate) fn is_false(b: &bool) -> bool { !*b }

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mismatched_types_read_as_absent() {
        let v = json!({"spec": {"replicas": "3", "paused": 1, "name": 7}});
        assert_eq!(i64_at(&v, "/spec/replicas"), None);
        assert_eq!(bool_at(&v, "/spec/paused"), None);
        assert_eq!(str_at(&v, "/spec/name"), None);
        assert_eq!(string_at(&v, "/spec/missing/deeper"), "");
        assert!(array_at(&v, "/spec").is_none());
        assert!(object_at(&v, "/spec").is_some());
    }

    #[test]
    fn pair_joining() {
        assert_eq!(join_pair(Some("Pod"), Some("web-0"), "/"), "Pod/web-0");
        assert_eq!(join_pair(None, Some("web-0"), "/"), "web-0");
        assert_eq!(join_pair(Some("kubelet"), None, "@"), "kubelet");
        assert_eq!(join_pair(Some(""), Some("node-a"), "@"), "node-a");
        assert_eq!(join_pair(None, None, "@"), "");
    }
}
