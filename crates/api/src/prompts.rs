//! Analysis prompts that walk an agent through the read-only tools.

use serde_json::{json, Value};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PromptError {
    #[error("{0} argument is required")]
    MissingArgument(&'static str),
    #[error("unknown prompt: {0}")]
    Unknown(String),
}

struct PromptArg {
    name: &'static str,
    description: &'static str,
    required: bool,
}

struct PromptDef {
    name: &'static str,
    description: &'static str,
    args: &'static [PromptArg],
}

const MEMORY_PRESSURE: PromptDef = PromptDef {
    name: "memory_pressure_analysis",
    description: "Analyze pods for memory pressure: usage near limits, usage well above requests, and OOM kills. Requires a Kubernetes context.",
    args: &[
        PromptArg { name: "context", description: "The Kubernetes context to analyze", required: true },
        PromptArg { name: "namespace", description: "Namespace to analyze; all namespaces when omitted", required: false },
    ],
};

const WORKLOAD_INSTABILITY: PromptDef = PromptDef {
    name: "workload_instability_analysis",
    description: "Review Events and pod logs in a namespace for signs of workload instability, ordered from most to least critical.",
    args: &[
        PromptArg { name: "context", description: "The Kubernetes context to analyze", required: true },
        PromptArg { name: "namespace", description: "Namespace to analyze", required: true },
    ],
};

const PROMPTS: [&PromptDef; 2] = [&MEMORY_PRESSURE, &WORKLOAD_INSTABILITY];

/// `prompts/list` payload.
pub fn list() -> Value {
    let prompts: Vec<Value> = PROMPTS
        .iter()
        .map(|p| {
            let args: Vec<Value> =
                p.args.iter().map(|a| json!({"name": a.name, "description": a.description, "required": a.required})).collect();
            json!({"name": p.name, "description": p.description, "arguments": args})
        })
        .collect();
    json!({ "prompts": prompts })
}

fn arg<'a>(args: &'a Value, name: &str) -> &'a str { args.get(name).and_then(|v| v.as_str()).unwrap_or("") }

/// `prompts/get` payload for `name` with string `arguments`.
pub fn get(name: &str, arguments: &Value) -> Result<Value, PromptError> {
    let (description, text) = match name {
        "memory_pressure_analysis" => ("Memory pressure analysis prompt", memory_pressure(arguments)?),
        "workload_instability_analysis" => ("Workload instability analysis prompt", workload_instability(arguments)?),
        other => return Err(PromptError::Unknown(other.to_string())),
    };
    Ok(json!({
        "description": description,
        "messages": [{"role": "user", "content": {"type": "text", "text": text}}],
    }))
}

fn memory_pressure(arguments: &Value) -> Result<String, PromptError> {
    let context = arg(arguments, "context");
    if context.is_empty() { return Err(PromptError::MissingArgument("context")); }
    let namespace = arg(arguments, "namespace");
    let scope = if namespace.is_empty() { "Scope: all namespaces".to_string() } else { format!("Scope: namespace {namespace}") };
    Ok(format!(
        r#"Look for pods under memory pressure.

Kubernetes context: {context}
{scope}

<instructions>
1. Call get_k8s_metrics with kind=pod to read current memory usage per pod and container.
2. Call list_k8s_resources with kind=Pod to read memoryRequestMiB, memoryLimitMiB, oomKills and lastTerminationReason.
3. Flag pods where:
   - usage is above 80% of the memory limit
   - usage is above 120% of the memory request
   - oomKills is non-zero or the last termination reason is OOMKilled
4. Present a table with pod, namespace, usage/request/limit, percent of limit, percent of request and OOM history.
5. Call out the most urgent pods first and suggest concrete request/limit changes.
</instructions>"#
    ))
}

fn workload_instability(arguments: &Value) -> Result<String, PromptError> {
    let context = arg(arguments, "context");
    if context.is_empty() { return Err(PromptError::MissingArgument("context")); }
    let namespace = arg(arguments, "namespace");
    if namespace.is_empty() { return Err(PromptError::MissingArgument("namespace")); }
    Ok(format!(
        r#"Investigate workload instability in namespace "{namespace}".

Kubernetes context: {context}

<instructions>
Step 1: Events
- Call list_k8s_resources with context={context}, namespace={namespace}, kind=Event.
- Note Warning events, recurring reasons (FailedScheduling, FailedMount, BackOff, ImagePullBackOff, Unhealthy) and high counts.

Step 2: Pods and logs
- Call list_k8s_resources with context={context}, namespace={namespace}, kind=Pod.
- For pods with restarts, OOM kills or a non-Running status, call get_k8s_pod_logs with tail=50; use previous=true for containers that restarted.
- Look for fatal errors, panics, connection failures, timeouts, TLS problems and authorization failures.

Step 3: Summary
Group findings under CRITICAL, HIGH, MEDIUM and LOW. For each finding give the source (event or pod/container), how often it occurs, the likely impact and a suggested next step. Leave out routine noise.
</instructions>"#
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_marks_required_arguments() {
        let v = list();
        let prompts = v["prompts"].as_array().unwrap();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0]["arguments"][0], json!({"name": "context", "description": "The Kubernetes context to analyze", "required": true}));
        assert_eq!(prompts[0]["arguments"][1]["required"], false);
        assert_eq!(prompts[1]["arguments"][1]["required"], true);
    }

    #[test]
    fn memory_pressure_scope() {
        let v = get("memory_pressure_analysis", &json!({"context": "prod"})).unwrap();
        let text = v["messages"][0]["content"]["text"].as_str().unwrap();
        assert!(text.contains("Kubernetes context: prod"));
        assert!(text.contains("Scope: all namespaces"));
        let v = get("memory_pressure_analysis", &json!({"context": "prod", "namespace": "shop"})).unwrap();
        assert!(v["messages"][0]["content"]["text"].as_str().unwrap().contains("Scope: namespace shop"));
        assert_eq!(v["messages"][0]["role"], "user");
    }

    #[test]
    fn required_arguments() {
        assert_eq!(get("memory_pressure_analysis", &json!({})).unwrap_err().to_string(), "context argument is required");
        let err = get("workload_instability_analysis", &json!({"context": "prod"})).unwrap_err();
        assert_eq!(err.to_string(), "namespace argument is required");
        assert!(matches!(get("nope", &json!({})), Err(PromptError::Unknown(_))));
    }

    #[test]
    fn instability_mentions_targets() {
        let v = get("workload_instability_analysis", &json!({"context": "stage", "namespace": "payments"})).unwrap();
        let text = v["messages"][0]["content"]["text"].as_str().unwrap();
        assert!(text.contains("namespace=payments, kind=Event"));
        assert!(text.contains("context=stage"));
    }
}
