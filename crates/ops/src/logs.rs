//! Pod log retrieval.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, LogParams};
use kube::Client;
use tracing::info;

/// Options for a one-shot `logs` read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogOptions {
    /// Container name; the server picks the default container when unset.
    pub container: Option<String>,
    /// Tail last n lines (server-side)
    pub tail_lines: Option<i64>,
    /// Only return logs newer than X seconds
    pub since_seconds: Option<i64>,
    /// Only return logs after this instant
    pub since_time: Option<DateTime<Utc>>,
    /// Read the previous terminated container instance
    pub previous: bool,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LogOptionsError {
    #[error("cannot specify both 'since' and 'sinceTime' parameters")]
    SinceConflict,
    #[error("Invalid 'since' duration: {0}")]
    Since(String),
    #[error("Invalid 'sinceTime' format (expected RFC3339): {0}")]
    SinceTime(String),
}

impl LogOptions {
    /// Build options from loosely-typed tool arguments. Empty strings count as
    /// unset; a non-positive tail disables tailing.
    pub fn from_args(container: &str, since: &str, since_time: &str, tail: i64, previous: bool) -> Result<Self, LogOptionsError> {
        if !since.is_empty() && !since_time.is_empty() {
            return Err(LogOptionsError::SinceConflict);
        }
        let mut opts = LogOptions { previous, ..Default::default() };
        if !container.is_empty() { opts.container = Some(container.to_string()); }
        if tail > 0 { opts.tail_lines = Some(tail); }
        if !since.is_empty() {
            let d = parse_go_duration(since).map_err(|e| LogOptionsError::Since(e.to_string()))?;
            opts.since_seconds = Some(i64::try_from(d.as_secs()).unwrap_or(i64::MAX));
        } else if !since_time.is_empty() {
            let t = DateTime::parse_from_rfc3339(since_time).map_err(|e| LogOptionsError::SinceTime(e.to_string()))?;
            opts.since_time = Some(t.with_timezone(&Utc));
        }
        Ok(opts)
    }

    fn params(&self) -> LogParams {
        LogParams {
            container: self.container.clone(),
            tail_lines: self.tail_lines,
            since_seconds: self.since_seconds,
            since_time: self.since_time,
            previous: self.previous,
            ..Default::default()
        }
    }
}

/// Parse durations like `30s`, `5m`, `1h30m`, `1.5h`, `250ms`.
pub fn parse_go_duration(s: &str) -> Result<Duration> {
    let input = s.trim();
    let rest = input.strip_prefix('+').unwrap_or(input);
    if rest.starts_with('-') { return Err(anyhow!("invalid duration \"{}\": negative", s)); }
    if rest == "0" { return Ok(Duration::ZERO); }
    if rest.is_empty() { return Err(anyhow!("invalid duration \"{}\"", s)); }

    let mut total = 0f64;
    let mut chars = rest.char_indices().peekable();
    while chars.peek().is_some() {
        let start = chars.peek().map(|(i, _)| *i).unwrap_or(0);
        let mut end = start;
        while let Some((i, c)) = chars.peek().copied() {
            if c.is_ascii_digit() || c == '.' { end = i + c.len_utf8(); chars.next(); } else { break; }
        }
        let number: f64 = rest[start..end].parse().map_err(|_| anyhow!("invalid duration \"{}\"", s))?;
        let unit_start = end;
        while let Some((i, c)) = chars.peek().copied() {
            if c.is_ascii_digit() || c == '.' { break; }
            end = i + c.len_utf8();
            chars.next();
        }
        let seconds_per_unit = match &rest[unit_start..end] {
            "ns" => 1e-9,
            "us" | "µs" | "μs" => 1e-6,
            "ms" => 1e-3,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            "" => return Err(anyhow!("missing unit in duration \"{}\"", s)),
            other => return Err(anyhow!("unknown unit \"{}\" in duration \"{}\"", other, s)),
        };
        total += number * seconds_per_unit;
    }
    Duration::try_from_secs_f64(total).map_err(|_| anyhow!("invalid duration \"{}\": overflow", s))
}

/// Fetch the complete (non-streaming) log text of a pod.
pub async fn pod_logs(client: Client, namespace: &str, pod: &str, opts: &LogOptions) -> Result<String> {
    let api: Api<Pod> = Api::namespaced(client, namespace);
    let lp = opts.params();
    info!(pod = %pod, ns = %namespace, container = ?lp.container, tail = ?lp.tail_lines, since = ?lp.since_seconds, previous = lp.previous, "reading logs");
    api.logs(pod, &lp).await.with_context(|| format!("failed to get logs for pod \"{}\"", pod))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations() {
        assert_eq!(parse_go_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_go_duration("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_go_duration("1h30m").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_go_duration("1.5h").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_go_duration("0").unwrap(), Duration::ZERO);
        assert_eq!(parse_go_duration("1500ms").unwrap().as_secs(), 1);
        assert!(parse_go_duration("2µs").unwrap() < Duration::from_millis(1));
        assert!(parse_go_duration("").is_err());
        assert!(parse_go_duration("5").is_err());
        assert!(parse_go_duration("5d").is_err());
        assert!(parse_go_duration("-5m").is_err());
        assert!(parse_go_duration("m").is_err());
        let err = parse_go_duration("99999999999999999999999h").unwrap_err();
        assert!(err.to_string().ends_with("overflow"), "{err}");
    }

    #[test]
    fn since_and_since_time_are_exclusive() {
        let err = LogOptions::from_args("", "5m", "2024-05-01T00:00:00Z", 10, false).unwrap_err();
        assert_eq!(err.to_string(), "cannot specify both 'since' and 'sinceTime' parameters");
    }

    #[test]
    fn options_from_args() {
        let o = LogOptions::from_args("app", "90s", "", 10, true).unwrap();
        assert_eq!(o.container.as_deref(), Some("app"));
        assert_eq!(o.since_seconds, Some(90));
        assert_eq!(o.tail_lines, Some(10));
        assert!(o.previous);

        let o = LogOptions::from_args("", "", "2024-05-01T10:00:00+02:00", 0, false).unwrap();
        assert_eq!(o.tail_lines, None);
        assert_eq!(o.container, None);
        assert_eq!(o.since_time.unwrap().to_rfc3339(), "2024-05-01T08:00:00+00:00");
        let lp = o.params();
        assert!(lp.since_time.is_some());
        assert!(!lp.follow);
    }

    #[test]
    fn invalid_inputs_are_described() {
        let e = LogOptions::from_args("", "soon", "", 10, false).unwrap_err();
        assert!(e.to_string().starts_with("Invalid 'since' duration:"));
        let e = LogOptions::from_args("", "99999999999999999999999h", "", 10, false).unwrap_err();
        assert!(matches!(e, LogOptionsError::Since(_)));
        let e = LogOptions::from_args("", "", "yesterday", 10, false).unwrap_err();
        assert!(e.to_string().starts_with("Invalid 'sinceTime' format (expected RFC3339):"));
    }
}
