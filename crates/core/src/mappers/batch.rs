//! batch/v1 Job and CronJob.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::{object_age, to_projection};
use crate::extract::{self, is_false, is_zero};
use crate::{Gvk, MapperRegistry, Projection};

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JobProjection {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub completions: String,
    /// `running` or `completed`; not an elapsed time.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub duration: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub age: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CronJobProjection {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub schedule: String,
    #[serde(skip_serializing_if = "is_false")]
    pub suspend: bool,
    #[serde(skip_serializing_if = "is_zero")]
    pub active: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_schedule: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub age: String,
}

pub fn job_at(obj: &Value, now: DateTime<Utc>) -> JobProjection {
    let succeeded = extract::i64_at(obj, "/status/succeeded").unwrap_or(0);
    let failed = extract::i64_at(obj, "/status/failed").unwrap_or(0);
    let mut completions = match extract::i64_at(obj, "/spec/completions") {
        Some(want) => format!("{succeeded}/{want}"),
        None => succeeded.to_string(),
    };
    if failed > 0 { completions.push_str(&format!(" ({failed} failed)")); }

    let started = extract::str_at(obj, "/status/startTime").is_some_and(|s| !s.is_empty());
    let finished = extract::str_at(obj, "/status/completionTime").is_some_and(|s| !s.is_empty());
    let duration = match (started, finished) {
        (true, true) => "completed",
        (true, false) => "running",
        _ => "",
    };
    JobProjection {
        name: extract::name(obj),
        namespace: extract::namespace(obj),
        completions,
        duration: duration.to_string(),
        age: object_age(obj, now),
    }
}

pub fn cronjob_at(obj: &Value, now: DateTime<Utc>) -> CronJobProjection {
    CronJobProjection {
        name: extract::name(obj),
        namespace: extract::namespace(obj),
        schedule: extract::string_at(obj, "/spec/schedule"),
        suspend: extract::bool_at(obj, "/spec/suspend").unwrap_or(false),
        active: extract::array_at(obj, "/status/active").map(|a| a.len() as i64).unwrap_or(0),
        last_schedule: extract::string_at(obj, "/status/lastScheduleTime"),
        age: object_age(obj, now),
    }
}

pub fn map_job(obj: &Value) -> Projection { to_projection(&job_at(obj, Utc::now())) }

pub fn map_cronjob(obj: &Value) -> Projection { to_projection(&cronjob_at(obj, Utc::now())) }

pub fn register(reg: &mut MapperRegistry) {
    reg.register_fn(&Gvk::new("batch", "v1", "Job"), map_job);
    reg.register_fn(&Gvk::new("batch", "v1", "CronJob"), map_cronjob);
}
