//! kmcp core types: resource identities, the mapper registry and the
//! per-kind projections that turn raw cluster objects into stable JSON.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

pub mod age;
pub mod dispatch;
pub mod extract;
pub mod mappers;
pub mod quantity;
pub mod registry;

pub use dispatch::{project_list, project_one};
pub use quantity::parse_memory_to_mib;
pub use registry::{normalize_kind, MapperRegistry, ResourceMapper};

/// Structured, JSON-serializable output of a mapper.
pub type Projection = serde_json::Value;

/// Group/Version/Kind as supplied by callers. `kind` may use any casing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Gvk {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl Gvk {
    pub fn new(group: impl Into<String>, version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self { group: group.into(), version: version.into(), kind: kind.into() }
    }

    /// Copy of this identity with `kind` passed through [`normalize_kind`].
    pub fn normalized(&self) -> Self {
        Self { group: self.group.clone(), version: self.version.clone(), kind: normalize_kind(&self.kind) }
    }

    /// `group/version`, or just `version` for the core group.
    pub fn api_version(&self) -> String {
        if self.group.is_empty() { self.version.clone() } else { format!("{}/{}", self.group, self.version) }
    }
}

impl std::fmt::Display for Gvk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.api_version(), self.kind)
    }
}

/// Group/Version/Resource: the REST endpoint a [`Gvk`] resolves to.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Gvr {
    pub group: String,
    pub version: String,
    pub resource_plural: String,
}

impl std::fmt::Display for Gvr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}/{}", self.version, self.resource_plural)
        } else {
            write!(f, "{}/{}/{}", self.group, self.version, self.resource_plural)
        }
    }
}

pub mod prelude {
    pub use super::{Gvk, Gvr, MapperRegistry, Projection, ResourceMapper};
}
