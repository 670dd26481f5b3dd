//! The boundary to whatever knows what an artifact depends on.
//!
//! The resolver never reads descriptors itself, it only asks a [`MetadataProvider`]
//! for the direct dependencies of one coordinate at a time.

use serde::{Serialize, Deserialize};

use crate::artifact::*;

mod catalog;
pub use catalog::Catalog;

/// Supplies direct-dependency declarations for a coordinate.
///
/// Implementations are called from the resolving thread and may block.
/// To resolve several roots concurrently the provider must be shareable between threads.
pub trait MetadataProvider {
	/// Returns the dependencies declared by `coordinate`, in declaration order.
	fn resolve_direct_dependencies(&self, coordinate: &Coordinate, desired: DesiredScope) -> Result<Vec<DeclaredDependency>, MetadataUnavailable>;
}

/// A single dependency as declared by an artifact's descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclaredDependency {
	pub coordinate: Coordinate,
	#[serde(default)]
	pub scope: Scope,
	#[serde(default)]
	pub optional: bool,
	/// Artifacts removed from this dependency's own subtree.
	#[serde(default)]
	pub exclusions: Vec<Exclusion>,
	/// Declared through parent descriptor inheritance instead of directly.
	#[serde(default)]
	pub from_parent: bool,
}

impl DeclaredDependency {
	pub fn new(coordinate: Coordinate, scope: Scope) -> Self {
		Self {
			coordinate,
			scope,
			optional: false,
			exclusions: Vec::new(),
			from_parent: false,
		}
	}

	pub fn optional(mut self, optional: bool) -> Self {
		self.optional = optional;
		self
	}

	pub fn exclude(mut self, exclusion: Exclusion) -> Self {
		self.exclusions.push(exclusion);
		self
	}

	pub fn from_parent(mut self, from_parent: bool) -> Self {
		self.from_parent = from_parent;
		self
	}
}

/// A `groupId:artifactId` pattern, either part may be `*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Exclusion {
	pub group_id: String,
	pub artifact_id: String,
}

impl Exclusion {
	pub const WILDCARD: &'static str = "*";

	pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
		Self {
			group_id: group_id.into(),
			artifact_id: artifact_id.into(),
		}
	}

	pub fn matches(&self, key: &ArtifactKey) -> bool {
		(self.group_id == Self::WILDCARD || self.group_id == key.group_id)
			&& (self.artifact_id == Self::WILDCARD || self.artifact_id == key.artifact_id)
	}
}

impl std::str::FromStr for Exclusion {
	type Err = crate::Error;

	fn from_str(s: &str) -> crate::Result<Self> {
		match s.trim().split(':').collect::<Vec<_>>().as_slice() {
			[g, a] if !g.is_empty() && !a.is_empty() => Ok(Exclusion::new(*g, *a)),
			_ => Err(crate::Error::Parse(format!("exclusion `{}` is not a groupId:artifactId pattern", s))),
		}
	}
}

impl TryFrom<String> for Exclusion {
	type Error = crate::Error;

	fn try_from(value: String) -> crate::Result<Self> {
		value.parse()
	}
}

impl From<Exclusion> for String {
	fn from(value: Exclusion) -> Self {
		value.to_string()
	}
}

impl std::fmt::Display for Exclusion {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}:{}", self.group_id, self.artifact_id)
	}
}

/// Dependencies of a coordinate could not be determined.
///
/// Only fatal for the root; anywhere else the node is kept without children.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("metadata for {coordinate} unavailable: {reason}")]
pub struct MetadataUnavailable {
	pub coordinate: Coordinate,
	pub reason: UnavailableReason,
}

impl MetadataUnavailable {
	pub fn missing(coordinate: Coordinate) -> Self {
		Self { coordinate, reason: UnavailableReason::Missing }
	}

	pub fn unreadable(coordinate: Coordinate, detail: impl Into<String>) -> Self {
		Self { coordinate, reason: UnavailableReason::Unreadable(detail.into()) }
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnavailableReason {
	#[error("descriptor missing")]
	Missing,
	#[error("descriptor unreadable ({0})")]
	Unreadable(String),
}

#[cfg(test)]
mod test {
	use super::*;

	#[test] fn exclusion_matches_exact() { assert!(Exclusion::new("g", "a").matches(&ArtifactKey::new("g", "a"))) }
	#[test] fn exclusion_rejects_other_artifact() { assert!(!Exclusion::new("g", "a").matches(&ArtifactKey::new("g", "b"))) }
	#[test] fn exclusion_artifact_wildcard() { assert!(Exclusion::new("g", "*").matches(&ArtifactKey::new("g", "anything"))) }
	#[test] fn exclusion_full_wildcard() { assert!("*:*".parse::<Exclusion>().unwrap().matches(&ArtifactKey::new("x", "y"))) }
	#[test] fn exclusion_parse_rejects_version() { assert!("g:a:1.0".parse::<Exclusion>().is_err()) }
}
