use serde::{Serialize, Deserialize};

/// Packaging type assumed when a coordinate doesn't name one.
pub const DEFAULT_KIND: &str = "jar";

/// Identity of a single artifact: `groupId:artifactId:version` plus packaging type and classifier.
///
/// Coordinates are used as the key for nodes in a [`crate::DependencyGraph`].
/// They serialize to their text form `groupId:artifactId[:type[:classifier]]:version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Coordinate {
	pub group_id: String,
	pub artifact_id: String,
	pub version: String,
	/// Packaging type. Rust friendly alias for `type`.
	pub kind: String,
	pub classifier: Option<String>,
}

impl Coordinate {
	pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>, version: impl Into<String>) -> Self {
		Self {
			group_id: group_id.into(),
			artifact_id: artifact_id.into(),
			version: version.into(),
			kind: DEFAULT_KIND.to_string(),
			classifier: None,
		}
	}

	pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
		self.kind = kind.into();
		self
	}

	pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
		self.classifier = Some(classifier.into());
		self
	}

	/// Copy of this coordinate pointing at another version of the same artifact.
	pub fn with_version(&self, version: impl Into<String>) -> Self {
		Self {
			version: version.into(),
			..self.clone()
		}
	}

	/// `groupId:artifactId`, the identity exclusions and managed versions refer to.
	pub fn key(&self) -> ArtifactKey {
		ArtifactKey {
			group_id: self.group_id.clone(),
			artifact_id: self.artifact_id.clone(),
		}
	}

	/// The versionless identity used when deciding version conflicts.
	///
	/// Type and classifier are part of it, `g:a:1` and `g:a:test-jar:tests:1` never compete.
	pub fn conflict_key(&self) -> ConflictKey {
		ConflictKey {
			group_id: self.group_id.clone(),
			artifact_id: self.artifact_id.clone(),
			kind: self.kind.clone(),
			classifier: self.classifier.clone(),
		}
	}

	/// Both coordinates name the same `groupId:artifactId`, versions may differ.
	pub fn is_same_artifact(&self, other: &Coordinate) -> bool {
		self.group_id == other.group_id && self.artifact_id == other.artifact_id
	}

	pub(crate) fn is_valid(&self) -> bool {
		!self.group_id.is_empty()
			&& !self.artifact_id.is_empty()
			&& !self.version.is_empty()
			&& !self.kind.is_empty()
	}
}

impl std::str::FromStr for Coordinate {
	type Err = crate::Error;

	/// Accepts `g:a:v`, `g:a:type:v` and `g:a:type:classifier:v`.
	fn from_str(s: &str) -> crate::Result<Self> {
		let parts: Vec<&str> = s.trim().split(':').collect();
		if parts.iter().any(|p| p.trim().is_empty()) {
			return Err(crate::Error::Parse(format!("coordinate `{}` has an empty segment", s)));
		}

		match parts.as_slice() {
			[g, a, v] => Ok(Coordinate::new(*g, *a, *v)),
			[g, a, k, v] => Ok(Coordinate::new(*g, *a, *v).with_kind(*k)),
			[g, a, k, c, v] => Ok(Coordinate::new(*g, *a, *v).with_kind(*k).with_classifier(*c)),
			_ => Err(crate::Error::Parse(format!("`{}` is not a groupId:artifactId[:type[:classifier]]:version coordinate", s))),
		}
	}
}

impl TryFrom<String> for Coordinate {
	type Error = crate::Error;

	fn try_from(value: String) -> crate::Result<Self> {
		value.parse()
	}
}

impl From<Coordinate> for String {
	fn from(value: Coordinate) -> Self {
		value.to_string()
	}
}

impl std::fmt::Display for Coordinate {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}:{}", self.group_id, self.artifact_id)?;
		if self.kind != DEFAULT_KIND || self.classifier.is_some() {
			write!(f, ":{}", self.kind)?;
		}
		if let Some(classifier) = &self.classifier {
			write!(f, ":{}", classifier)?;
		}
		write!(f, ":{}", self.version)
	}
}

/// `groupId:artifactId` with no version.
///
/// Exclusions, managed versions and cycle detection refer to artifacts by this key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactKey {
	pub group_id: String,
	pub artifact_id: String,
}

impl ArtifactKey {
	pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
		Self {
			group_id: group_id.into(),
			artifact_id: artifact_id.into(),
		}
	}
}

impl std::str::FromStr for ArtifactKey {
	type Err = crate::Error;

	fn from_str(s: &str) -> crate::Result<Self> {
		match s.trim().split(':').collect::<Vec<_>>().as_slice() {
			[g, a] if !g.is_empty() && !a.is_empty() => Ok(ArtifactKey::new(*g, *a)),
			_ => Err(crate::Error::Parse(format!("`{}` is not a groupId:artifactId pair", s))),
		}
	}
}

impl std::fmt::Display for ArtifactKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}:{}", self.group_id, self.artifact_id)
	}
}

/// A coordinate minus its version.
///
/// Only one version per conflict key can be in effect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConflictKey {
	pub group_id: String,
	pub artifact_id: String,
	pub kind: String,
	pub classifier: Option<String>,
}

#[cfg(test)]
mod test {
	use super::*;

	#[test] fn coordinate_parses_short_form() { assert_eq!("org.a:lib:1.0".parse::<Coordinate>().unwrap(), Coordinate::new("org.a", "lib", "1.0")) }
	#[test] fn coordinate_parses_kind() { assert_eq!("org.a:lib:pom:1.0".parse::<Coordinate>().unwrap().kind, "pom") }
	#[test] fn coordinate_parses_classifier() { assert_eq!("org.a:lib:jar:sources:1.0".parse::<Coordinate>().unwrap().classifier.as_deref(), Some("sources")) }
	#[test] fn coordinate_default_kind_is_equal_to_explicit_jar() { assert_eq!("org.a:lib:jar:1.0".parse::<Coordinate>().unwrap(), "org.a:lib:1.0".parse::<Coordinate>().unwrap()) }
	#[test] fn coordinate_rejects_two_segments() { assert!("org.a:lib".parse::<Coordinate>().is_err()) }
	#[test] fn coordinate_rejects_empty_segment() { assert!("org.a::1.0".parse::<Coordinate>().is_err()) }
	#[test] fn coordinate_display_omits_default_kind() { assert_eq!(Coordinate::new("g", "a", "1").to_string(), "g:a:1") }
	#[test] fn coordinate_display_keeps_classifier() { assert_eq!(Coordinate::new("g", "a", "1").with_classifier("tests").to_string(), "g:a:jar:tests:1") }
	#[test] fn coordinate_key_ignores_version() { assert_eq!(Coordinate::new("g", "a", "1").key(), Coordinate::new("g", "a", "2").key()) }
	#[test] fn conflict_key_ignores_version() { assert_eq!(Coordinate::new("g", "a", "1").conflict_key(), Coordinate::new("g", "a", "2").conflict_key()) }
	#[test] fn conflict_key_keeps_classifier() { assert_ne!(Coordinate::new("g", "a", "1").conflict_key(), Coordinate::new("g", "a", "1").with_kind("test-jar").with_classifier("tests").conflict_key()) }
	#[test] fn artifact_key_requires_both_parts() { assert!("g:".parse::<ArtifactKey>().is_err()) }

	#[test]
	fn coordinate_serializes_as_text() {
		let c = Coordinate::new("g", "a", "1").with_kind("pom");
		let json = serde_json::to_string(&c).unwrap();
		assert_eq!(json, "\"g:a:pom:1\"");
		assert_eq!(serde_json::from_str::<Coordinate>(&json).unwrap(), c);
	}
}
