use std::collections::HashMap;

use crate::artifact::*;

/// Tunables for a resolution run.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverOptions {
	desired_scope: DesiredScope,
	include_optional: bool,
	/// Dependency management, pins the version of transitive dependencies.
	managed_versions: HashMap<ArtifactKey, String>,
	max_depth: Option<usize>,
}

impl Default for ResolverOptions {
	fn default() -> Self {
		Self {
			desired_scope: DesiredScope::Test,
			include_optional: false,
			managed_versions: Default::default(),
			max_depth: None,
		}
	}
}

impl ResolverOptions {
	pub fn desired_scope(&self) -> DesiredScope {
		self.desired_scope
	}
	pub fn set_desired_scope(&mut self, desired_scope: DesiredScope) {
		self.desired_scope = desired_scope;
	}

	/// When `false` optional dependencies of anything but the root are recorded but never expanded.
	pub fn include_optional(&self) -> bool {
		self.include_optional
	}
	pub fn set_include_optional(&mut self, include_optional: bool) {
		self.include_optional = include_optional;
	}

	pub fn managed_version(&self, key: &ArtifactKey) -> Option<&str> {
		self.managed_versions.get(key).map(String::as_str)
	}
	pub fn managed_versions(&self) -> &HashMap<ArtifactKey, String> {
		&self.managed_versions
	}
	/// Forces every transitive occurrence of `key` to `version`. Direct dependencies of the root keep their declared version.
	pub fn set_managed_version(&mut self, key: ArtifactKey, version: impl Into<String>) {
		self.managed_versions.insert(key, version.into());
	}

	/// Nodes at this depth or deeper are not expanded. The root is depth 0.
	pub fn max_depth(&self) -> Option<usize> {
		self.max_depth
	}
	pub fn set_max_depth(&mut self, max_depth: Option<usize>) {
		self.max_depth = max_depth;
	}
}
