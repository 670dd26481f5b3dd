use std::collections::HashMap;

use serde::{Serialize, Deserialize};

use super::*;

/// In-memory [`MetadataProvider`] holding pre-extracted dependency declarations.
///
/// Loadable from JSON keyed by coordinate:
/// ```json
/// { "org.a:app:1.0": { "dependencies": [ { "coordinate": "org.a:lib:2.0", "scope": "runtime" } ] } }
/// ```
/// Coordinates that are not present are reported as [`UnavailableReason::Missing`].
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
	entries: HashMap<Coordinate, CatalogEntry>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
	#[serde(default)]
	pub dependencies: Vec<DeclaredDependency>,
	/// When set the descriptor exists but can't be used.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub unreadable: Option<String>,
}

impl Catalog {
	pub fn new() -> Self {
		Default::default()
	}

	pub fn from_json(json: &str) -> crate::Result<Self> {
		let catalog: Catalog = serde_json::from_str(json)?;
		log::debug!("Loaded catalog with {} descriptors", catalog.len());
		Ok(catalog)
	}

	pub fn to_json(&self) -> crate::Result<String> {
		Ok(serde_json::to_string_pretty(self)?)
	}

	/// Sets the dependencies of `coordinate`, replacing any previous declaration.
	pub fn insert(&mut self, coordinate: Coordinate, dependencies: Vec<DeclaredDependency>) {
		self.entries.insert(coordinate, CatalogEntry { dependencies, unreadable: None });
	}

	/// Registers a descriptor that exists but fails to load.
	pub fn insert_unreadable(&mut self, coordinate: Coordinate, detail: impl Into<String>) {
		self.entries.insert(coordinate, CatalogEntry { dependencies: Vec::new(), unreadable: Some(detail.into()) });
	}

	pub fn contains(&self, coordinate: &Coordinate) -> bool {
		self.entries.contains_key(coordinate)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl MetadataProvider for Catalog {
	/* Scope filtering is the resolver's job, every declaration is returned. */
	fn resolve_direct_dependencies(&self, coordinate: &Coordinate, _desired: DesiredScope) -> Result<Vec<DeclaredDependency>, MetadataUnavailable> {
		match self.entries.get(coordinate) {
			None => Err(MetadataUnavailable::missing(coordinate.clone())),
			Some(CatalogEntry { unreadable: Some(detail), .. }) => Err(MetadataUnavailable::unreadable(coordinate.clone(), detail.clone())),
			Some(entry) => Ok(entry.dependencies.clone()),
		}
	}
}
