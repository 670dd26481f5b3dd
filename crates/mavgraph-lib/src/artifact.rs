//! Artifact identity and the rules for how scopes propagate through a graph.

mod coordinate;
pub use coordinate::Coordinate;
pub use coordinate::ArtifactKey;
pub use coordinate::ConflictKey;
pub use coordinate::DEFAULT_KIND;

mod scope;
pub use scope::Scope;
pub use scope::DesiredScope;
