pub mod error;
pub use error::Result;
pub use error::Error;

pub mod artifact;
pub use artifact::Coordinate;
pub use artifact::Scope;
pub use artifact::DesiredScope;

pub mod config;
pub use config::ResolverOptions;

pub mod metadata;
pub use metadata::MetadataProvider;

pub mod dependency_resolver;
pub use dependency_resolver::DependencyGraph;
pub use dependency_resolver::ResolverBuilder;
