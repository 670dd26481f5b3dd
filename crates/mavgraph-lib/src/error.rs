//! Library error type.

pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

use crate::artifact::Coordinate;
use crate::metadata::MetadataUnavailable;

#[derive(Debug, Error)]
pub enum Error {
	/// The resolver was asked to run without everything it needs.
	#[error("configuration error: {0}")]
	Configuration(String),
	/// Metadata for the root coordinate could not be obtained, nothing was resolved.
	#[error("root unresolvable: {0}")]
	MetadataUnavailable(#[from] MetadataUnavailable),
	#[error("not found in graph: {0}")]
	NotFound(Coordinate),
	#[error("parsing error: {0}")]
	Parse(String),
	#[error("JSON error: {0}")]
	SerdeJSON(#[from] serde_json::Error),
}
