//! Error types for derived field resolution and query rewriting

use thiserror::Error;

/// Errors raised while defining models or rewriting query descriptors
#[derive(Debug, Error)]
pub enum DerivedError {
	/// A path segment of a dotted reference does not name an association
	/// on the model reached so far.
	#[error("Invalid association: {association} (on model {model})")]
	InvalidAssociation { association: String, model: String },

	/// An association points at a model that was never defined
	#[error("Unknown model: {0}")]
	UnknownModel(String),

	#[error("Model already defined: {0}")]
	DuplicateModel(String),

	/// A `$Model.field$` reference is ambiguous because the model also has
	/// an association named after itself, and the settings reject that case.
	#[error("Ambiguous self reference: model {model} has an association named {model}")]
	AmbiguousSelfReference { model: String },

	#[error("Invalid derived fields settings: {0}")]
	Settings(#[from] toml::de::Error),

	#[error("Failed to read derived fields settings: {0}")]
	Io(#[from] std::io::Error),
}

/// Result type for derived field operations
pub type DerivedResult<T> = Result<T, DerivedError>;
