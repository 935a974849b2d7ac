//! Registry of defined models
//!
//! Associations refer to their targets by model name, so the resolver looks
//! targets up here while walking a dotted reference.

use crate::error::{DerivedError, DerivedResult};
use crate::model::{Model, ModelDefinition};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// Thread-safe set of models keyed by name
///
/// # Examples
///
/// ```
/// use reinhardt_derived_fields::expression::DerivedExpr;
/// use reinhardt_derived_fields::model::{FieldType, ModelDefinition};
/// use reinhardt_derived_fields::registry::ModelRegistry;
///
/// let registry = ModelRegistry::new();
/// registry
///     .define(
///         ModelDefinition::new("Master")
///             .field("name", FieldType::String)
///             .derived("ucName", FieldType::String, DerivedExpr::upper("name")),
///     )
///     .unwrap();
///
/// let master = registry.get("Master").unwrap();
/// assert!(master.is_derived("ucName"));
/// ```
#[derive(Debug, Default)]
pub struct ModelRegistry {
	models: RwLock<IndexMap<String, Arc<Model>>>,
}

impl ModelRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Build a definition and register the resulting model
	pub fn define(&self, definition: ModelDefinition) -> DerivedResult<Arc<Model>> {
		let mut models = self.models.write();
		if models.contains_key(definition.name()) {
			return Err(DerivedError::DuplicateModel(definition.name().to_string()));
		}

		let model = Arc::new(definition.build());
		tracing::debug!(
			model = model.name(),
			derived = model.derived().len(),
			associations = model.associations().len(),
			"Defined model"
		);
		models.insert(model.name().to_string(), Arc::clone(&model));
		Ok(model)
	}

	pub fn get(&self, name: &str) -> Option<Arc<Model>> {
		self.models.read().get(name).cloned()
	}

	/// Look up a model, failing with [`DerivedError::UnknownModel`]
	pub fn require(&self, name: &str) -> DerivedResult<Arc<Model>> {
		self.get(name)
			.ok_or_else(|| DerivedError::UnknownModel(name.to_string()))
	}

	/// Resolve an association of `model` to its target model
	pub fn association_target(&self, model: &Model, alias: &str) -> DerivedResult<Arc<Model>> {
		let association =
			model
				.association(alias)
				.ok_or_else(|| DerivedError::InvalidAssociation {
					association: alias.to_string(),
					model: model.name().to_string(),
				})?;
		self.require(association.target())
	}

	pub fn contains(&self, name: &str) -> bool {
		self.models.read().contains_key(name)
	}

	pub fn model_names(&self) -> Vec<String> {
		self.models.read().keys().cloned().collect()
	}

	pub fn len(&self) -> usize {
		self.models.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.models.read().is_empty()
	}
}
