//! Resolution of field references to derived SQL expressions
//!
//! A key resolves when it names a derived field of the model, or when it is a
//! dotted reference whose association path leads to a model where the last
//! segment names a derived field. Everything else is left to the host ORM.

use crate::error::{DerivedError, DerivedResult};
use crate::model::Model;
use crate::reference::{AssociationPath, DottedReference};
use crate::registry::ModelRegistry;
use crate::settings::DerivedFieldsSettings;
use sea_query::SimpleExpr;
use std::sync::Arc;

/// A derived field reference turned into an expression
#[derive(Debug, Clone)]
pub struct Resolved {
	/// Expression built for `alias`
	pub expression: SimpleExpr,
	/// Alias path the expression reads from
	pub alias: String,
	/// Name of the model declaring the derived field
	pub model: String,
	pub field: String,
}

/// Where an association path leads
enum Target {
	/// The model the path was walked from
	Current,
	Associated(Arc<Model>),
}

/// Resolves keys against a model registry
///
/// # Examples
///
/// ```
/// use reinhardt_derived_fields::expression::DerivedExpr;
/// use reinhardt_derived_fields::model::{Association, FieldType, ModelDefinition};
/// use reinhardt_derived_fields::registry::ModelRegistry;
/// use reinhardt_derived_fields::resolver::ExpressionResolver;
/// use reinhardt_derived_fields::settings::DerivedFieldsSettings;
/// use reinhardt_derived_fields::sql::render_expr;
///
/// let registry = ModelRegistry::new();
/// registry
///     .define(
///         ModelDefinition::new("Master")
///             .field("name", FieldType::String)
///             .derived("ucName", FieldType::String, DerivedExpr::upper("name")),
///     )
///     .unwrap();
/// let detail = registry
///     .define(ModelDefinition::new("Detail").association(Association::new("Master")))
///     .unwrap();
///
/// let settings = DerivedFieldsSettings::default();
/// let resolver = ExpressionResolver::new(&registry, &settings);
/// let resolved = resolver.resolve(&detail, "$Master.ucName$", "Detail").unwrap().unwrap();
/// assert_eq!(render_expr(&resolved.expression), "UPPER(\"Master\".\"name\")");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ExpressionResolver<'a> {
	models: &'a ModelRegistry,
	settings: &'a DerivedFieldsSettings,
}

impl<'a> ExpressionResolver<'a> {
	pub fn new(models: &'a ModelRegistry, settings: &'a DerivedFieldsSettings) -> Self {
		Self { models, settings }
	}

	pub fn models(&self) -> &'a ModelRegistry {
		self.models
	}

	pub fn settings(&self) -> &'a DerivedFieldsSettings {
		self.settings
	}

	/// Resolve `key` on `model`, read through `alias`
	///
	/// Returns `Ok(None)` when the key is not derived. A dotted reference
	/// whose path names a missing association fails with
	/// [`DerivedError::InvalidAssociation`].
	pub fn resolve(
		&self,
		model: &Model,
		key: &str,
		alias: &str,
	) -> DerivedResult<Option<Resolved>> {
		if let Some(expression) = model.derived_expr(key) {
			return Ok(Some(Resolved {
				expression: expression.build(alias),
				alias: alias.to_string(),
				model: model.name().to_string(),
				field: key.to_string(),
			}));
		}

		let Some(reference) = DottedReference::parse(key) else {
			return Ok(None);
		};

		match self.walk(model, reference.path())? {
			Target::Current => self.resolve(model, reference.field(), alias),
			Target::Associated(target) => {
				self.resolve(&target, reference.field(), &reference.path().join())
			}
		}
	}

	/// Model reached by walking `path` from `model`
	pub fn submodel(&self, model: &Arc<Model>, path: &AssociationPath) -> DerivedResult<Arc<Model>> {
		Ok(match self.walk(model, path)? {
			Target::Current => Arc::clone(model),
			Target::Associated(target) => target,
		})
	}

	fn walk(&self, model: &Model, path: &AssociationPath) -> DerivedResult<Target> {
		if path.is_empty() || self.is_self_reference(model, path)? {
			return Ok(Target::Current);
		}

		let mut current: Option<Arc<Model>> = None;
		for segment in path.segments() {
			let next = {
				let owner = current.as_deref().unwrap_or(model);
				self.models.association_target(owner, segment)?
			};
			current = Some(next);
		}

		Ok(current.map_or(Target::Current, Target::Associated))
	}

	/// A single-segment path naming the model itself refers to the model,
	/// unless an association of that name exists.
	fn is_self_reference(&self, model: &Model, path: &AssociationPath) -> DerivedResult<bool> {
		let [segment] = path.segments() else {
			return Ok(false);
		};
		if segment != model.name() {
			return Ok(false);
		}
		if model.association(segment).is_none() {
			return Ok(true);
		}

		if self.settings.reject_ambiguous_self_reference {
			return Err(DerivedError::AmbiguousSelfReference {
				model: model.name().to_string(),
			});
		}
		tracing::warn!(
			model = model.name(),
			"Reference prefix names both the model and one of its associations; using the association"
		);
		Ok(false)
	}
}
