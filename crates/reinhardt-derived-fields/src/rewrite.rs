//! Query descriptor rewriting
//!
//! The rewriters turn derived references into SQL expressions:
//!
//! - [`PredicateRewriter`] moves derived where entries into the conjunction list
//! - [`AttributeRewriter`] projects derived attributes as `(expression, name)`
//! - [`OrderRewriter`] turns order references into sort expressions
//! - [`TreeRewriter`] applies the first two to a descriptor and its includes

pub mod attributes;
pub mod order;
pub mod predicate;
pub mod tree;

pub use attributes::AttributeRewriter;
pub use order::OrderRewriter;
pub use predicate::PredicateRewriter;
pub use tree::{IncludeNode, RewriteStats, TreeMode, TreeRewriter, normalize_include};

use crate::error::DerivedResult;
use crate::model::Model;
use crate::query::FindOptions;
use crate::registry::ModelRegistry;
use crate::settings::DerivedFieldsSettings;

/// Rewrite predicates and attribute selections of a find descriptor
///
/// Returns `Ok(false)` without touching the descriptor when it was already
/// rewritten.
///
/// # Examples
///
/// ```
/// use reinhardt_derived_fields::expression::DerivedExpr;
/// use reinhardt_derived_fields::model::{FieldType, ModelDefinition};
/// use reinhardt_derived_fields::query::{FindOptions, WhereClause};
/// use reinhardt_derived_fields::registry::ModelRegistry;
/// use reinhardt_derived_fields::rewrite::rewrite_find_options;
/// use reinhardt_derived_fields::settings::DerivedFieldsSettings;
///
/// let registry = ModelRegistry::new();
/// let master = registry
///     .define(
///         ModelDefinition::new("Master")
///             .field("name", FieldType::String)
///             .derived("ucName", FieldType::String, DerivedExpr::upper("name")),
///     )
///     .unwrap();
/// let settings = DerivedFieldsSettings::default();
/// let mut options = FindOptions::new().filter(WhereClause::new().eq("ucName", "MASTER"));
///
/// assert!(rewrite_find_options(&registry, &settings, &master, &mut options).unwrap());
/// assert!(!rewrite_find_options(&registry, &settings, &master, &mut options).unwrap());
/// assert!(options.marks().fields);
/// ```
pub fn rewrite_find_options(
	models: &ModelRegistry,
	settings: &DerivedFieldsSettings,
	model: &Model,
	options: &mut FindOptions,
) -> DerivedResult<bool> {
	if options.marks().fields {
		tracing::warn!(model = model.name(), "Find options already rewritten; skipping");
		return Ok(false);
	}

	let stats = TreeRewriter::new(models, settings, TreeMode::Find).rewrite(model, options)?;
	options.marks_mut().fields = true;
	tracing::debug!(
		model = model.name(),
		predicates = stats.predicates,
		attributes = stats.attributes,
		levels = stats.levels,
		"Rewrote find options"
	);
	Ok(true)
}

/// Rewrite the order list of a find descriptor
///
/// Returns `Ok(false)` without touching the descriptor when it was already
/// rewritten.
pub fn rewrite_order_options(
	models: &ModelRegistry,
	settings: &DerivedFieldsSettings,
	model: &Model,
	options: &mut FindOptions,
) -> DerivedResult<bool> {
	if options.marks().order {
		tracing::warn!(model = model.name(), "Order already rewritten; skipping");
		return Ok(false);
	}

	let count = OrderRewriter::new(models, settings).rewrite(model, options)?;
	options.marks_mut().order = true;
	tracing::debug!(model = model.name(), items = count, "Rewrote order");
	Ok(true)
}

/// Rewrite the predicates of a count descriptor
///
/// Returns `Ok(false)` without touching the descriptor when it was already
/// rewritten.
pub fn rewrite_count_options(
	models: &ModelRegistry,
	settings: &DerivedFieldsSettings,
	model: &Model,
	options: &mut FindOptions,
) -> DerivedResult<bool> {
	if options.marks().count {
		tracing::warn!(model = model.name(), "Count options already rewritten; skipping");
		return Ok(false);
	}

	let stats = TreeRewriter::new(models, settings, TreeMode::Count).rewrite(model, options)?;
	options.marks_mut().count = true;
	tracing::debug!(
		model = model.name(),
		predicates = stats.predicates,
		"Rewrote count options"
	);
	Ok(true)
}
