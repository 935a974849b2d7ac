//! Counting with derived predicates
//!
//! [`CountPatch`] wraps a host counting routine so that every count call has
//! its derived predicates rewritten first, the same way find calls do.

use crate::error::DerivedResult;
use crate::model::Model;
use crate::query::FindOptions;
use crate::registry::ModelRegistry;
use crate::rewrite::rewrite_count_options;
use crate::settings::DerivedFieldsSettings;
use std::sync::Arc;

/// A host routine that counts rows for a model
pub trait Counter {
	type Output;

	fn count(&self, model: &Model, options: FindOptions) -> Self::Output;
}

impl<F, T> Counter for F
where
	F: Fn(&Model, FindOptions) -> T,
{
	type Output = T;

	fn count(&self, model: &Model, options: FindOptions) -> T {
		self(model, options)
	}
}

/// Counter wrapper that rewrites derived predicates before delegating
///
/// # Examples
///
/// ```
/// use reinhardt_derived_fields::count::CountPatch;
/// use reinhardt_derived_fields::expression::DerivedExpr;
/// use reinhardt_derived_fields::model::{FieldType, Model, ModelDefinition};
/// use reinhardt_derived_fields::query::{FindOptions, WhereClause};
/// use reinhardt_derived_fields::registry::ModelRegistry;
/// use reinhardt_derived_fields::settings::DerivedFieldsSettings;
/// use std::sync::Arc;
///
/// let registry = Arc::new(ModelRegistry::new());
/// let master = registry
///     .define(
///         ModelDefinition::new("Master")
///             .field("name", FieldType::String)
///             .derived("ucName", FieldType::String, DerivedExpr::upper("name")),
///     )
///     .unwrap();
///
/// let patch = CountPatch::new(
///     Arc::clone(&registry),
///     DerivedFieldsSettings::default(),
///     |_: &Model, options: FindOptions| options.where_clause.map_or(0, |w| w.conjunction().len()),
/// );
///
/// let options = FindOptions::new().filter(WhereClause::new().eq("ucName", "MASTER"));
/// assert_eq!(patch.count(&master, options).unwrap(), 1);
/// ```
pub struct CountPatch<C> {
	models: Arc<ModelRegistry>,
	settings: DerivedFieldsSettings,
	inner: C,
}

impl<C: Counter> CountPatch<C> {
	pub fn new(models: Arc<ModelRegistry>, settings: DerivedFieldsSettings, inner: C) -> Self {
		Self {
			models,
			settings,
			inner,
		}
	}

	/// Rewrite `options` for counting and delegate to the wrapped counter
	pub fn count(&self, model: &Model, mut options: FindOptions) -> DerivedResult<C::Output> {
		rewrite_count_options(&self.models, &self.settings, model, &mut options)?;
		Ok(self.inner.count(model, options))
	}

	pub fn inner(&self) -> &C {
		&self.inner
	}

	pub fn into_inner(self) -> C {
		self.inner
	}
}
