//! Where clause rewriting

use crate::error::DerivedResult;
use crate::model::Model;
use crate::query::{Attribute, FindOptions, WhereClause, describe_key};
use crate::registry::ModelRegistry;
use crate::resolver::ExpressionResolver;
use crate::settings::DerivedFieldsSettings;
use sea_query::SimpleExpr;

/// Moves derived predicates out of the keyed where map into the conjunction list
#[derive(Debug, Clone, Copy)]
pub struct PredicateRewriter<'a> {
	resolver: ExpressionResolver<'a>,
}

impl<'a> PredicateRewriter<'a> {
	pub fn new(models: &'a ModelRegistry, settings: &'a DerivedFieldsSettings) -> Self {
		Self {
			resolver: ExpressionResolver::new(models, settings),
		}
	}

	/// Rewrite the where clause of one descriptor level
	///
	/// When the descriptor has no attribute selection it receives the model's
	/// full field list, so derived fields are projected alongside the
	/// physical ones. Returns the number of rewritten predicates.
	pub fn rewrite(
		&self,
		model: &Model,
		options: &mut FindOptions,
		alias: &str,
	) -> DerivedResult<usize> {
		let pending = match options.where_clause.as_ref() {
			Some(where_clause) => self.resolve_all(model, where_clause, alias)?,
			None => Vec::new(),
		};

		if options.attributes.is_none() && self.resolver.settings().expand_default_attributes {
			options.attributes = Some(
				model
					.field_names()
					.into_iter()
					.map(Attribute::Name)
					.collect(),
			);
		}

		match options.where_clause.as_mut() {
			Some(where_clause) => Ok(apply(model, where_clause, pending, alias)),
			None => Ok(0),
		}
	}

	/// Rewrite a where clause in place
	///
	/// Every key is resolved before anything is changed, so a failing key
	/// leaves the clause untouched.
	pub fn rewrite_where(
		&self,
		model: &Model,
		where_clause: &mut WhereClause,
		alias: &str,
	) -> DerivedResult<usize> {
		let pending = self.resolve_all(model, where_clause, alias)?;
		Ok(apply(model, where_clause, pending, alias))
	}

	fn resolve_all(
		&self,
		model: &Model,
		where_clause: &WhereClause,
		alias: &str,
	) -> DerivedResult<Vec<(String, SimpleExpr)>> {
		let mut pending = Vec::new();
		for (key, value) in where_clause.fields() {
			match self.resolver.resolve(model, key, alias)? {
				Some(resolved) => pending.push((key.clone(), value.compare(resolved.expression))),
				None => tracing::trace!(
					model = model.name(),
					column = %describe_key(alias, key),
					"Predicate left to the host query"
				),
			}
		}
		Ok(pending)
	}
}

fn apply(
	model: &Model,
	where_clause: &mut WhereClause,
	pending: Vec<(String, SimpleExpr)>,
	alias: &str,
) -> usize {
	let count = pending.len();
	for (key, condition) in pending {
		where_clause.remove(&key);
		where_clause.push_conjunction(condition);
		tracing::debug!(
			model = model.name(),
			key = %key,
			alias = alias,
			"Rewrote derived predicate"
		);
	}
	count
}
