//! Attribute selection rewriting

use crate::error::DerivedResult;
use crate::model::Model;
use crate::query::{Attribute, FindOptions};
use crate::registry::ModelRegistry;
use crate::resolver::ExpressionResolver;
use crate::settings::DerivedFieldsSettings;

/// Replaces derived attribute names with `(expression, name)` projections
#[derive(Debug, Clone, Copy)]
pub struct AttributeRewriter<'a> {
	resolver: ExpressionResolver<'a>,
}

impl<'a> AttributeRewriter<'a> {
	pub fn new(models: &'a ModelRegistry, settings: &'a DerivedFieldsSettings) -> Self {
		Self {
			resolver: ExpressionResolver::new(models, settings),
		}
	}

	/// Rewrite the attribute selection of one descriptor level
	///
	/// Selections are left as they are when the descriptor has none.
	/// Returns the number of projections created.
	pub fn rewrite(
		&self,
		model: &Model,
		options: &mut FindOptions,
		alias: &str,
	) -> DerivedResult<usize> {
		let Some(attributes) = options.attributes.as_ref() else {
			return Ok(0);
		};

		let mut rewritten = Vec::with_capacity(attributes.len());
		let mut count = 0;
		for attribute in attributes {
			let Attribute::Name(name) = attribute else {
				rewritten.push(attribute.clone());
				continue;
			};
			match self.resolver.resolve(model, name, alias)? {
				Some(resolved) => {
					tracing::debug!(
						model = model.name(),
						attribute = %name,
						alias = alias,
						"Projected derived attribute"
					);
					rewritten.push(Attribute::Expr {
						expr: resolved.expression,
						alias: name.clone(),
					});
					count += 1;
				}
				None => rewritten.push(attribute.clone()),
			}
		}

		options.attributes = Some(rewritten);
		Ok(count)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::expression::DerivedExpr;
	use crate::model::{FieldType, ModelDefinition};
	use crate::sql::render_expr;
	use rstest::rstest;
	use sea_query::Expr;

	fn registry() -> ModelRegistry {
		let registry = ModelRegistry::new();
		registry
			.define(
				ModelDefinition::new("Detail")
					.field("name", FieldType::String)
					.derived("lcName", FieldType::String, DerivedExpr::lower("name")),
			)
			.unwrap();
		registry
	}

	#[rstest]
	fn test_projects_derived_attributes_under_their_name() {
		let registry = registry();
		let settings = DerivedFieldsSettings::default();
		let rewriter = AttributeRewriter::new(&registry, &settings);
		let detail = registry.require("Detail").unwrap();
		let mut options = FindOptions::new().attributes(["name", "lcName"]);

		let count = rewriter.rewrite(&detail, &mut options, "detailcheta").unwrap();

		assert_eq!(count, 1);
		let attributes = options.attributes.unwrap();
		assert!(matches!(&attributes[0], Attribute::Name(n) if n == "name"));
		match &attributes[1] {
			Attribute::Expr { expr, alias } => {
				assert_eq!(alias, "lcName");
				assert_eq!(render_expr(expr), "LOWER(\"detailcheta\".\"name\")");
			}
			other => panic!("unexpected attribute: {other:?}"),
		}
	}

	#[rstest]
	fn test_existing_projections_are_kept() {
		let registry = registry();
		let settings = DerivedFieldsSettings::default();
		let rewriter = AttributeRewriter::new(&registry, &settings);
		let detail = registry.require("Detail").unwrap();
		let mut options = FindOptions::new();
		options.attributes = Some(vec![Attribute::Expr {
			expr: Expr::cust("1").into(),
			alias: "one".to_string(),
		}]);

		assert_eq!(rewriter.rewrite(&detail, &mut options, "Detail").unwrap(), 0);
		assert_eq!(options.attributes.unwrap()[0].name(), "one");
	}

	#[rstest]
	fn test_no_selection_is_left_alone() {
		let registry = registry();
		let settings = DerivedFieldsSettings::default();
		let rewriter = AttributeRewriter::new(&registry, &settings);
		let detail = registry.require("Detail").unwrap();
		let mut options = FindOptions::new();

		assert_eq!(rewriter.rewrite(&detail, &mut options, "Detail").unwrap(), 0);
		assert!(options.attributes.is_none());
	}
}
