//! SQL rendering helpers

use crate::error::DerivedResult;
use crate::query::WhereClause;
use crate::registry::ModelRegistry;
use crate::resolver::ExpressionResolver;
use crate::rewrite::PredicateRewriter;
use crate::settings::DerivedFieldsSettings;
use sea_query::{PostgresQueryBuilder, Query, SimpleExpr};

/// Render an expression as PostgreSQL with inlined values
///
/// # Examples
///
/// ```
/// use reinhardt_derived_fields::sql::render_expr;
/// use sea_query::{Expr, ExprTrait};
///
/// let expr = Expr::cust("\"Master\".\"name\"").eq("x");
/// assert_eq!(render_expr(&expr), "\"Master\".\"name\" = 'x'");
/// ```
pub fn render_expr(expr: &SimpleExpr) -> String {
	let sql = Query::select().expr(expr.clone()).to_string(PostgresQueryBuilder);
	match sql.strip_prefix("SELECT ") {
		Some(rendered) => rendered.to_string(),
		None => sql,
	}
}

/// SQL of a derived reference on `model_name`, read through the model name
///
/// Returns `Ok(None)` when the reference is not derived.
///
/// # Examples
///
/// ```
/// use reinhardt_derived_fields::expression::DerivedExpr;
/// use reinhardt_derived_fields::model::{Association, FieldType, ModelDefinition};
/// use reinhardt_derived_fields::registry::ModelRegistry;
/// use reinhardt_derived_fields::settings::DerivedFieldsSettings;
/// use reinhardt_derived_fields::sql::derived_expr_sql;
///
/// let registry = ModelRegistry::new();
/// registry
///     .define(
///         ModelDefinition::new("Master")
///             .field("name", FieldType::String)
///             .derived("ucName", FieldType::String, DerivedExpr::upper("name")),
///     )
///     .unwrap();
/// registry
///     .define(ModelDefinition::new("Detail").association(Association::new("Master")))
///     .unwrap();
///
/// let settings = DerivedFieldsSettings::default();
/// assert_eq!(
///     derived_expr_sql(&registry, &settings, "Detail", "$Master.ucName$").unwrap(),
///     Some("UPPER(\"Master\".\"name\")".to_string())
/// );
/// ```
pub fn derived_expr_sql(
	models: &ModelRegistry,
	settings: &DerivedFieldsSettings,
	model_name: &str,
	reference: &str,
) -> DerivedResult<Option<String>> {
	let model = models.require(model_name)?;
	let resolver = ExpressionResolver::new(models, settings);
	Ok(resolver
		.resolve(&model, reference, model.name())?
		.map(|resolved| render_expr(&resolved.expression)))
}

/// Rewrite a where clause for `model_name` and render it as one condition
///
/// Plain keys are qualified with the model name. An empty clause renders as
/// an empty string.
pub fn where_conditions(
	models: &ModelRegistry,
	settings: &DerivedFieldsSettings,
	model_name: &str,
	mut where_clause: WhereClause,
) -> DerivedResult<String> {
	let model = models.require(model_name)?;
	PredicateRewriter::new(models, settings).rewrite_where(&model, &mut where_clause, model.name())?;
	Ok(where_clause
		.to_condition(model.name())
		.map(|condition| render_expr(&condition))
		.unwrap_or_default())
}
