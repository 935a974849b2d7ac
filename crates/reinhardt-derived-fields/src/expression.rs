//! SQL expressions backing derived fields
//!
//! A derived field is declared with either a fixed expression or a builder
//! that receives the alias path of the table the field is read from. The
//! builder form is what lets `ucName` render as `UPPER("Master"."name")` at
//! the top level and as `UPPER("Detail"."Master"."name")` when the same model
//! is reached through `$Master.ucName$` from `Detail`.

use crate::naming::{qualified_column, quote_alias};
use sea_query::{Expr, Func, SimpleExpr};
use std::fmt;
use std::sync::Arc;

/// Builder that renders an expression for a given alias path
pub type AliasedBuilder = Arc<dyn Fn(&str) -> SimpleExpr + Send + Sync>;

/// Placeholder replaced by the quoted alias path in [`DerivedExpr::raw`] templates
pub const ALIAS_PLACEHOLDER: &str = "{alias}";

/// The SQL definition of a derived field
#[derive(Clone)]
pub enum DerivedExpr {
	/// Expression that does not depend on where the field is read from
	Static(SimpleExpr),
	/// Expression produced per alias path
	Aliased(AliasedBuilder),
}

impl fmt::Debug for DerivedExpr {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Static(expr) => f.debug_tuple("Static").field(expr).finish(),
			Self::Aliased(_) => f.write_str("Aliased(<builder>)"),
		}
	}
}

impl DerivedExpr {
	/// Wrap an expression that ignores the alias
	pub fn fixed(expr: impl Into<SimpleExpr>) -> Self {
		Self::Static(expr.into())
	}

	/// Wrap an alias-dependent builder
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_derived_fields::expression::{DerivedExpr, column_expr};
	/// use reinhardt_derived_fields::sql::render_expr;
	/// use sea_query::{Func, SimpleExpr};
	///
	/// let expr = DerivedExpr::aliased(|alias| -> SimpleExpr {
	///     Func::upper(column_expr(alias, "name")).into()
	/// });
	/// assert_eq!(render_expr(&expr.build("Master")), "UPPER(\"Master\".\"name\")");
	/// ```
	pub fn aliased<F>(builder: F) -> Self
	where
		F: Fn(&str) -> SimpleExpr + Send + Sync + 'static,
	{
		Self::Aliased(Arc::new(builder))
	}

	/// Produce the expression for the given alias path
	pub fn build(&self, alias: &str) -> SimpleExpr {
		match self {
			Self::Static(expr) => expr.clone(),
			Self::Aliased(builder) => builder(alias),
		}
	}

	pub fn is_alias_dependent(&self) -> bool {
		matches!(self, Self::Aliased(_))
	}

	/// A physical column read through the alias
	pub fn column(column: impl Into<String>) -> Self {
		let column = column.into();
		Self::aliased(move |alias| column_expr(alias, &column))
	}

	/// `UPPER("alias"."column")`
	pub fn upper(column: impl Into<String>) -> Self {
		let column = column.into();
		Self::aliased(move |alias| Func::upper(column_expr(alias, &column)).into())
	}

	/// `LOWER("alias"."column")`
	pub fn lower(column: impl Into<String>) -> Self {
		let column = column.into();
		Self::aliased(move |alias| Func::lower(column_expr(alias, &column)).into())
	}

	/// `COALESCE("alias"."column", <fallback>)`, with the fallback given as SQL
	pub fn coalesce(column: impl Into<String>, fallback_sql: impl Into<String>) -> Self {
		let column = column.into();
		let fallback = fallback_sql.into();
		Self::aliased(move |alias| {
			Expr::cust(format!(
				"COALESCE({}, {})",
				qualified_column(alias, &column),
				fallback
			))
			.into()
		})
	}

	/// `CONCAT(...)` over columns and single-quoted SQL literals
	///
	/// Parts starting with `'` are emitted as-is, everything else is treated
	/// as a column of the aliased table.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_derived_fields::expression::DerivedExpr;
	/// use reinhardt_derived_fields::sql::render_expr;
	///
	/// let full_name = DerivedExpr::concat(["first_name", "' '", "last_name"]);
	/// assert_eq!(
	///     render_expr(&full_name.build("User")),
	///     "CONCAT(\"User\".\"first_name\", ' ', \"User\".\"last_name\")"
	/// );
	/// ```
	pub fn concat<I, S>(parts: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let parts: Vec<String> = parts.into_iter().map(Into::into).collect();
		Self::aliased(move |alias| {
			let rendered = parts
				.iter()
				.map(|part| {
					if part.starts_with('\'') {
						part.clone()
					} else {
						qualified_column(alias, part)
					}
				})
				.collect::<Vec<_>>()
				.join(", ");
			Expr::cust(format!("CONCAT({})", rendered)).into()
		})
	}

	/// Raw SQL template; every `{alias}` is replaced by the quoted alias path
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_derived_fields::expression::DerivedExpr;
	/// use reinhardt_derived_fields::sql::render_expr;
	///
	/// let interval = DerivedExpr::raw("{alias}.\"validUntil\" - NOW()");
	/// assert_eq!(
	///     render_expr(&interval.build("Master")),
	///     "\"Master\".\"validUntil\" - NOW()"
	/// );
	/// ```
	pub fn raw(template: impl Into<String>) -> Self {
		let template = template.into();
		if !template.contains(ALIAS_PLACEHOLDER) {
			return Self::Static(Expr::cust(template).into());
		}
		Self::aliased(move |alias| {
			Expr::cust(template.replace(ALIAS_PLACEHOLDER, &quote_alias(alias))).into()
		})
	}
}

impl From<SimpleExpr> for DerivedExpr {
	fn from(expr: SimpleExpr) -> Self {
		Self::Static(expr)
	}
}

/// Column reference qualified by an alias path
pub fn column_expr(alias: &str, column: &str) -> SimpleExpr {
	Expr::cust(qualified_column(alias, column)).into()
}
