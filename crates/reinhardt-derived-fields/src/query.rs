//! Query descriptors handed to the rewriters
//!
//! [`FindOptions`] mirrors what a find or count call carries: a where clause,
//! an attribute selection, ordering, and nested includes. The rewriters
//! replace derived references in these structures with SQL expressions.

use crate::expression::column_expr;
use crate::naming::{quote_path, qualified_column};
use crate::reference::DottedReference;
use indexmap::IndexMap;
use sea_query::{BinOper, Expr, ExprTrait, SimpleExpr};
use serde::{Deserialize, Serialize};

/// A literal compared against a column or expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterValue {
	String(String),
	Integer(i64),
	Float(f64),
	Boolean(bool),
	Null,
	/// SQL fragment inserted as-is
	Raw(String),
}

impl FilterValue {
	pub fn raw(sql: impl Into<String>) -> Self {
		Self::Raw(sql.into())
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	/// Convert to a query expression
	pub fn to_expr(&self) -> SimpleExpr {
		match self {
			Self::String(s) => Expr::val(s.clone()).into(),
			Self::Integer(i) => Expr::val(*i).into(),
			Self::Float(f) => Expr::val(*f).into(),
			Self::Boolean(b) => Expr::val(*b).into(),
			Self::Null => Expr::cust("NULL").into(),
			Self::Raw(sql) => Expr::cust(sql.clone()).into(),
		}
	}

	/// Pattern text for `LIKE`, or `None` when the value is SQL rather than a literal
	fn to_like_pattern(&self) -> Option<String> {
		match self {
			Self::String(s) => Some(s.clone()),
			Self::Integer(i) => Some(i.to_string()),
			Self::Float(f) => Some(f.to_string()),
			Self::Boolean(b) => Some(b.to_string()),
			Self::Null | Self::Raw(_) => None,
		}
	}
}

impl From<String> for FilterValue {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}

impl From<&str> for FilterValue {
	fn from(value: &str) -> Self {
		Self::String(value.to_string())
	}
}

impl From<i64> for FilterValue {
	fn from(value: i64) -> Self {
		Self::Integer(value)
	}
}

impl From<i32> for FilterValue {
	fn from(value: i32) -> Self {
		Self::Integer(i64::from(value))
	}
}

impl From<f64> for FilterValue {
	fn from(value: f64) -> Self {
		Self::Float(value)
	}
}

impl From<bool> for FilterValue {
	fn from(value: bool) -> Self {
		Self::Boolean(value)
	}
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Null, Into::into)
	}
}

/// Comparison operators usable in an operator map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOperator {
	Eq,
	Ne,
	Gt,
	Gte,
	Lt,
	Lte,
	In,
	NotIn,
	Like,
	NotLike,
	IsNull,
	IsNotNull,
}

/// Value side of a where clause entry
#[derive(Debug, Clone, PartialEq)]
pub enum WhereValue {
	/// Equality, or `IS NULL` for [`FilterValue::Null`]
	Value(FilterValue),
	/// Membership test
	List(Vec<FilterValue>),
	/// Operator map; every entry must hold
	Operators(Vec<(FilterOperator, WhereValue)>),
}

impl WhereValue {
	/// Build the boolean test of `lhs` against this value
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_derived_fields::query::{FilterValue, WhereValue};
	/// use reinhardt_derived_fields::sql::render_expr;
	/// use sea_query::Expr;
	///
	/// let value = WhereValue::List(vec!["MASTER".into(), "ANOTHER".into()]);
	/// let test = value.compare(Expr::cust("UPPER(\"Master\".\"name\")").into());
	/// assert_eq!(
	///     render_expr(&test),
	///     "UPPER(\"Master\".\"name\") IN ('MASTER', 'ANOTHER')"
	/// );
	/// ```
	pub fn compare(&self, lhs: SimpleExpr) -> SimpleExpr {
		match self {
			Self::Value(FilterValue::Null) => lhs.is_null(),
			Self::Value(value) => lhs.eq(value.to_expr()),
			Self::List(values) => lhs.is_in(values.iter().map(FilterValue::to_expr)),
			Self::Operators(operators) => operators
				.iter()
				.map(|(operator, value)| apply_operator(lhs.clone(), *operator, value))
				.reduce(|acc, test| acc.and(test))
				.unwrap_or_else(|| Expr::cust("TRUE").into()),
		}
	}
}

fn apply_operator(lhs: SimpleExpr, operator: FilterOperator, value: &WhereValue) -> SimpleExpr {
	let single = match value {
		WhereValue::Value(v) => v,
		WhereValue::List(values) => {
			return match operator {
				FilterOperator::Ne | FilterOperator::NotIn => {
					lhs.is_not_in(values.iter().map(FilterValue::to_expr))
				}
				_ => lhs.is_in(values.iter().map(FilterValue::to_expr)),
			};
		}
		WhereValue::Operators(_) => return value.compare(lhs),
	};

	match (operator, single) {
		(FilterOperator::Eq, FilterValue::Null) => lhs.is_null(),
		(FilterOperator::Ne, FilterValue::Null) => lhs.is_not_null(),
		(FilterOperator::Eq, v) => lhs.eq(v.to_expr()),
		(FilterOperator::Ne, v) => lhs.ne(v.to_expr()),
		(FilterOperator::Gt, v) => lhs.gt(v.to_expr()),
		(FilterOperator::Gte, v) => lhs.gte(v.to_expr()),
		(FilterOperator::Lt, v) => lhs.lt(v.to_expr()),
		(FilterOperator::Lte, v) => lhs.lte(v.to_expr()),
		(FilterOperator::In, v) => lhs.is_in([v.to_expr()]),
		(FilterOperator::NotIn, v) => lhs.is_not_in([v.to_expr()]),
		(FilterOperator::Like, v) => match v.to_like_pattern() {
			Some(pattern) => lhs.like(pattern),
			None => lhs.binary(BinOper::Like, v.to_expr()),
		},
		(FilterOperator::NotLike, v) => match v.to_like_pattern() {
			Some(pattern) => lhs.not_like(pattern),
			None => lhs.binary(BinOper::NotLike, v.to_expr()),
		},
		(FilterOperator::IsNull, _) => lhs.is_null(),
		(FilterOperator::IsNotNull, _) => lhs.is_not_null(),
	}
}

impl From<FilterValue> for WhereValue {
	fn from(value: FilterValue) -> Self {
		Self::Value(value)
	}
}

/// Field-keyed predicates plus an ordered list of extra conjuncts
///
/// Rewritten derived predicates are removed from the keyed map and appended
/// to the conjunction list as complete boolean expressions.
#[derive(Debug, Clone, Default)]
pub struct WhereClause {
	fields: IndexMap<String, WhereValue>,
	conjunction: Vec<SimpleExpr>,
}

impl WhereClause {
	pub fn new() -> Self {
		Self::default()
	}

	/// `key = value`
	pub fn eq(self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
		self.value(key, WhereValue::Value(value.into()))
	}

	/// `key IN (values...)`
	pub fn is_in<I, V>(self, key: impl Into<String>, values: I) -> Self
	where
		I: IntoIterator<Item = V>,
		V: Into<FilterValue>,
	{
		self.value(
			key,
			WhereValue::List(values.into_iter().map(Into::into).collect()),
		)
	}

	/// Add an operator test on `key`, merging with an existing operator map
	pub fn op(
		mut self,
		key: impl Into<String>,
		operator: FilterOperator,
		value: impl Into<WhereValue>,
	) -> Self {
		let key = key.into();
		let value = value.into();
		match self.fields.get_mut(&key) {
			Some(WhereValue::Operators(operators)) => operators.push((operator, value)),
			_ => {
				self.fields
					.insert(key, WhereValue::Operators(vec![(operator, value)]));
			}
		}
		self
	}

	pub fn value(mut self, key: impl Into<String>, value: WhereValue) -> Self {
		self.fields.insert(key.into(), value);
		self
	}

	/// Append a complete boolean expression
	pub fn and(mut self, expr: SimpleExpr) -> Self {
		self.conjunction.push(expr);
		self
	}

	pub fn fields(&self) -> &IndexMap<String, WhereValue> {
		&self.fields
	}

	pub fn get(&self, key: &str) -> Option<&WhereValue> {
		self.fields.get(key)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.fields.contains_key(key)
	}

	/// Remove a keyed predicate, keeping the order of the rest
	pub fn remove(&mut self, key: &str) -> Option<WhereValue> {
		self.fields.shift_remove(key)
	}

	pub fn conjunction(&self) -> &[SimpleExpr] {
		&self.conjunction
	}

	pub fn push_conjunction(&mut self, expr: SimpleExpr) {
		self.conjunction.push(expr);
	}

	pub fn is_empty(&self) -> bool {
		self.fields.is_empty() && self.conjunction.is_empty()
	}

	/// Combine every predicate into one expression
	///
	/// Plain keys are qualified with `alias`. Keys that are still dotted
	/// references address a joined table by their full path.
	pub fn to_condition(&self, alias: &str) -> Option<SimpleExpr> {
		self.fields
			.iter()
			.map(|(key, value)| {
				let lhs = match DottedReference::parse(key) {
					Some(reference) => Expr::cust(quote_path(reference.segments())).into(),
					None => column_expr(alias, key),
				};
				value.compare(lhs)
			})
			.chain(self.conjunction.iter().cloned())
			.reduce(|acc, test| acc.and(test))
	}
}

/// One entry of an attribute selection
#[derive(Debug, Clone)]
pub enum Attribute {
	/// A field name or dotted reference
	Name(String),
	/// A computed column projected under `alias`
	Expr { expr: SimpleExpr, alias: String },
}

impl Attribute {
	/// Projected name of the attribute
	pub fn name(&self) -> &str {
		match self {
			Self::Name(name) => name,
			Self::Expr { alias, .. } => alias,
		}
	}

	pub fn is_expr(&self) -> bool {
		matches!(self, Self::Expr { .. })
	}
}

impl From<&str> for Attribute {
	fn from(name: &str) -> Self {
		Self::Name(name.to_string())
	}
}

impl From<String> for Attribute {
	fn from(name: String) -> Self {
		Self::Name(name)
	}
}

/// One entry of an order list
#[derive(Debug, Clone)]
pub enum OrderItem {
	/// A bare reference, sorted in the default direction
	Name(String),
	/// `[reference, direction]`; other arities pass through untouched
	Seq(Vec<String>),
	/// A sort expression
	Expr { expr: SimpleExpr, direction: String },
}

impl OrderItem {
	pub fn pair(reference: impl Into<String>, direction: impl Into<String>) -> Self {
		Self::Seq(vec![reference.into(), direction.into()])
	}

	pub fn asc(reference: impl Into<String>) -> Self {
		Self::pair(reference, "ASC")
	}

	pub fn desc(reference: impl Into<String>) -> Self {
		Self::pair(reference, "DESC")
	}

	pub fn is_expr(&self) -> bool {
		matches!(self, Self::Expr { .. })
	}
}

impl From<&str> for OrderItem {
	fn from(reference: &str) -> Self {
		Self::Name(reference.to_string())
	}
}

/// What an include points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncludeTarget {
	/// An association alias of the including model
	Association(String),
	/// A model, optionally with an explicit alias
	Model { model: String, alias: Option<String> },
}

/// A nested include with its own descriptor
#[derive(Debug, Clone)]
pub struct Include {
	pub target: IncludeTarget,
	pub options: FindOptions,
}

impl Include {
	fn with_target(target: IncludeTarget) -> Self {
		Self {
			target,
			options: FindOptions::default(),
		}
	}

	/// Include through an association alias
	pub fn association(alias: impl Into<String>) -> Self {
		Self::with_target(IncludeTarget::Association(alias.into()))
	}

	/// Include a model under its default alias
	pub fn model(model: impl Into<String>) -> Self {
		Self::with_target(IncludeTarget::Model {
			model: model.into(),
			alias: None,
		})
	}

	/// Include a model under an explicit alias
	pub fn model_as(model: impl Into<String>, alias: impl Into<String>) -> Self {
		Self::with_target(IncludeTarget::Model {
			model: model.into(),
			alias: Some(alias.into()),
		})
	}

	pub fn filter(mut self, where_clause: WhereClause) -> Self {
		self.options.where_clause = Some(where_clause);
		self
	}

	pub fn attributes<I, A>(mut self, attributes: I) -> Self
	where
		I: IntoIterator<Item = A>,
		A: Into<Attribute>,
	{
		self.options.attributes = Some(attributes.into_iter().map(Into::into).collect());
		self
	}

	pub fn include(mut self, include: Include) -> Self {
		self.options.include.push(include);
		self
	}
}

/// Flags recording which rewrites already ran on a descriptor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteMarks {
	pub fields: bool,
	pub order: bool,
	pub count: bool,
}

/// Options of a find or count call
///
/// # Examples
///
/// ```
/// use reinhardt_derived_fields::query::{FindOptions, Include, OrderItem, WhereClause};
///
/// let options = FindOptions::new()
///     .filter(WhereClause::new().eq("$detailcheta.lcName$", "detail"))
///     .include(Include::association("detailcheta"))
///     .order(OrderItem::desc("ucName"))
///     .limit(10);
///
/// assert_eq!(options.include.len(), 1);
/// assert_eq!(options.limit, Some(10));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
	pub where_clause: Option<WhereClause>,
	pub attributes: Option<Vec<Attribute>>,
	pub order: Option<Vec<OrderItem>>,
	pub include: Vec<Include>,
	pub limit: Option<u64>,
	pub offset: Option<u64>,
	marks: RewriteMarks,
}

impl FindOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn filter(mut self, where_clause: WhereClause) -> Self {
		self.where_clause = Some(where_clause);
		self
	}

	pub fn attributes<I, A>(mut self, attributes: I) -> Self
	where
		I: IntoIterator<Item = A>,
		A: Into<Attribute>,
	{
		self.attributes = Some(attributes.into_iter().map(Into::into).collect());
		self
	}

	/// Append an order item
	pub fn order(mut self, item: impl Into<OrderItem>) -> Self {
		self.order.get_or_insert_with(Vec::new).push(item.into());
		self
	}

	pub fn include(mut self, include: Include) -> Self {
		self.include.push(include);
		self
	}

	pub fn limit(mut self, limit: u64) -> Self {
		self.limit = Some(limit);
		self
	}

	pub fn offset(mut self, offset: u64) -> Self {
		self.offset = Some(offset);
		self
	}

	pub fn marks(&self) -> RewriteMarks {
		self.marks
	}

	pub(crate) fn marks_mut(&mut self) -> &mut RewriteMarks {
		&mut self.marks
	}
}

/// Render a where clause entry for a plain column, used by debug output
pub(crate) fn describe_key(alias: &str, key: &str) -> String {
	match DottedReference::parse(key) {
		Some(reference) => quote_path(reference.segments()),
		None => qualified_column(alias, key),
	}
}
