//! Model definitions with derived fields
//!
//! A model is declared through a [`ModelDefinition`]. Attributes carrying a
//! [`DerivedExpr`] are virtual: when the definition is built they are moved
//! out of the physical attribute set into the model's derived map, and each
//! gets a read accessor so loaded rows expose the computed value under the
//! field name.

use crate::expression::DerivedExpr;
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;

/// A loaded row, keyed by projected column name
pub type Row = IndexMap<String, JsonValue>;

/// Read accessor for an attribute
pub type Getter = Arc<dyn Fn(&Row) -> Option<JsonValue> + Send + Sync>;

/// Storage type of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
	String,
	Text,
	Integer,
	BigInteger,
	Float,
	Boolean,
	Date,
	DateTime,
	Interval,
	Json,
}

/// Declaration of a single attribute
#[derive(Clone)]
pub struct AttributeDefinition {
	field_type: FieldType,
	expression: Option<DerivedExpr>,
	getter: Option<Getter>,
}

impl fmt::Debug for AttributeDefinition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AttributeDefinition")
			.field("field_type", &self.field_type)
			.field("expression", &self.expression)
			.field("getter", &self.getter.as_ref().map(|_| "<getter>"))
			.finish()
	}
}

impl AttributeDefinition {
	/// A physical column
	pub fn new(field_type: FieldType) -> Self {
		Self {
			field_type,
			expression: None,
			getter: None,
		}
	}

	/// A virtual attribute computed from a SQL expression
	pub fn derived(field_type: FieldType, expression: DerivedExpr) -> Self {
		Self {
			expression: Some(expression),
			..Self::new(field_type)
		}
	}

	/// Replace the default read accessor
	pub fn with_getter<F>(mut self, getter: F) -> Self
	where
		F: Fn(&Row) -> Option<JsonValue> + Send + Sync + 'static,
	{
		self.getter = Some(Arc::new(getter));
		self
	}

	pub fn field_type(&self) -> FieldType {
		self.field_type
	}

	pub fn is_derived(&self) -> bool {
		self.expression.is_some()
	}
}

/// A named link from one model to another
///
/// # Examples
///
/// ```
/// use reinhardt_derived_fields::model::Association;
///
/// let details = Association::new("Detail").with_alias("detailcheta");
/// assert_eq!(details.alias(), "detailcheta");
/// assert_eq!(details.target(), "Detail");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
	alias: String,
	target: String,
}

impl Association {
	/// Create an association; the alias defaults to the target model name
	pub fn new(target: impl Into<String>) -> Self {
		let target = target.into();
		Self {
			alias: target.clone(),
			target,
		}
	}

	pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
		self.alias = alias.into();
		self
	}

	pub fn alias(&self) -> &str {
		&self.alias
	}

	pub fn target(&self) -> &str {
		&self.target
	}
}

/// Builder for a [`Model`]
#[derive(Debug, Clone)]
pub struct ModelDefinition {
	name: String,
	attributes: IndexMap<String, AttributeDefinition>,
	associations: Vec<Association>,
}

impl ModelDefinition {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			attributes: IndexMap::new(),
			associations: Vec::new(),
		}
	}

	pub fn attribute(mut self, name: impl Into<String>, definition: AttributeDefinition) -> Self {
		self.attributes.insert(name.into(), definition);
		self
	}

	/// Shorthand for a physical column
	pub fn field(self, name: impl Into<String>, field_type: FieldType) -> Self {
		self.attribute(name, AttributeDefinition::new(field_type))
	}

	/// Shorthand for a derived attribute with the default accessor
	pub fn derived(
		self,
		name: impl Into<String>,
		field_type: FieldType,
		expression: DerivedExpr,
	) -> Self {
		self.attribute(name, AttributeDefinition::derived(field_type, expression))
	}

	/// Declare an association; a later association with the same alias replaces it
	pub fn association(mut self, association: Association) -> Self {
		self.associations
			.retain(|existing| existing.alias() != association.alias());
		self.associations.push(association);
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Split derived attributes from physical ones and install accessors
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_derived_fields::expression::DerivedExpr;
	/// use reinhardt_derived_fields::model::{FieldType, ModelDefinition};
	///
	/// let model = ModelDefinition::new("Master")
	///     .field("name", FieldType::String)
	///     .derived("ucName", FieldType::String, DerivedExpr::upper("name"))
	///     .build();
	///
	/// assert!(model.attributes().contains_key("name"));
	/// assert!(!model.attributes().contains_key("ucName"));
	/// assert!(model.derived().contains_key("ucName"));
	/// assert_eq!(model.field_names(), vec!["name", "ucName"]);
	/// ```
	pub fn build(self) -> Model {
		let mut attributes = IndexMap::new();
		let mut derived = IndexMap::new();
		let mut accessors: IndexMap<String, Getter> = IndexMap::new();
		let mut field_order = Vec::with_capacity(self.attributes.len());

		for (name, mut definition) in self.attributes {
			field_order.push(name.clone());
			let getter = definition.getter.take();
			match definition.expression.take() {
				Some(expression) => {
					derived.insert(name.clone(), expression);
					let getter = getter.unwrap_or_else(|| default_getter(&name));
					accessors.insert(name, getter);
				}
				None => {
					if let Some(getter) = getter {
						accessors.insert(name.clone(), getter);
					}
					attributes.insert(name, definition);
				}
			}
		}

		let associations = self
			.associations
			.into_iter()
			.map(|association| (association.alias.clone(), association))
			.collect();

		Model {
			name: self.name,
			attributes,
			derived,
			accessors,
			field_order,
			associations,
		}
	}
}

fn default_getter(name: &str) -> Getter {
	let key = name.to_string();
	Arc::new(move |row: &Row| row.get(&key).cloned())
}

/// A model with its physical attributes, derived fields and associations
pub struct Model {
	name: String,
	attributes: IndexMap<String, AttributeDefinition>,
	derived: IndexMap<String, DerivedExpr>,
	accessors: IndexMap<String, Getter>,
	field_order: Vec<String>,
	associations: IndexMap<String, Association>,
}

impl fmt::Debug for Model {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Model")
			.field("name", &self.name)
			.field("attributes", &self.attributes)
			.field("derived", &self.derived)
			.field("associations", &self.associations)
			.finish()
	}
}

impl Model {
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Physical attributes only
	pub fn attributes(&self) -> &IndexMap<String, AttributeDefinition> {
		&self.attributes
	}

	/// Derived field name to SQL definition
	pub fn derived(&self) -> &IndexMap<String, DerivedExpr> {
		&self.derived
	}

	pub fn derived_expr(&self, field: &str) -> Option<&DerivedExpr> {
		self.derived.get(field)
	}

	pub fn is_derived(&self, field: &str) -> bool {
		self.derived.contains_key(field)
	}

	pub fn has_derived_fields(&self) -> bool {
		!self.derived.is_empty()
	}

	pub fn associations(&self) -> &IndexMap<String, Association> {
		&self.associations
	}

	pub fn association(&self, alias: &str) -> Option<&Association> {
		self.associations.get(alias)
	}

	/// Every declared field, physical and derived, in declaration order
	pub fn field_names(&self) -> Vec<String> {
		self.field_order.clone()
	}

	/// Read a field from a loaded row through its accessor
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_derived_fields::expression::DerivedExpr;
	/// use reinhardt_derived_fields::model::{FieldType, ModelDefinition, Row};
	/// use serde_json::json;
	///
	/// let model = ModelDefinition::new("Master")
	///     .field("name", FieldType::String)
	///     .derived("ucName", FieldType::String, DerivedExpr::upper("name"))
	///     .build();
	///
	/// let mut row = Row::new();
	/// row.insert("name".to_string(), json!("master"));
	/// row.insert("ucName".to_string(), json!("MASTER"));
	/// assert_eq!(model.read(&row, "ucName"), Some(json!("MASTER")));
	/// assert_eq!(model.read(&row, "missing"), None);
	/// ```
	pub fn read(&self, row: &Row, field: &str) -> Option<JsonValue> {
		match self.accessors.get(field) {
			Some(getter) => getter(row),
			None => row.get(field).cloned(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	fn master() -> Model {
		ModelDefinition::new("Master")
			.field("name", FieldType::String)
			.derived("ucName", FieldType::String, DerivedExpr::upper("name"))
			.field("validUntil", FieldType::DateTime)
			.derived(
				"validInterval",
				FieldType::Interval,
				DerivedExpr::raw("{alias}.\"validUntil\" - NOW()"),
			)
			.association(Association::new("Detail").with_alias("detailcheta"))
			.build()
	}

	#[rstest]
	fn test_build_moves_derived_fields() {
		let model = master();
		assert_eq!(
			model.attributes().keys().collect::<Vec<_>>(),
			vec!["name", "validUntil"]
		);
		assert_eq!(
			model.derived().keys().collect::<Vec<_>>(),
			vec!["ucName", "validInterval"]
		);
		assert!(model.is_derived("ucName"));
		assert!(!model.is_derived("name"));
	}

	#[rstest]
	fn test_field_names_keep_declaration_order() {
		assert_eq!(
			master().field_names(),
			vec!["name", "ucName", "validUntil", "validInterval"]
		);
	}

	#[rstest]
	fn test_custom_getter_overrides_default() {
		let model = ModelDefinition::new("Master")
			.field("name", FieldType::String)
			.attribute(
				"ucName",
				AttributeDefinition::derived(FieldType::String, DerivedExpr::upper("name"))
					.with_getter(|row| {
						row.get("ucName")
							.and_then(|v| v.as_str())
							.map(|s| json!(format!("<{}>", s)))
					}),
			)
			.build();
		let mut row = Row::new();
		row.insert("ucName".to_string(), json!("X"));
		assert_eq!(model.read(&row, "ucName"), Some(json!("<X>")));
	}

	#[rstest]
	fn test_association_alias_replaces_previous() {
		let model = ModelDefinition::new("Detail")
			.association(Association::new("Master"))
			.association(Association::new("Other").with_alias("Master"))
			.build();
		assert_eq!(model.associations().len(), 1);
		assert_eq!(model.association("Master").map(|a| a.target()), Some("Other"));
	}

	#[rstest]
	fn test_model_without_derived_fields() {
		let model = ModelDefinition::new("Plain")
			.field("id", FieldType::BigInteger)
			.build();
		assert!(!model.has_derived_fields());
	}
}
