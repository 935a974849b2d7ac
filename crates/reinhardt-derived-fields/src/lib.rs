//! # Reinhardt Derived Fields
//!
//! Virtual model fields backed by SQL expressions, and the query rewriting
//! that makes them usable in where clauses, attribute selections and
//! ordering, including through associations with `$path.to.field$`
//! references.
//!
//! ## Overview
//!
//! A derived field is declared on a model with a [`DerivedExpr`]. It is not
//! a column: whenever a query names it, the reference is replaced by the
//! expression, built for the alias path the field is read from.
//!
//! - `where: { ucName: ["A", "B"] }` becomes `UPPER("Master"."name") IN ('A', 'B')`
//! - `attributes: ["lcName"]` on the `detailcheta` include becomes
//!   `(LOWER("detailcheta"."name"), "lcName")`
//! - `order: [["$Master.ucName$", "DESC"]]` sorts by `UPPER("Master"."name") DESC`
//!
//! ## Example
//!
//! ```
//! use reinhardt_derived_fields::prelude::*;
//!
//! let models = ModelRegistry::new();
//! models
//!     .define(
//!         ModelDefinition::new("Master")
//!             .field("name", FieldType::String)
//!             .derived("ucName", FieldType::String, DerivedExpr::upper("name"))
//!             .association(Association::new("Detail").with_alias("detailcheta")),
//!     )
//!     .unwrap();
//! models
//!     .define(
//!         ModelDefinition::new("Detail")
//!             .field("name", FieldType::String)
//!             .derived("lcName", FieldType::String, DerivedExpr::lower("name")),
//!     )
//!     .unwrap();
//!
//! let hooks = HookRegistry::new();
//! install(&hooks, DerivedFieldsSettings::default());
//!
//! let options = hooks
//!     .prepare_find(
//!         &models,
//!         "Master",
//!         FindOptions::new()
//!             .filter(WhereClause::new().is_in("ucName", ["MASTER", "ANOTHER"]))
//!             .include(Include::association("detailcheta").attributes(["lcName"])),
//!     )
//!     .unwrap();
//!
//! let root = options.where_clause.as_ref().unwrap();
//! assert_eq!(
//!     render_expr(&root.conjunction()[0]),
//!     "UPPER(\"Master\".\"name\") IN ('MASTER', 'ANOTHER')"
//! );
//! ```

pub mod count;
pub mod error;
pub mod expression;
pub mod hooks;
pub mod model;
pub mod naming;
pub mod plugin;
pub mod query;
pub mod reference;
pub mod registry;
pub mod resolver;
pub mod rewrite;
pub mod settings;
pub mod sql;

pub use count::{CountPatch, Counter};
pub use error::{DerivedError, DerivedResult};
pub use expression::DerivedExpr;
pub use hooks::{HookRegistry, QueryHooks};
pub use model::{Association, AttributeDefinition, FieldType, Model, ModelDefinition, Row};
pub use plugin::{FIELDS_HOOK_NAME, InstallOutcome, ORDER_HOOK_NAME, install};
pub use query::{
	Attribute, FilterOperator, FilterValue, FindOptions, Include, IncludeTarget, OrderItem,
	RewriteMarks, WhereClause, WhereValue,
};
pub use reference::{AssociationPath, DottedReference};
pub use registry::ModelRegistry;
pub use resolver::{ExpressionResolver, Resolved};
pub use settings::DerivedFieldsSettings;
pub use sql::{derived_expr_sql, render_expr, where_conditions};

/// Commonly used types
pub mod prelude {
	pub use crate::count::{CountPatch, Counter};
	pub use crate::error::{DerivedError, DerivedResult};
	pub use crate::expression::DerivedExpr;
	pub use crate::hooks::{HookRegistry, QueryHooks};
	pub use crate::model::{
		Association, AttributeDefinition, FieldType, Model, ModelDefinition, Row,
	};
	pub use crate::plugin::install;
	pub use crate::query::{
		Attribute, FilterOperator, FilterValue, FindOptions, Include, OrderItem, WhereClause,
		WhereValue,
	};
	pub use crate::registry::ModelRegistry;
	pub use crate::settings::DerivedFieldsSettings;
	pub use crate::sql::{derived_expr_sql, render_expr, where_conditions};
}
