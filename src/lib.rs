//! # Reinhardt Derived
//!
//! Derived (virtual, SQL-expression backed) model fields for the Reinhardt
//! ORM layer.
//!
//! This crate bundles [`reinhardt_derived_fields`] behind a single entry
//! point, [`DerivedFields`], which owns the model registry, the query hooks
//! and the settings used to rewrite find and count calls.
//!
//! ## Quick Example
//!
//! ```rust
//! use reinhardt_derived::prelude::*;
//!
//! let derived = DerivedFields::new(DerivedFieldsSettings::default());
//! derived
//!     .define(
//!         ModelDefinition::new("Master")
//!             .field("name", FieldType::String)
//!             .derived("ucName", FieldType::String, DerivedExpr::upper("name")),
//!     )
//!     .unwrap();
//!
//! let options = derived
//!     .find_options("Master", FindOptions::new().order(OrderItem::desc("ucName")))
//!     .unwrap();
//! assert!(options.order.unwrap()[0].is_expr());
//! ```
//!
//! ## Configuration
//!
//! Settings are read from TOML, either at top level or from a
//! `[derived_fields]` table:
//!
//! ```toml
//! [derived_fields]
//! default_direction = "ASC"
//! strip_self_segment = true
//! order_by_derived_expression = true
//! expand_default_attributes = true
//! reject_ambiguous_self_reference = false
//! ```

pub mod runtime;

pub use reinhardt_derived_fields::*;
pub use runtime::DerivedFields;

/// Re-exports for applications using derived fields
pub mod prelude {
	pub use crate::runtime::DerivedFields;
	pub use reinhardt_derived_fields::prelude::*;
}
