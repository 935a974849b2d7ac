//! Shared model fixtures for integration tests
//!
//! Master ─┬─ detailcheta (has many Detail) ── SubDetails (has many SubDetail) ── SubSubDetails
//!         └─ Supreme (has one Supreme)
//!
//! Every model carries `name`; derived fields are `ucName` (upper case),
//! `lcName` (lower case) and `validInterval` (time left until `validUntil`).

#![allow(dead_code)]

use reinhardt_derived_fields::expression::DerivedExpr;
use reinhardt_derived_fields::model::{Association, FieldType, ModelDefinition};
use reinhardt_derived_fields::registry::ModelRegistry;
use rstest::fixture;

pub const VALID_INTERVAL: &str = "{alias}.\"validUntil\" - NOW()";

#[fixture]
pub fn models() -> ModelRegistry {
	let models = ModelRegistry::new();

	models
		.define(
			ModelDefinition::new("Master")
				.field("id", FieldType::BigInteger)
				.field("name", FieldType::String)
				.derived("ucName", FieldType::String, DerivedExpr::upper("name"))
				.field("validUntil", FieldType::DateTime)
				.derived(
					"validInterval",
					FieldType::Interval,
					DerivedExpr::raw(VALID_INTERVAL),
				)
				.association(Association::new("Detail").with_alias("detailcheta"))
				.association(Association::new("Supreme")),
		)
		.unwrap();

	models
		.define(
			ModelDefinition::new("Detail")
				.field("id", FieldType::BigInteger)
				.field("masterId", FieldType::BigInteger)
				.field("name", FieldType::String)
				.derived("lcName", FieldType::String, DerivedExpr::lower("name"))
				.association(Association::new("Master"))
				.association(Association::new("SubDetail").with_alias("SubDetails")),
		)
		.unwrap();

	models
		.define(
			ModelDefinition::new("SubDetail")
				.field("id", FieldType::BigInteger)
				.field("detailId", FieldType::BigInteger)
				.field("name", FieldType::String)
				.derived("ucName", FieldType::String, DerivedExpr::upper("name"))
				.association(Association::new("Detail"))
				.association(Association::new("SubSubDetail").with_alias("SubSubDetails")),
		)
		.unwrap();

	models
		.define(
			ModelDefinition::new("SubSubDetail")
				.field("id", FieldType::BigInteger)
				.field("subDetailId", FieldType::BigInteger)
				.field("name", FieldType::String)
				.derived("lcName", FieldType::String, DerivedExpr::lower("name"))
				.association(Association::new("SubDetail")),
		)
		.unwrap();

	models
		.define(
			ModelDefinition::new("Supreme")
				.field("id", FieldType::BigInteger)
				.field("masterId", FieldType::BigInteger)
				.field("name", FieldType::String)
				.derived("ucName", FieldType::String, DerivedExpr::upper("name"))
				.association(Association::new("Master")),
		)
		.unwrap();

	models
}
