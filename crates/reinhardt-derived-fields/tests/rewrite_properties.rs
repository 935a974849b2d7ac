//! Property-based tests for the rewriters

mod common;

use common::models;
use proptest::prelude::*;
use reinhardt_derived_fields::prelude::*;
use reinhardt_derived_fields::rewrite::{OrderRewriter, PredicateRewriter};

fn identifier() -> impl Strategy<Value = String> {
	"[a-z][a-zA-Z0-9_]{0,10}"
}

proptest! {
	/// Property: every derived key leaves the keyed predicates and adds one conjunct
	///
	/// **Test Intent**: Rewriting removes exactly the derived keys and keeps
	/// physical keys in place, whatever the literal values are
	#[test]
	fn prop_derived_keys_move_to_conjunction(
		values in prop::collection::vec("[ -~]{0,12}", 1..5),
		physical in "[ -~]{0,12}",
	) {
		let models = models();
		let settings = DerivedFieldsSettings::default();
		let master = models.require("Master").unwrap();
		let mut where_clause = WhereClause::new()
			.eq("name", physical.as_str())
			.is_in("ucName", values.iter().map(String::as_str))
			.eq("validInterval", FilterValue::raw("INTERVAL '1 day'"));

		let count = PredicateRewriter::new(&models, &settings)
			.rewrite_where(&master, &mut where_clause, "Master")
			.unwrap();

		prop_assert_eq!(count, 2);
		prop_assert_eq!(where_clause.fields().keys().collect::<Vec<_>>(), vec!["name"]);
		prop_assert_eq!(where_clause.conjunction().len(), 2);
		let membership = render_expr(&where_clause.conjunction()[0]);
		prop_assert!(membership.starts_with("UPPER(\"Master\".\"name\") IN ("), "{}", membership);
	}

	/// Property: `$Model.field$` resolves like the bare field
	#[test]
	fn prop_self_prefixed_reference_matches_bare(alias in identifier()) {
		let models = models();
		let settings = DerivedFieldsSettings::default();
		let master = models.require("Master").unwrap();
		let resolver = reinhardt_derived_fields::ExpressionResolver::new(&models, &settings);

		let bare = resolver.resolve(&master, "ucName", &alias).unwrap().unwrap();
		let dotted = resolver.resolve(&master, "$Master.ucName$", &alias).unwrap().unwrap();
		let wrapped = resolver.resolve(&master, "$ucName$", &alias).unwrap().unwrap();

		prop_assert_eq!(render_expr(&bare.expression), render_expr(&dotted.expression));
		prop_assert_eq!(render_expr(&bare.expression), render_expr(&wrapped.expression));
	}

	/// Property: physical order paths quote every segment
	///
	/// **Test Intent**: With expression ordering disabled, a dotted reference
	/// renders as its quoted segments joined by dots, keeping the direction
	#[test]
	fn prop_order_path_quotes_each_segment(
		segments in prop::collection::vec(identifier(), 3..5),
		descending in any::<bool>(),
	) {
		let models = models();
		let settings = DerivedFieldsSettings::default().with_order_by_derived_expression(false);
		let master = models.require("Master").unwrap();
		let direction = if descending { "DESC" } else { "ASC" };
		let reference = format!("${}$", segments.join("."));

		let item = OrderRewriter::new(&models, &settings)
			.rewrite_item(&master, OrderItem::pair(reference, direction))
			.unwrap();

		let expected = segments
			.iter()
			.map(|segment| format!("\"{}\"", segment))
			.collect::<Vec<_>>()
			.join(".");
		match item {
			OrderItem::Expr { expr, direction: rendered_direction } => {
				prop_assert_eq!(render_expr(&expr), expected);
				prop_assert_eq!(rendered_direction, direction);
			}
			other => prop_assert!(false, "unexpected item: {:?}", other),
		}
	}

	/// Property: rewriting is atomic across the include tree
	///
	/// **Test Intent**: A bad reference at any depth leaves the root untouched
	#[test]
	fn prop_failed_rewrite_changes_nothing(bad in "[A-Z][a-z]{2,8}") {
		prop_assume!(!["Master", "Detail", "SubDetail", "SubSubDetail", "Supreme"].contains(&bad.as_str()));
		let models = models();
		let settings = DerivedFieldsSettings::default();
		let master = models.require("Master").unwrap();
		let mut options = FindOptions::new()
			.filter(WhereClause::new().eq("ucName", "MASTER"))
			.include(
				Include::association("detailcheta")
					.filter(WhereClause::new().eq(format!("${}.lcName$", bad), "x")),
			);

		let result = reinhardt_derived_fields::rewrite::rewrite_find_options(
			&models,
			&settings,
			&master,
			&mut options,
		);

		prop_assert!(result.is_err());
		prop_assert!(!options.marks().fields);
		let root = options.where_clause.unwrap();
		prop_assert!(root.contains_key("ucName"));
		prop_assert!(root.conjunction().is_empty());
	}
}
