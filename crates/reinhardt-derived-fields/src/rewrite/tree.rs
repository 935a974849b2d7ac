//! Include tree traversal
//!
//! Each descriptor level is rewritten against its own model and alias path.
//! The root reads through the model name; an include reads through the alias
//! path of its ancestors below the root followed by its own alias, e.g.
//! `detailcheta.SubDetail` for an include of `SubDetail` inside the
//! `detailcheta` include of `Master`.

use super::{AttributeRewriter, PredicateRewriter};
use crate::error::DerivedResult;
use crate::model::Model;
use crate::naming::singularize;
use crate::query::{FindOptions, Include, IncludeTarget};
use crate::reference::AssociationPath;
use crate::registry::ModelRegistry;
use crate::settings::DerivedFieldsSettings;
use std::sync::Arc;

/// An include resolved to its model and alias
#[derive(Debug, Clone)]
pub struct IncludeNode {
	pub model: Arc<Model>,
	pub alias: String,
}

/// Which parts of each level are rewritten
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeMode {
	/// Predicates and attribute selections
	Find,
	/// Predicates only
	Count,
}

/// Counts of rewritten entries across a tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
	pub predicates: usize,
	pub attributes: usize,
	pub levels: usize,
}

/// Resolve an include to its model and alias
///
/// Association includes use the association alias. Model includes use the
/// explicit alias when given, otherwise the singular form of the model name.
pub fn normalize_include(
	models: &ModelRegistry,
	parent: &Model,
	include: &Include,
) -> DerivedResult<IncludeNode> {
	match &include.target {
		IncludeTarget::Association(alias) => Ok(IncludeNode {
			model: models.association_target(parent, alias)?,
			alias: alias.clone(),
		}),
		IncludeTarget::Model { model, alias } => Ok(IncludeNode {
			model: models.require(model)?,
			alias: alias.clone().unwrap_or_else(|| singularize(model)),
		}),
	}
}

/// Rewrites a descriptor and all of its includes
///
/// Nested predicates resolve against the accumulated alias path, the same
/// path the attribute projections use, not the include's own alias.
#[derive(Debug, Clone, Copy)]
pub struct TreeRewriter<'a> {
	models: &'a ModelRegistry,
	predicates: PredicateRewriter<'a>,
	attributes: AttributeRewriter<'a>,
	mode: TreeMode,
}

impl<'a> TreeRewriter<'a> {
	pub fn new(
		models: &'a ModelRegistry,
		settings: &'a DerivedFieldsSettings,
		mode: TreeMode,
	) -> Self {
		Self {
			models,
			predicates: PredicateRewriter::new(models, settings),
			attributes: AttributeRewriter::new(models, settings),
			mode,
		}
	}

	/// Rewrite `options` for a query on `model`
	///
	/// The tree is rewritten on a copy; `options` only changes when every
	/// level succeeded.
	pub fn rewrite(&self, model: &Model, options: &mut FindOptions) -> DerivedResult<RewriteStats> {
		let mut working = options.clone();
		let mut stats = RewriteStats::default();
		self.rewrite_level(
			model,
			&mut working,
			model.name(),
			&AssociationPath::empty(),
			&mut stats,
		)?;
		*options = working;
		Ok(stats)
	}

	fn rewrite_level(
		&self,
		model: &Model,
		options: &mut FindOptions,
		alias: &str,
		path: &AssociationPath,
		stats: &mut RewriteStats,
	) -> DerivedResult<()> {
		stats.levels += 1;
		stats.predicates += self.predicates.rewrite(model, options, alias)?;
		if self.mode == TreeMode::Find {
			stats.attributes += self.attributes.rewrite(model, options, alias)?;
		}

		for include in options.include.iter_mut() {
			let node = normalize_include(self.models, model, include)?;
			let child_path = path.child(node.alias.as_str());
			let child_alias = child_path.join();
			tracing::trace!(
				parent = model.name(),
				model = node.model.name(),
				alias = %child_alias,
				"Rewriting include"
			);
			self.rewrite_level(&node.model, &mut include.options, &child_alias, &child_path, stats)?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::expression::DerivedExpr;
	use crate::model::{Association, FieldType, ModelDefinition};
	use crate::query::{Attribute, WhereClause};
	use crate::sql::render_expr;
	use rstest::{fixture, rstest};

	#[fixture]
	fn registry() -> ModelRegistry {
		let registry = ModelRegistry::new();
		registry
			.define(
				ModelDefinition::new("Master")
					.field("name", FieldType::String)
					.derived("ucName", FieldType::String, DerivedExpr::upper("name"))
					.association(Association::new("Detail").with_alias("detailcheta")),
			)
			.unwrap();
		registry
			.define(
				ModelDefinition::new("Detail")
					.field("name", FieldType::String)
					.derived("lcName", FieldType::String, DerivedExpr::lower("name"))
					.association(Association::new("Master"))
					.association(Association::new("SubDetail").with_alias("SubDetails")),
			)
			.unwrap();
		registry
			.define(
				ModelDefinition::new("SubDetail")
					.field("name", FieldType::String)
					.derived("ucName", FieldType::String, DerivedExpr::upper("name")),
			)
			.unwrap();
		registry
	}

	#[rstest]
	#[case(Include::association("detailcheta"), "Detail", "detailcheta")]
	#[case(Include::model("Detail"), "Detail", "Detail")]
	#[case(Include::model_as("Detail", "d"), "Detail", "d")]
	fn test_normalize_include(
		registry: ModelRegistry,
		#[case] include: Include,
		#[case] model: &str,
		#[case] alias: &str,
	) {
		let master = registry.require("Master").unwrap();
		let node = normalize_include(&registry, &master, &include).unwrap();
		assert_eq!(node.model.name(), model);
		assert_eq!(node.alias, alias);
	}

	#[rstest]
	fn test_nested_aliases_accumulate(registry: ModelRegistry) {
		let settings = DerivedFieldsSettings::default();
		let rewriter = TreeRewriter::new(&registry, &settings, TreeMode::Find);
		let master = registry.require("Master").unwrap();
		let mut options = FindOptions::new().include(
			Include::association("detailcheta")
				.filter(WhereClause::new().eq("lcName", "detail"))
				.include(
					Include::association("SubDetails")
						.filter(WhereClause::new().eq("ucName", "SUB")),
				),
		);

		let stats = rewriter.rewrite(&master, &mut options).unwrap();

		assert_eq!(stats.levels, 3);
		assert_eq!(stats.predicates, 2);
		let detail = &options.include[0].options;
		assert_eq!(
			render_expr(&detail.where_clause.as_ref().unwrap().conjunction()[0]),
			"LOWER(\"detailcheta\".\"name\") = 'detail'"
		);
		let sub = &detail.include[0].options;
		assert_eq!(
			render_expr(&sub.where_clause.as_ref().unwrap().conjunction()[0]),
			"UPPER(\"detailcheta\".\"SubDetails\".\"name\") = 'SUB'"
		);
	}

	#[rstest]
	fn test_find_mode_projects_default_attributes(registry: ModelRegistry) {
		let settings = DerivedFieldsSettings::default();
		let rewriter = TreeRewriter::new(&registry, &settings, TreeMode::Find);
		let master = registry.require("Master").unwrap();
		let mut options = FindOptions::new().filter(WhereClause::new().eq("name", "x"));

		let stats = rewriter.rewrite(&master, &mut options).unwrap();

		assert_eq!(stats.attributes, 1);
		let attributes = options.attributes.unwrap();
		assert!(matches!(&attributes[0], Attribute::Name(n) if n == "name"));
		assert!(attributes[1].is_expr());
	}

	#[rstest]
	fn test_count_mode_skips_attributes(registry: ModelRegistry) {
		let settings = DerivedFieldsSettings::default();
		let rewriter = TreeRewriter::new(&registry, &settings, TreeMode::Count);
		let master = registry.require("Master").unwrap();
		let mut options = FindOptions::new().attributes(["ucName"]);

		rewriter.rewrite(&master, &mut options).unwrap();

		assert!(!options.attributes.unwrap()[0].is_expr());
	}

	#[rstest]
	fn test_failure_in_nested_include_changes_nothing(registry: ModelRegistry) {
		let settings = DerivedFieldsSettings::default();
		let rewriter = TreeRewriter::new(&registry, &settings, TreeMode::Find);
		let master = registry.require("Master").unwrap();
		let mut options = FindOptions::new()
			.filter(WhereClause::new().eq("ucName", "MASTER"))
			.include(
				Include::association("detailcheta")
					.filter(WhereClause::new().eq("$Nope.lcName$", "x")),
			);

		assert!(rewriter.rewrite(&master, &mut options).is_err());
		let root = options.where_clause.unwrap();
		assert!(root.contains_key("ucName"));
		assert!(root.conjunction().is_empty());
		assert!(options.attributes.is_none());
	}

	#[rstest]
	fn test_unknown_association_include(registry: ModelRegistry) {
		let settings = DerivedFieldsSettings::default();
		let rewriter = TreeRewriter::new(&registry, &settings, TreeMode::Find);
		let master = registry.require("Master").unwrap();
		let mut options = FindOptions::new().include(Include::association("missing"));
		assert!(rewriter.rewrite(&master, &mut options).is_err());
	}
}
