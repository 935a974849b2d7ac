//! Installable hooks for derived fields and derived ordering
//!
//! Two hooks are installed, each guarded by its own name: one rewrites
//! predicates and attribute selections (and count predicates), the other
//! rewrites order lists after the find options are otherwise final.

use crate::error::DerivedResult;
use crate::hooks::{HookRegistry, QueryHooks};
use crate::model::Model;
use crate::query::FindOptions;
use crate::registry::ModelRegistry;
use crate::rewrite::{rewrite_count_options, rewrite_find_options, rewrite_order_options};
use crate::settings::DerivedFieldsSettings;
use std::sync::Arc;

/// Registration name of the predicate and attribute hook
pub const FIELDS_HOOK_NAME: &str = "reinhardt-derived-fields";

/// Registration name of the order hook
pub const ORDER_HOOK_NAME: &str = "reinhardt-derived-orderby";

/// Rewrites where clauses and attribute selections
#[derive(Debug, Clone, Default)]
pub struct DerivedFieldsHook {
	settings: DerivedFieldsSettings,
}

impl DerivedFieldsHook {
	pub fn new(settings: DerivedFieldsSettings) -> Self {
		Self { settings }
	}
}

impl QueryHooks for DerivedFieldsHook {
	fn name(&self) -> &'static str {
		FIELDS_HOOK_NAME
	}

	fn before_expand_attributes(
		&self,
		models: &ModelRegistry,
		model: &Model,
		options: &mut FindOptions,
	) -> DerivedResult<()> {
		rewrite_find_options(models, &self.settings, model, options).map(|_| ())
	}

	fn before_count(
		&self,
		models: &ModelRegistry,
		model: &Model,
		options: &mut FindOptions,
	) -> DerivedResult<()> {
		rewrite_count_options(models, &self.settings, model, options).map(|_| ())
	}
}

/// Rewrites order lists
#[derive(Debug, Clone, Default)]
pub struct DerivedOrderHook {
	settings: DerivedFieldsSettings,
}

impl DerivedOrderHook {
	pub fn new(settings: DerivedFieldsSettings) -> Self {
		Self { settings }
	}
}

impl QueryHooks for DerivedOrderHook {
	fn name(&self) -> &'static str {
		ORDER_HOOK_NAME
	}

	fn before_finalize_options(
		&self,
		models: &ModelRegistry,
		model: &Model,
		options: &mut FindOptions,
	) -> DerivedResult<()> {
		rewrite_order_options(models, &self.settings, model, options).map(|_| ())
	}
}

/// Which hooks an [`install`] call added
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallOutcome {
	pub fields: bool,
	pub order: bool,
}

impl InstallOutcome {
	/// Both hooks were present before the call
	pub fn already_installed(&self) -> bool {
		!self.fields && !self.order
	}
}

/// Install both hooks, skipping any already registered
///
/// # Examples
///
/// ```
/// use reinhardt_derived_fields::hooks::HookRegistry;
/// use reinhardt_derived_fields::plugin::install;
/// use reinhardt_derived_fields::settings::DerivedFieldsSettings;
///
/// let hooks = HookRegistry::new();
/// let first = install(&hooks, DerivedFieldsSettings::default());
/// let second = install(&hooks, DerivedFieldsSettings::default());
///
/// assert!(first.fields && first.order);
/// assert!(second.already_installed());
/// assert_eq!(hooks.len(), 2);
/// ```
pub fn install(hooks: &HookRegistry, settings: DerivedFieldsSettings) -> InstallOutcome {
	let outcome = InstallOutcome {
		fields: hooks.register(Arc::new(DerivedFieldsHook::new(settings.clone()))),
		order: hooks.register(Arc::new(DerivedOrderHook::new(settings))),
	};
	if outcome.already_installed() {
		tracing::debug!("Derived field hooks already installed");
	} else {
		tracing::info!(
			fields = outcome.fields,
			order = outcome.order,
			"Installed derived field hooks"
		);
	}
	outcome
}
