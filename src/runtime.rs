//! Application-level bundle of models, hooks and settings

use reinhardt_derived_fields::count::{CountPatch, Counter};
use reinhardt_derived_fields::error::DerivedResult;
use reinhardt_derived_fields::hooks::HookRegistry;
use reinhardt_derived_fields::model::{Model, ModelDefinition};
use reinhardt_derived_fields::plugin::{InstallOutcome, install};
use reinhardt_derived_fields::query::FindOptions;
use reinhardt_derived_fields::registry::ModelRegistry;
use reinhardt_derived_fields::settings::DerivedFieldsSettings;
use std::path::Path;
use std::sync::Arc;

/// Models, installed hooks and settings used to rewrite queries
///
/// Creating a bundle installs the derived field hooks into its hook
/// registry. Installing again through [`DerivedFields::install`] is a no-op.
#[derive(Debug)]
pub struct DerivedFields {
	models: Arc<ModelRegistry>,
	hooks: HookRegistry,
	settings: DerivedFieldsSettings,
}

impl DerivedFields {
	pub fn new(settings: DerivedFieldsSettings) -> Self {
		let hooks = HookRegistry::new();
		install(&hooks, settings.clone());
		Self {
			models: Arc::new(ModelRegistry::new()),
			hooks,
			settings,
		}
	}

	/// Build a bundle from a TOML settings file
	pub fn from_toml_file(path: impl AsRef<Path>) -> DerivedResult<Self> {
		let settings = DerivedFieldsSettings::from_toml_file(path)?;
		Ok(Self::new(settings))
	}

	/// Install the hooks again; reports which ones were missing
	pub fn install(&self) -> InstallOutcome {
		install(&self.hooks, self.settings.clone())
	}

	pub fn define(&self, definition: ModelDefinition) -> DerivedResult<Arc<Model>> {
		self.models.define(definition)
	}

	pub fn models(&self) -> &Arc<ModelRegistry> {
		&self.models
	}

	pub fn hooks(&self) -> &HookRegistry {
		&self.hooks
	}

	pub fn settings(&self) -> &DerivedFieldsSettings {
		&self.settings
	}

	/// Run the find hooks for a query on `model_name`
	pub fn find_options(&self, model_name: &str, options: FindOptions) -> DerivedResult<FindOptions> {
		self.hooks.prepare_find(&self.models, model_name, options)
	}

	/// Run the count hooks for a count on `model_name`
	pub fn count_options(&self, model_name: &str, options: FindOptions) -> DerivedResult<FindOptions> {
		self.hooks.prepare_count(&self.models, model_name, options)
	}

	/// Prepare both halves of a find-and-count call
	pub fn find_and_count_options(
		&self,
		model_name: &str,
		options: FindOptions,
	) -> DerivedResult<(FindOptions, FindOptions)> {
		self.hooks
			.prepare_find_and_count(&self.models, model_name, options)
	}

	/// Wrap a host counter so its calls see rewritten predicates
	pub fn count_patch<C: Counter>(&self, counter: C) -> CountPatch<C> {
		CountPatch::new(Arc::clone(&self.models), self.settings.clone(), counter)
	}
}

impl Default for DerivedFields {
	fn default() -> Self {
		Self::new(DerivedFieldsSettings::default())
	}
}
