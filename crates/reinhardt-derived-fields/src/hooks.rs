//! Query lifecycle hooks
//!
//! A host ORM runs registered hooks at three points: before attribute
//! expansion of a find, before the find options are finalized, and before a
//! count. Hooks are registered once per name; registering a name again is a
//! no-op, so installation can be repeated safely.

use crate::error::DerivedResult;
use crate::model::Model;
use crate::query::FindOptions;
use crate::registry::ModelRegistry;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Callbacks invoked around find and count calls
///
/// Every method defaults to doing nothing.
pub trait QueryHooks: Send + Sync {
	/// Unique name the hook is registered under
	fn name(&self) -> &'static str;

	fn before_expand_attributes(
		&self,
		_models: &ModelRegistry,
		_model: &Model,
		_options: &mut FindOptions,
	) -> DerivedResult<()> {
		Ok(())
	}

	fn before_finalize_options(
		&self,
		_models: &ModelRegistry,
		_model: &Model,
		_options: &mut FindOptions,
	) -> DerivedResult<()> {
		Ok(())
	}

	fn before_count(
		&self,
		_models: &ModelRegistry,
		_model: &Model,
		_options: &mut FindOptions,
	) -> DerivedResult<()> {
		Ok(())
	}
}

/// Ordered set of hooks, unique by name
#[derive(Default)]
pub struct HookRegistry {
	hooks: RwLock<Vec<Arc<dyn QueryHooks>>>,
}

impl fmt::Debug for HookRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HookRegistry")
			.field("hooks", &self.hook_names())
			.finish()
	}
}

impl HookRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_installed(&self, name: &str) -> bool {
		self.hooks.read().iter().any(|hook| hook.name() == name)
	}

	/// Register a hook; returns `false` when one with the same name exists
	pub fn register(&self, hook: Arc<dyn QueryHooks>) -> bool {
		let mut hooks = self.hooks.write();
		if hooks.iter().any(|existing| existing.name() == hook.name()) {
			tracing::debug!(hook = hook.name(), "Hook already installed");
			return false;
		}
		tracing::debug!(hook = hook.name(), "Installed hook");
		hooks.push(hook);
		true
	}

	pub fn hook_names(&self) -> Vec<&'static str> {
		self.hooks.read().iter().map(|hook| hook.name()).collect()
	}

	pub fn len(&self) -> usize {
		self.hooks.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.hooks.read().is_empty()
	}

	fn snapshot(&self) -> Vec<Arc<dyn QueryHooks>> {
		self.hooks.read().clone()
	}

	/// Run the find hooks for a query on `model_name`
	///
	/// Attribute expansion hooks run first, then finalization hooks.
	pub fn prepare_find(
		&self,
		models: &ModelRegistry,
		model_name: &str,
		mut options: FindOptions,
	) -> DerivedResult<FindOptions> {
		let model = models.require(model_name)?;
		let hooks = self.snapshot();
		for hook in &hooks {
			hook.before_expand_attributes(models, &model, &mut options)?;
		}
		for hook in &hooks {
			hook.before_finalize_options(models, &model, &mut options)?;
		}
		Ok(options)
	}

	/// Run the count hooks for a count on `model_name`
	pub fn prepare_count(
		&self,
		models: &ModelRegistry,
		model_name: &str,
		mut options: FindOptions,
	) -> DerivedResult<FindOptions> {
		let model = models.require(model_name)?;
		for hook in &self.snapshot() {
			hook.before_count(models, &model, &mut options)?;
		}
		Ok(options)
	}

	/// Prepare the find and the count of a find-and-count call
	///
	/// Both start from the same options; each is rewritten independently.
	pub fn prepare_find_and_count(
		&self,
		models: &ModelRegistry,
		model_name: &str,
		options: FindOptions,
	) -> DerivedResult<(FindOptions, FindOptions)> {
		let count = self.prepare_count(models, model_name, options.clone())?;
		let find = self.prepare_find(models, model_name, options)?;
		Ok((find, count))
	}
}
