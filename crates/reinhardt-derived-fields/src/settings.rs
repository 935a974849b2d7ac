//! Settings for derived field rewriting
//!
//! Settings can be built in code, or loaded from TOML. A settings file may
//! either hold the keys at top level or nest them under a `[derived_fields]`
//! table so the same file can be shared with other Reinhardt settings.
//!
//! ```toml
//! [derived_fields]
//! default_direction = "DESC"
//! strip_self_segment = true
//! ```

use crate::error::DerivedResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Direction appended to order items that do not name one
pub const DEFAULT_DIRECTION: &str = "ASC";

/// Table name used when the settings are nested in a larger settings file
pub const SETTINGS_TABLE: &str = "derived_fields";

/// Behaviour switches for the derived field rewriters
///
/// # Examples
///
/// ```
/// use reinhardt_derived_fields::settings::DerivedFieldsSettings;
///
/// let settings = DerivedFieldsSettings::default();
/// assert_eq!(settings.default_direction, "ASC");
/// assert!(settings.strip_self_segment);
/// assert!(!settings.reject_ambiguous_self_reference);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DerivedFieldsSettings {
	/// Direction used for bare order references and one-element order sequences
	pub default_direction: String,

	/// Drop the leading segment of a two-segment order reference when it is
	/// the queried model's own name (`$Master.name$` sorts by `"name"`)
	pub strip_self_segment: bool,

	/// Sort derived order references by their SQL expression instead of by
	/// a quoted column path
	pub order_by_derived_expression: bool,

	/// Fill in the model's full field list when a descriptor has no attribute
	/// selection before predicates are rewritten
	pub expand_default_attributes: bool,

	/// Fail with an error instead of preferring the association when a model
	/// has an association named after itself
	pub reject_ambiguous_self_reference: bool,
}

impl Default for DerivedFieldsSettings {
	fn default() -> Self {
		Self {
			default_direction: DEFAULT_DIRECTION.to_string(),
			strip_self_segment: true,
			order_by_derived_expression: true,
			expand_default_attributes: true,
			reject_ambiguous_self_reference: false,
		}
	}
}

impl DerivedFieldsSettings {
	/// Parse settings from a TOML document
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_derived_fields::settings::DerivedFieldsSettings;
	///
	/// let settings = DerivedFieldsSettings::from_toml_str(
	///     "[derived_fields]\ndefault_direction = \"DESC\"\n",
	/// )
	/// .unwrap();
	/// assert_eq!(settings.default_direction, "DESC");
	/// assert!(settings.order_by_derived_expression);
	/// ```
	pub fn from_toml_str(source: &str) -> DerivedResult<Self> {
		let mut table: toml::Table = toml::from_str(source)?;
		let settings: Self = match table.remove(SETTINGS_TABLE) {
			Some(nested) => nested.try_into()?,
			None => toml::Value::Table(table).try_into()?,
		};
		Ok(settings)
	}

	/// Read and parse a TOML settings file
	pub fn from_toml_file(path: impl AsRef<Path>) -> DerivedResult<Self> {
		let source = std::fs::read_to_string(path.as_ref())?;
		Self::from_toml_str(&source)
	}

	/// Set the default order direction
	pub fn with_default_direction(mut self, direction: impl Into<String>) -> Self {
		self.default_direction = direction.into();
		self
	}

	pub fn with_strip_self_segment(mut self, strip: bool) -> Self {
		self.strip_self_segment = strip;
		self
	}

	pub fn with_order_by_derived_expression(mut self, enabled: bool) -> Self {
		self.order_by_derived_expression = enabled;
		self
	}

	pub fn with_expand_default_attributes(mut self, enabled: bool) -> Self {
		self.expand_default_attributes = enabled;
		self
	}

	pub fn with_reject_ambiguous_self_reference(mut self, reject: bool) -> Self {
		self.reject_ambiguous_self_reference = reject;
		self
	}
}
