//! Dotted references (`$path.to.field$`)
//!
//! A key wrapped in `$` names a field through a chain of association
//! aliases: every segment but the last is an association alias and the last
//! is the field.

use std::fmt;

/// Sequence of association aliases walked from a model
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AssociationPath(Vec<String>);

impl AssociationPath {
	pub fn new<I, S>(segments: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self(segments.into_iter().map(Into::into).collect())
	}

	pub fn empty() -> Self {
		Self::default()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn segments(&self) -> &[String] {
		&self.0
	}

	/// The path with one more alias appended
	pub fn child(&self, alias: impl Into<String>) -> Self {
		let mut segments = self.0.clone();
		segments.push(alias.into());
		Self(segments)
	}

	/// Segments joined with `.`, the form used as a table alias
	pub fn join(&self) -> String {
		self.0.join(".")
	}
}

impl fmt::Display for AssociationPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.join())
	}
}

/// A parsed `$a.b.field$` key
///
/// # Examples
///
/// ```
/// use reinhardt_derived_fields::reference::DottedReference;
///
/// let reference = DottedReference::parse("$detailcheta.SubDetail.name$").unwrap();
/// assert_eq!(reference.path().segments(), ["detailcheta", "SubDetail"]);
/// assert_eq!(reference.field(), "name");
///
/// assert!(DottedReference::parse("name").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DottedReference {
	path: AssociationPath,
	field: String,
}

impl DottedReference {
	/// Whether the key is wrapped in `$`
	pub fn is_dotted(key: &str) -> bool {
		key.len() >= 2 && key.starts_with('$') && key.ends_with('$')
	}

	/// Parse a `$`-wrapped key; `None` when it is not one or has empty segments
	pub fn parse(key: &str) -> Option<Self> {
		if !Self::is_dotted(key) {
			return None;
		}
		let inner = &key[1..key.len() - 1];
		let mut segments: Vec<&str> = inner.split('.').collect();
		if segments.iter().any(|segment| segment.is_empty()) {
			return None;
		}
		let field = segments.pop()?.to_string();
		Some(Self {
			path: AssociationPath::new(segments),
			field,
		})
	}

	pub fn path(&self) -> &AssociationPath {
		&self.path
	}

	pub fn field(&self) -> &str {
		&self.field
	}

	/// Path segments followed by the field
	pub fn segments(&self) -> Vec<&str> {
		self.path
			.segments()
			.iter()
			.map(String::as_str)
			.chain(std::iter::once(self.field.as_str()))
			.collect()
	}
}

impl fmt::Display for DottedReference {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "${}$", self.segments().join("."))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("$name$", &[], "name")]
	#[case("$Master.ucName$", &["Master"], "ucName")]
	#[case("$Detail.Master.ucName$", &["Detail", "Master"], "ucName")]
	fn test_parse(#[case] key: &str, #[case] path: &[&str], #[case] field: &str) {
		let reference = DottedReference::parse(key).unwrap();
		assert_eq!(reference.path().segments(), path);
		assert_eq!(reference.field(), field);
		assert_eq!(reference.to_string(), key);
	}

	#[rstest]
	#[case("name")]
	#[case("$")]
	#[case("$$")]
	#[case("$a..b$")]
	#[case("$.a$")]
	#[case("$a.$")]
	#[case("$name")]
	fn test_parse_rejects(#[case] key: &str) {
		assert!(DottedReference::parse(key).is_none());
	}

	#[rstest]
	fn test_child_path_join() {
		let path = AssociationPath::empty().child("detailcheta").child("SubDetail");
		assert_eq!(path.join(), "detailcheta.SubDetail");
		assert_eq!(path.len(), 2);
	}
}
