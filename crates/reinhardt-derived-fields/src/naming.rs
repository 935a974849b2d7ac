//! Identifier quoting and naming helpers
//!
//! Aliases produced while walking an include tree are dotted paths such as
//! `detailcheta.SubDetail`. When they qualify a column, every segment is
//! quoted on its own so the path renders as `"detailcheta"."SubDetail"."name"`.

/// Quote a single SQL identifier, doubling any embedded double quote
///
/// # Examples
///
/// ```
/// use reinhardt_derived_fields::naming::quote_identifier;
///
/// assert_eq!(quote_identifier("name"), "\"name\"");
/// assert_eq!(quote_identifier("odd\"name"), "\"odd\"\"name\"");
/// ```
pub fn quote_identifier(name: &str) -> String {
	format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote each segment and join them with `.`
///
/// # Examples
///
/// ```
/// use reinhardt_derived_fields::naming::quote_path;
///
/// assert_eq!(quote_path(["Detail", "Master", "name"]), "\"Detail\".\"Master\".\"name\"");
/// ```
pub fn quote_path<I, S>(segments: I) -> String
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	segments
		.into_iter()
		.map(|segment| quote_identifier(segment.as_ref()))
		.collect::<Vec<_>>()
		.join(".")
}

/// Quote an alias path, splitting it on `.`
///
/// An empty alias renders as an empty string.
pub fn quote_alias(alias: &str) -> String {
	if alias.is_empty() {
		return String::new();
	}
	quote_path(alias.split('.'))
}

/// Qualify a column with an alias path
///
/// # Examples
///
/// ```
/// use reinhardt_derived_fields::naming::qualified_column;
///
/// assert_eq!(qualified_column("Master", "name"), "\"Master\".\"name\"");
/// assert_eq!(
///     qualified_column("detailcheta.SubDetail", "name"),
///     "\"detailcheta\".\"SubDetail\".\"name\""
/// );
/// assert_eq!(qualified_column("", "name"), "\"name\"");
/// ```
pub fn qualified_column(alias: &str, column: &str) -> String {
	if alias.is_empty() {
		quote_identifier(column)
	} else {
		format!("{}.{}", quote_alias(alias), quote_identifier(column))
	}
}

/// Singular form of a model or association name
///
/// Used as the default alias of includes that name a model without an
/// explicit alias. Handles the common English plural endings only.
///
/// # Examples
///
/// ```
/// use reinhardt_derived_fields::naming::singularize;
///
/// assert_eq!(singularize("Details"), "Detail");
/// assert_eq!(singularize("Categories"), "Category");
/// assert_eq!(singularize("Boxes"), "Box");
/// assert_eq!(singularize("Master"), "Master");
/// ```
pub fn singularize(name: &str) -> String {
	let lower = name.to_ascii_lowercase();

	if lower.len() > 3 && lower.ends_with("ies") {
		return format!("{}y", &name[..name.len() - 3]);
	}
	for suffix in ["sses", "xes", "zes", "ches", "shes"] {
		if lower.len() > suffix.len() && lower.ends_with(suffix) {
			return name[..name.len() - 2].to_string();
		}
	}
	if lower.ends_with("ss") || lower.ends_with("us") || lower.ends_with("is") {
		return name.to_string();
	}
	match name.strip_suffix(['s', 'S']) {
		Some(stem) if !stem.is_empty() => stem.to_string(),
		_ => name.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("Details", "Detail")]
	#[case("SubSubDetails", "SubSubDetail")]
	#[case("Companies", "Company")]
	#[case("Addresses", "Address")]
	#[case("Matches", "Match")]
	#[case("Wishes", "Wish")]
	#[case("Status", "Status")]
	#[case("Class", "Class")]
	#[case("Analysis", "Analysis")]
	#[case("Supreme", "Supreme")]
	#[case("s", "s")]
	fn test_singularize(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(singularize(input), expected);
	}

	#[rstest]
	fn test_quote_alias_empty() {
		assert_eq!(quote_alias(""), "");
	}

	#[rstest]
	fn test_qualified_column_nested_alias() {
		assert_eq!(
			qualified_column("Detail.Master", "name"),
			"\"Detail\".\"Master\".\"name\""
		);
	}

	#[rstest]
	fn test_quote_identifier_escapes_quotes() {
		assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
	}
}
