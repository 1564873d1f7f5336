//! Pretty-printing of FOLD JSON text.

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};

pub const DEFAULT_TAB_SIZE: usize = 2;
/// Widest indent accepted; larger sizes are clamped, as `JSON.stringify` does.
pub const MAX_TAB_SIZE: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
	#[error("Error formatting FOLD file: Invalid JSON ({0})")]
	InvalidJson(#[from] serde_json::Error),
}

/// Re-indents `text` with `tab_size` spaces per level, keeping key order.
pub fn pretty(text: &str, tab_size: usize) -> Result<String, FormatError> {
	let value: Value = serde_json::from_str(text)?;
	let indent = " ".repeat(tab_size.min(MAX_TAB_SIZE));
	let mut out = Vec::new();
	let mut ser = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(indent.as_bytes()));
	value.serialize(&mut ser)?;
	// serde_json only ever writes valid UTF-8.
	Ok(String::from_utf8_lossy(&out).into_owned())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn indents_with_tab_size() {
		let out = pretty(r#"{"b":[1,2],"a":{"c":true}}"#, 4).unwrap();
		assert_eq!(
			out,
			"{\n    \"b\": [\n        1,\n        2\n    ],\n    \"a\": {\n        \"c\": true\n    }\n}"
		);
	}

	#[test]
	fn default_indent() {
		let out = pretty("[1]", DEFAULT_TAB_SIZE).unwrap();
		assert_eq!(out, "[\n  1\n]");
	}

	#[test]
	fn huge_indent_is_clamped() {
		let out = pretty("[1]", usize::MAX).unwrap();
		assert_eq!(out, format!("[\n{}1\n]", " ".repeat(MAX_TAB_SIZE)));
	}

	#[test]
	fn rejects_invalid_json() {
		let err = pretty("{invalid", 2).unwrap_err();
		assert!(err.to_string().starts_with("Error formatting FOLD file"));
	}
}
