use crate::directive::Directive;
use crate::directive::parse_directive;

/// Everything the resolver needs to know about a single line of source,
/// computed once when the line is classified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineInfo {
	/// The payload of a `//` line comment, without the marker and untrimmed.
	pub comment: Option<String>,
	/// The line starts with `/*` after leading whitespace.
	pub begins_block_comment: bool,
	/// The line starts with `/**` after leading whitespace.
	pub begins_doc_comment: bool,
	/// The line contains `*/`.
	pub ends_block_comment: bool,
	/// The line contains `**/`.
	pub ends_doc_comment: bool,
	/// The directive carried by the line comment, if it is well formed.
	pub directive: Option<Directive>,
}

impl LineInfo {
	pub fn is_comment(&self) -> bool {
		self.comment.is_some()
	}

	pub fn is_require(&self) -> bool {
		self.directive.as_ref().is_some_and(Directive::is_require)
	}

	pub fn is_provide(&self) -> bool {
		self.directive.as_ref().is_some_and(Directive::is_provide)
	}

	pub fn alias(&self) -> Option<&str> {
		self.directive.as_ref().and_then(Directive::alias)
	}
}

/// Classify a raw line of text.
pub fn classify(line: &str) -> LineInfo {
	let trimmed = line.trim_start();
	let comment = trimmed.strip_prefix("//").map(ToString::to_string);
	let directive = comment.as_deref().and_then(parse_directive);

	LineInfo {
		begins_block_comment: trimmed.starts_with("/*"),
		begins_doc_comment: trimmed.starts_with("/**"),
		ends_block_comment: line.contains("*/"),
		ends_doc_comment: line.contains("**/"),
		comment,
		directive,
	}
}
