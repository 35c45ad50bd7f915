use std::fmt::Display;

use logos::Logos;

/// Raw tokens produced by logos for the payload of a `//` line comment.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum RawToken {
	#[token("=")]
	Equals,
	#[token("require")]
	Require,
	#[token("provide")]
	Provide,
	#[token("as")]
	As,
	#[regex(r"[ \t\r\n\x0B\x0C]+")]
	Whitespace,
	#[regex(r#""[^"]*""#)]
	DoubleQuotedString,
	#[regex(r"'[^']*'")]
	SingleQuotedString,
	#[regex(r"<[^>]*>")]
	AngleBracketed,
}

/// How the path of a `require` directive was delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delimiter {
	/// `"path"`
	DoubleQuote,
	/// `'path'`
	SingleQuote,
	/// `<path>`
	AngleBracket,
}

impl Delimiter {
	/// Quoted references are looked up next to the requiring file before the
	/// load path is searched.
	pub fn is_quoted(self) -> bool {
		matches!(self, Self::DoubleQuote | Self::SingleQuote)
	}

	fn wrap(self, path: &str) -> String {
		match self {
			Self::DoubleQuote => format!("\"{path}\""),
			Self::SingleQuote => format!("'{path}'"),
			Self::AngleBracket => format!("<{path}>"),
		}
	}
}

/// The target of a `require` directive with its delimiters removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequireTarget {
	pub path: String,
	pub delimiter: Delimiter,
}

impl Display for RequireTarget {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.delimiter.wrap(&self.path))
	}
}

/// A build directive embedded in a line comment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Directive {
	/// `//= require "path"`, `//= require 'path'` or `//= require <path>`
	Require(RequireTarget),
	/// `//= provide "path"` or `//= provide "path" as "alias"`
	Provide {
		target: String,
		alias: Option<String>,
	},
}

impl Directive {
	pub fn is_require(&self) -> bool {
		matches!(self, Self::Require(_))
	}

	pub fn is_provide(&self) -> bool {
		matches!(self, Self::Provide { .. })
	}

	/// The declared alias of a `provide … as …` directive.
	pub fn alias(&self) -> Option<&str> {
		match self {
			Self::Provide { alias, .. } => alias.as_deref(),
			Self::Require(_) => None,
		}
	}
}

/// Parse the payload of a line comment (everything after `//`) into a
/// directive.
///
/// The grammar is strict: any unexpected token yields `None` rather than a
/// partially populated directive.
pub fn parse_directive(payload: &str) -> Option<Directive> {
	let mut tokens = Vec::new();
	for (result, span) in RawToken::lexer(payload).spanned() {
		tokens.push((result.ok()?, &payload[span]));
	}

	let mut cursor = DirectiveCursor::new(&tokens);
	cursor.skip_whitespace();
	cursor.expect(RawToken::Equals)?;
	cursor.expect(RawToken::Whitespace)?;

	let directive = match cursor.bump()? {
		RawToken::Require => {
			cursor.expect(RawToken::Whitespace)?;
			let (token, slice) = cursor.bump_with_slice()?;
			let delimiter = match token {
				RawToken::DoubleQuotedString => Delimiter::DoubleQuote,
				RawToken::SingleQuotedString => Delimiter::SingleQuote,
				RawToken::AngleBracketed => Delimiter::AngleBracket,
				_ => return None,
			};

			Directive::Require(RequireTarget {
				path: strip_delimiters(slice).to_string(),
				delimiter,
			})
		}
		RawToken::Provide => {
			cursor.expect(RawToken::Whitespace)?;
			let target = cursor.quoted()?;
			let alias = cursor.alias()?;

			Directive::Provide { target, alias }
		}
		_ => return None,
	};

	cursor.skip_whitespace();
	cursor.is_done().then_some(directive)
}

/// Walks the flat token list produced for a single comment payload.
struct DirectiveCursor<'a> {
	tokens: &'a [(RawToken, &'a str)],
	position: usize,
}

impl<'a> DirectiveCursor<'a> {
	fn new(tokens: &'a [(RawToken, &'a str)]) -> Self {
		Self {
			tokens,
			position: 0,
		}
	}

	fn peek(&self) -> Option<RawToken> {
		self.tokens.get(self.position).map(|(token, _)| *token)
	}

	fn bump_with_slice(&mut self) -> Option<(RawToken, &'a str)> {
		let item = self.tokens.get(self.position).copied()?;
		self.position += 1;
		Some(item)
	}

	fn bump(&mut self) -> Option<RawToken> {
		self.bump_with_slice().map(|(token, _)| token)
	}

	fn expect(&mut self, expected: RawToken) -> Option<()> {
		(self.bump()? == expected).then_some(())
	}

	fn skip_whitespace(&mut self) {
		while self.peek() == Some(RawToken::Whitespace) {
			self.position += 1;
		}
	}

	fn is_done(&self) -> bool {
		self.position >= self.tokens.len()
	}

	fn quoted(&mut self) -> Option<String> {
		match self.bump_with_slice()? {
			(RawToken::DoubleQuotedString | RawToken::SingleQuotedString, slice) => {
				Some(strip_delimiters(slice).to_string())
			}
			_ => None,
		}
	}

	/// Parse an optional ` as "alias"` clause. The outer `Option` is `None`
	/// when the clause is malformed, the inner one when it is absent.
	fn alias(&mut self) -> Option<Option<String>> {
		let checkpoint = self.position;
		self.skip_whitespace();

		if self.peek() != Some(RawToken::As) {
			self.position = checkpoint;
			return Some(None);
		}

		if self.position == checkpoint {
			// `"path"as` without separating whitespace.
			return None;
		}

		self.position += 1;
		self.expect(RawToken::Whitespace)?;
		self.quoted().map(Some)
	}
}

fn strip_delimiters(slice: &str) -> &str {
	&slice[1..slice.len() - 1]
}
