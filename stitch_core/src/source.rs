use std::path::Path;

use crate::StitchError;
use crate::StitchResult;
use crate::directive::Directive;
use crate::fs::FileSystem;
use crate::interpolate::ConstantsMapping;
use crate::interpolate::render;
use crate::line::LineInfo;
use crate::line::classify;
use crate::load_path::ResolvedFile;

/// One line of a source file with its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
	/// 1-indexed line number.
	pub number: usize,
	pub text: String,
	pub info: LineInfo,
}

impl SourceLine {
	pub fn new(text: impl Into<String>, number: usize) -> Self {
		let text = text.into();
		let info = classify(&text);

		Self { number, text, info }
	}

	pub fn directive(&self) -> Option<&Directive> {
		self.info.directive.as_ref()
	}

	/// Interpolate constants into the line and normalize its line ending.
	/// `file` is only used to describe where an undefined constant was found.
	#[allow(clippy::implicit_hasher)]
	pub fn render(&self, file: &Path, constants: &ConstantsMapping) -> StitchResult<String> {
		render(&self.text, constants).map_err(|missing| {
			StitchError::UndefinedConstant {
				constant: missing.0,
				file: file.display().to_string(),
				line: self.number,
			}
		})
	}
}

/// A resolved file together with its classified lines.
#[derive(Debug, Clone)]
pub struct SourceFile {
	pub file: ResolvedFile,
	pub lines: Vec<SourceLine>,
}

impl SourceFile {
	pub fn new(file: ResolvedFile, lines: impl IntoIterator<Item = String>) -> Self {
		let lines = lines
			.into_iter()
			.enumerate()
			.map(|(index, text)| SourceLine::new(text, index + 1))
			.collect();

		Self { file, lines }
	}

	pub fn load(fs: &dyn FileSystem, file: ResolvedFile) -> StitchResult<Self> {
		let lines = fs.read_lines(&file.path).map_err(|source| {
			StitchError::ReadSource {
				path: file.path.display().to_string(),
				source,
			}
		})?;

		Ok(Self::new(file, lines))
	}

	pub fn path(&self) -> &Path {
		&self.file.path
	}

	/// The lines that carry a directive, in file order.
	pub fn directives(&self) -> impl Iterator<Item = (&SourceLine, &Directive)> {
		self.lines
			.iter()
			.filter_map(|line| line.directive().map(|directive| (line, directive)))
	}

	/// Render every line that belongs in the concatenated output.
	///
	/// Directive lines are always dropped. With `strip_comments`, `//` line
	/// comments and `/** … **/` documentation comments are dropped as well.
	/// A block opened with `/**` but closed with a plain `*/` is an ordinary
	/// comment and is kept, as is a block that is never closed.
	#[allow(clippy::implicit_hasher)]
	pub fn render(
		&self,
		constants: &ConstantsMapping,
		strip_comments: bool,
	) -> StitchResult<Vec<String>> {
		let mut rendered = Vec::with_capacity(self.lines.len());
		let mut doc_block: Option<Vec<&SourceLine>> = None;

		for line in &self.lines {
			if line.info.directive.is_some() {
				continue;
			}

			if !strip_comments {
				rendered.push(line.render(self.path(), constants)?);
				continue;
			}

			if doc_block.is_none() && line.info.begins_doc_comment {
				doc_block = Some(Vec::new());
			}

			if let Some(mut block) = doc_block.take() {
				block.push(line);
				if !line.info.ends_block_comment {
					doc_block = Some(block);
				} else if !line.info.ends_doc_comment {
					for kept in block {
						rendered.push(kept.render(self.path(), constants)?);
					}
				}
				continue;
			}

			if line.info.is_comment() {
				continue;
			}

			rendered.push(line.render(self.path(), constants)?);
		}

		for kept in doc_block.into_iter().flatten() {
			rendered.push(kept.render(self.path(), constants)?);
		}

		Ok(rendered)
	}
}
