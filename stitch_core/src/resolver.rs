use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;

use crate::StitchError;
use crate::StitchResult;
use crate::alias::AliasRegistry;
use crate::directive::Directive;
use crate::directive::RequireTarget;
use crate::environment::CyclePolicy;
use crate::environment::Environment;
use crate::load_path::ResolvedFile;
use crate::load_path::normalize_path;
use crate::source::SourceFile;
use crate::source::SourceLine;

/// A location declared with `provide`, to be installed next to the
/// concatenated output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvidedAsset {
	/// Absolute, normalized path of the provided file or directory.
	pub path: PathBuf,
	/// The alias it was provided as, if any.
	pub alias: Option<String>,
	/// The file containing the `provide` directive.
	pub declared_in: PathBuf,
	/// 1-indexed line number of the directive.
	pub line: usize,
}

/// A file in the resolved order together with its rendered lines.
#[derive(Debug, Clone)]
pub struct ResolvedSource {
	pub file: ResolvedFile,
	/// Lines after directive removal, comment stripping and interpolation,
	/// each terminated by `\n`.
	pub rendered: Vec<String>,
}

/// The outcome of a resolution session.
///
/// Every file appears once, after all the files it requires, except where a
/// tolerated cycle was broken.
#[derive(Debug, Clone, Default)]
pub struct ResolutionResult {
	sources: Vec<ResolvedSource>,
	provided: Vec<ProvidedAsset>,
}

impl ResolutionResult {
	pub fn sources(&self) -> &[ResolvedSource] {
		&self.sources
	}

	pub fn files(&self) -> impl Iterator<Item = &ResolvedFile> {
		self.sources.iter().map(|source| &source.file)
	}

	pub fn paths(&self) -> Vec<&Path> {
		self.files().map(|file| file.path.as_path()).collect()
	}

	pub fn provided(&self) -> &[ProvidedAsset] {
		&self.provided
	}

	pub fn len(&self) -> usize {
		self.sources.len()
	}

	pub fn is_empty(&self) -> bool {
		self.sources.is_empty()
	}
}

/// A single depth-first traversal over the require graph.
///
/// Aliases registered while visiting one file are visible to every file
/// visited later in the same session. A session that returned an error must
/// be discarded.
#[derive(Debug)]
pub struct Session<'env> {
	environment: &'env Environment,
	aliases: AliasRegistry,
	emitted: HashSet<PathBuf>,
	in_progress: Vec<PathBuf>,
	result: ResolutionResult,
}

impl<'env> Session<'env> {
	pub fn new(environment: &'env Environment) -> Self {
		Self {
			environment,
			aliases: AliasRegistry::new(),
			emitted: HashSet::new(),
			in_progress: Vec::new(),
			result: ResolutionResult::default(),
		}
	}

	pub fn aliases(&self) -> &AliasRegistry {
		&self.aliases
	}

	/// Resolve `entry` and return the ordered result.
	pub fn resolve(mut self, entry: &str) -> StitchResult<ResolutionResult> {
		self.require(entry)?;
		Ok(self.finish())
	}

	/// Add `entry` and its dependencies to the session. Files already emitted
	/// by an earlier entry are not emitted again.
	pub fn require(&mut self, entry: &str) -> StitchResult<()> {
		let file = self.find(entry).ok_or_else(|| {
			StitchError::FileNotFound {
				reference: entry.to_string(),
				file: None,
				line: None,
			}
		})?;

		self.visit(file)
	}

	pub fn finish(self) -> ResolutionResult {
		self.result
	}

	/// Locate a reference the way an angle-bracketed require does: existing
	/// absolute paths first, then aliases, then the load path.
	pub fn find(&self, reference: &str) -> Option<ResolvedFile> {
		let fs = self.environment.fs();
		let candidates = self.candidates(reference);

		if Path::new(reference).is_absolute() {
			return candidates
				.iter()
				.find_map(|candidate| self.environment.find(candidate));
		}

		// An alias on its own names the provided location as written.
		candidates
			.iter()
			.map(String::as_str)
			.chain(std::iter::once(reference))
			.find_map(|candidate| self.aliases.resolve(fs, Path::new(candidate)))
			.or_else(|| {
				candidates.iter().find_map(|candidate| {
					self.environment
						.load_path()
						.resolve_first(fs, Path::new(candidate))
				})
			})
	}

	/// The paths tried for `reference`, in order. The default extension is
	/// appended unless the reference already ends with it, so dotted names
	/// such as `jquery-1.3.2` still resolve to `jquery-1.3.2.js`. A reference
	/// with some other extension is also tried as written.
	fn candidates(&self, reference: &str) -> Vec<String> {
		let Some(extension) = &self.environment.options().extension else {
			return vec![reference.to_string()];
		};

		if reference.ends_with(&format!(".{extension}")) {
			return vec![reference.to_string()];
		}

		let mut candidates = vec![format!("{reference}.{extension}")];
		if Path::new(reference).extension().is_some() {
			candidates.push(reference.to_string());
		}

		candidates
	}

	fn visit(&mut self, file: ResolvedFile) -> StitchResult<()> {
		if self.emitted.contains(&file.path) {
			tracing::trace!(file = %file, "already included");
			return Ok(());
		}

		if self.in_progress.contains(&file.path) {
			return self.on_cycle(&file);
		}

		tracing::debug!(file = %file, "including");
		self.in_progress.push(file.path.clone());
		let source = SourceFile::load(self.environment.fs(), file)?;

		for line in &source.lines {
			match line.directive() {
				Some(Directive::Require(target)) => {
					let dependency = self.locate_require(target, &source, line)?;
					self.visit(dependency)?;
				}
				Some(Directive::Provide { target, alias }) => {
					self.provide(target, alias.as_deref(), &source, line)?;
				}
				None => {}
			}
		}

		let options = self.environment.options();
		let rendered = source.render(self.environment.constants(), options.strip_comments)?;

		self.in_progress.pop();
		self.emitted.insert(source.file.path.clone());
		self.result.sources.push(ResolvedSource {
			file: source.file,
			rendered,
		});

		Ok(())
	}

	fn on_cycle(&self, file: &ResolvedFile) -> StitchResult<()> {
		match self.environment.options().cycles {
			CyclePolicy::Tolerate => {
				tracing::debug!(file = %file, "skipping circular require");
				Ok(())
			}
			CyclePolicy::Fail => {
				let start = self
					.in_progress
					.iter()
					.position(|path| path == &file.path)
					.unwrap_or_default();
				let chain = self.in_progress[start..]
					.iter()
					.chain(std::iter::once(&file.path))
					.map(|path| path.display().to_string())
					.collect::<Vec<_>>()
					.join(" -> ");

				Err(StitchError::CircularRequire { chain })
			}
		}
	}

	/// Quoted targets are looked up next to the requiring file first and fall
	/// back to the angle-bracket search.
	fn locate_require(
		&self,
		target: &RequireTarget,
		source: &SourceFile,
		line: &SourceLine,
	) -> StitchResult<ResolvedFile> {
		if target.delimiter.is_quoted() {
			let sibling = self
				.candidates(&target.path)
				.into_iter()
				.map(|relative| ResolvedFile::new(source.file.directory().to_path_buf(), relative))
				.find(|sibling| self.environment.fs().exists(&sibling.path));
			if let Some(sibling) = sibling {
				return Ok(sibling);
			}
		}

		self.find(&target.path).ok_or_else(|| {
			StitchError::FileNotFound {
				reference: target.to_string(),
				file: Some(source.path().display().to_string()),
				line: Some(line.number),
			}
		})
	}

	/// Provided locations are relative to the declaring file and must exist.
	fn provide(
		&mut self,
		target: &str,
		alias: Option<&str>,
		source: &SourceFile,
		line: &SourceLine,
	) -> StitchResult<()> {
		let path = normalize_path(&source.file.directory().join(target));
		if !self.environment.fs().exists(&path) {
			return Err(StitchError::FileNotFound {
				reference: format!("\"{target}\""),
				file: Some(source.path().display().to_string()),
				line: Some(line.number),
			});
		}

		if let Some(alias) = alias {
			self.aliases.register(alias, path.clone());
		}

		let asset = ProvidedAsset {
			path,
			alias: alias.map(ToString::to_string),
			declared_in: source.path().to_path_buf(),
			line: line.number,
		};
		if !self
			.result
			.provided
			.iter()
			.any(|existing| existing.path == asset.path && existing.alias == asset.alias)
		{
			self.result.provided.push(asset);
		}

		Ok(())
	}
}
