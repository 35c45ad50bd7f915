use std::path::Path;
use std::path::PathBuf;

use crate::StitchError;
use crate::StitchResult;
use crate::config::StitchConfig;
use crate::environment::Environment;
use crate::resolver::ResolutionResult;

/// A project root with its environment and the entry files to build.
///
/// This is the main entry point returned by [`load_project_with_config`].
#[derive(Debug)]
pub struct ProjectContext {
	pub environment: Environment,
	/// Entry references, resolved in order within one session.
	pub source_files: Vec<String>,
	/// Configured output location, relative paths anchored at the root.
	pub output: Option<PathBuf>,
	/// The config file the project was loaded from, if any.
	pub config_path: Option<PathBuf>,
}

impl ProjectContext {
	/// Build the context described by `config` for the project at `root`.
	pub fn from_config(root: &Path, config: &StitchConfig) -> StitchResult<Self> {
		let environment = Environment::new(root)?
			.with_options(config.environment_options())
			.with_load_path(&config.load_path)
			.with_constants(config.constants()?);
		let output = config
			.output
			.as_ref()
			.map(|output| environment.root().join(output));

		Ok(Self {
			environment,
			source_files: config.source_files.clone(),
			output,
			config_path: StitchConfig::resolve_path(root),
		})
	}

	/// Resolve every entry file into a single ordered result. Files shared by
	/// several entries are included once.
	pub fn resolve(&self) -> StitchResult<ResolutionResult> {
		if self.source_files.is_empty() {
			return Err(StitchError::NoSourceFiles);
		}

		let mut session = self.environment.session();
		for entry in &self.source_files {
			session.require(entry)?;
		}

		Ok(session.finish())
	}
}

/// Load the project config at `root` (if any) and build its context.
pub fn load_project_with_config(root: &Path) -> StitchResult<ProjectContext> {
	let config = StitchConfig::load(root)?.unwrap_or_default();
	ProjectContext::from_config(root, &config)
}
