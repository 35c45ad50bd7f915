use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::StitchResult;
use crate::constants::ConstantsProvider;
use crate::constants::DEFAULT_CONSTANTS_FILE;
use crate::fs::FileSystem;
use crate::fs::OsFileSystem;
use crate::interpolate::ConstantsMapping;
use crate::load_path::LoadPath;
use crate::load_path::ResolvedFile;
use crate::load_path::Root;
use crate::resolver::ResolutionResult;
use crate::resolver::Session;

/// Default extension appended to required paths that have none.
pub const DEFAULT_EXTENSION: &str = "js";

/// What to do when a file requires one of its own ancestors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePolicy {
	/// Treat the ancestor as already satisfied and keep going.
	#[default]
	Tolerate,
	/// Abort the session with [`StitchError::CircularRequire`](crate::StitchError::CircularRequire).
	Fail,
}

/// Options controlling resolution and rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentOptions {
	/// Drop `//` comments and `/** … **/` documentation comments from the
	/// rendered output.
	pub strip_comments: bool,
	/// Extension appended to required paths without one. `None` disables it.
	pub extension: Option<String>,
	pub cycles: CyclePolicy,
	/// Name of the constants resource looked up under every root.
	pub constants_file: String,
}

impl Default for EnvironmentOptions {
	fn default() -> Self {
		Self {
			strip_comments: true,
			extension: Some(DEFAULT_EXTENSION.to_string()),
			cycles: CyclePolicy::default(),
			constants_file: DEFAULT_CONSTANTS_FILE.to_string(),
		}
	}
}

/// The context shared by resolution sessions: the project root, the load
/// path, the constants and the filesystem they are read from.
///
/// The project root is always on the load path with the lowest priority
/// until other locations are registered.
#[derive(Debug)]
pub struct Environment {
	root: Root,
	load_path: LoadPath,
	constants: ConstantsProvider,
	options: EnvironmentOptions,
	fs: Box<dyn FileSystem>,
}

impl Environment {
	/// Create an environment rooted at `root` on the real filesystem.
	pub fn new(root: impl AsRef<Path>) -> StitchResult<Self> {
		Self::with_file_system(root, OsFileSystem)
	}

	pub fn with_file_system(
		root: impl AsRef<Path>,
		fs: impl FileSystem + 'static,
	) -> StitchResult<Self> {
		let absolute = std::path::absolute(root.as_ref())?;
		let root = Root::new(&absolute, ".");
		let mut load_path = LoadPath::new();
		load_path.register(root.clone());
		let options = EnvironmentOptions::default();
		let constants = ConstantsProvider::new(&options.constants_file, ConstantsMapping::new());

		let mut environment = Self {
			root,
			load_path,
			constants,
			options,
			fs: Box::new(fs),
		};
		environment.reload_constants();

		Ok(environment)
	}

	/// Register each location in turn, so the last one ends up with the
	/// highest priority.
	#[must_use]
	pub fn with_load_path<I, P>(mut self, locations: I) -> Self
	where
		I: IntoIterator<Item = P>,
		P: AsRef<Path>,
	{
		for location in locations {
			self.load_path
				.register(Root::new(self.root.path(), location.as_ref()));
		}
		self.reload_constants();
		self
	}

	/// Replace the constants supplied by configuration. They take precedence
	/// over constants discovered on disk.
	#[must_use]
	pub fn with_constants(mut self, constants: ConstantsMapping) -> Self {
		self.constants = ConstantsProvider::new(&self.options.constants_file, constants);
		self.reload_constants();
		self
	}

	#[must_use]
	pub fn with_options(mut self, options: EnvironmentOptions) -> Self {
		let from_config = self.constants.from_config().clone();
		self.constants = ConstantsProvider::new(&options.constants_file, from_config);
		self.options = options;
		self.reload_constants();
		self
	}

	pub fn root(&self) -> &Root {
		&self.root
	}

	pub fn load_path(&self) -> &LoadPath {
		&self.load_path
	}

	pub fn options(&self) -> &EnvironmentOptions {
		&self.options
	}

	pub fn fs(&self) -> &dyn FileSystem {
		self.fs.as_ref()
	}

	/// Give `location` the highest priority on the load path. Relative
	/// locations are anchored at the project root.
	pub fn register_load_location(&mut self, location: impl AsRef<Path>) -> Root {
		let root = Root::new(self.root.path(), location);
		self.load_path.register(root.clone());
		self.reload_constants();
		root
	}

	/// Find `location`: absolute paths that exist are used as is, anything
	/// else is searched on the load path.
	pub fn find(&self, location: impl AsRef<Path>) -> Option<ResolvedFile> {
		let location = location.as_ref();
		if location.is_absolute() {
			if self.fs.exists(location) {
				return Some(ResolvedFile::from_absolute(location));
			}
			return None;
		}

		self.load_path.resolve_first(self.fs(), location)
	}

	/// Every root under which `location` exists, highest priority first.
	pub fn find_all(&self, location: impl AsRef<Path>) -> Vec<ResolvedFile> {
		self.load_path.resolve_all(self.fs(), location.as_ref())
	}

	/// Disk constants overlaid with configuration constants.
	pub fn constants(&self) -> &ConstantsMapping {
		self.constants.constants()
	}

	pub fn constants_provider(&self) -> &ConstantsProvider {
		&self.constants
	}

	/// Rescan the load path for constants resources.
	pub fn reload_constants(&mut self) {
		self.constants.reload(self.fs.as_ref(), &self.load_path);
	}

	/// Start a new resolution session with an empty alias registry.
	pub fn session(&self) -> Session<'_> {
		Session::new(self)
	}

	/// Resolve `entry` and everything it requires in a fresh session.
	pub fn resolve(&self, entry: &str) -> StitchResult<ResolutionResult> {
		self.session().resolve(entry)
	}
}
