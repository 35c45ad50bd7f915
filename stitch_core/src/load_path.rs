use std::fmt::Display;
use std::hash::Hash;
use std::hash::Hasher;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use derive_more::Deref;

use crate::fs::FileSystem;

/// Lexically normalize a path: drop `.` segments, fold `..` into the parent
/// and remove any trailing separator. Symlinks are not resolved.
pub fn normalize_path(path: &Path) -> PathBuf {
	let mut normalized = PathBuf::new();

	for component in path.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => {
				match normalized.components().next_back() {
					Some(Component::Normal(_)) => {
						normalized.pop();
					}
					Some(Component::RootDir | Component::Prefix(_)) => {}
					_ => normalized.push(Component::ParentDir),
				}
			}
			other => normalized.push(other),
		}
	}

	normalized
}

/// An absolute, normalized search base.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deref)]
pub struct Root(PathBuf);

impl Root {
	/// Anchor `location` at `base` when it is relative, then normalize.
	pub fn new(base: &Path, location: impl AsRef<Path>) -> Self {
		let location = location.as_ref();
		if location.is_absolute() {
			Self(normalize_path(location))
		} else {
			Self(normalize_path(&base.join(location)))
		}
	}

	pub fn path(&self) -> &Path {
		&self.0
	}

	/// Locate `reference` under this root if something exists there.
	pub fn find(&self, fs: &dyn FileSystem, reference: &Path) -> Option<ResolvedFile> {
		let file = ResolvedFile::new(self.0.clone(), reference);
		fs.exists(&file.path).then_some(file)
	}
}

impl Display for Root {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0.display())
	}
}

/// A concrete source location reached through some root or alias.
///
/// Two resolved files are equal when their normalized absolute paths are
/// equal, regardless of how they were reached.
#[derive(Debug, Clone)]
pub struct ResolvedFile {
	/// The root or alias location the file was found under.
	pub root: PathBuf,
	/// The path of the file relative to `root`.
	pub relative: PathBuf,
	/// The normalized absolute path of the file.
	pub path: PathBuf,
}

impl ResolvedFile {
	pub fn new(root: PathBuf, relative: impl AsRef<Path>) -> Self {
		let relative = relative.as_ref().to_path_buf();
		let path = normalize_path(&root.join(&relative));

		Self {
			root,
			relative,
			path,
		}
	}

	/// Build a resolved file for an absolute path that bypassed the load path.
	pub fn from_absolute(path: &Path) -> Self {
		let path = normalize_path(path);
		let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
		let relative = path
			.file_name()
			.map(PathBuf::from)
			.unwrap_or_default();

		Self {
			root,
			relative,
			path,
		}
	}

	/// The directory containing the file.
	pub fn directory(&self) -> &Path {
		self.path.parent().unwrap_or(&self.path)
	}
}

impl PartialEq for ResolvedFile {
	fn eq(&self, other: &Self) -> bool {
		self.path == other.path
	}
}

impl Eq for ResolvedFile {}

impl Hash for ResolvedFile {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.path.hash(state);
	}
}

impl Display for ResolvedFile {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.path.display())
	}
}

/// Ordered, duplicate-free roots with the most recently registered first.
#[derive(Debug, Clone, Default, Deref)]
pub struct LoadPath {
	roots: Vec<Root>,
}

impl LoadPath {
	pub fn new() -> Self {
		Self::default()
	}

	/// Give `root` the highest priority. A root that is already present is
	/// moved to the front instead of being duplicated.
	pub fn register(&mut self, root: Root) {
		self.roots.retain(|existing| existing != &root);
		tracing::debug!(root = %root, "registered load location");
		self.roots.insert(0, root);
	}

	/// Every root under which `reference` exists, highest priority first.
	pub fn resolve_all(&self, fs: &dyn FileSystem, reference: &Path) -> Vec<ResolvedFile> {
		self.roots
			.iter()
			.filter_map(|root| root.find(fs, reference))
			.collect()
	}

	/// The highest priority root under which `reference` exists.
	pub fn resolve_first(&self, fs: &dyn FileSystem, reference: &Path) -> Option<ResolvedFile> {
		self.roots.iter().find_map(|root| root.find(fs, reference))
	}
}
