use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt::Debug;
use std::io;
use std::path::Path;
use std::path::PathBuf;

/// The filesystem operations the resolver depends on. All paths passed in are
/// absolute and normalized.
pub trait FileSystem: Debug {
	/// Whether anything (file or directory) exists at `path`.
	fn exists(&self, path: &Path) -> bool;

	/// Read the file at `path` as a sequence of lines without their
	/// terminators.
	fn read_lines(&self, path: &Path) -> io::Result<Vec<String>>;

	/// The names of the entries directly inside the directory at `path`.
	fn list_entries(&self, path: &Path) -> io::Result<BTreeSet<String>>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
	fn exists(&self, path: &Path) -> bool {
		path.exists()
	}

	/// Bytes that are not valid UTF-8 are replaced with U+FFFD.
	fn read_lines(&self, path: &Path) -> io::Result<Vec<String>> {
		let bytes = std::fs::read(path)?;
		let content = String::from_utf8_lossy(&bytes);
		Ok(content.lines().map(ToString::to_string).collect())
	}

	fn list_entries(&self, path: &Path) -> io::Result<BTreeSet<String>> {
		let mut names = BTreeSet::new();
		for entry in std::fs::read_dir(path)? {
			names.insert(entry?.file_name().to_string_lossy().into_owned());
		}

		Ok(names)
	}
}

/// An in-memory filesystem. Directories exist implicitly as ancestors of the
/// stored files.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
	files: BTreeMap<PathBuf, String>,
}

impl MemoryFileSystem {
	pub fn new() -> Self {
		Self::default()
	}

	/// Store `content` at the absolute `path`, replacing any previous file.
	pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
		self.files.insert(path.into(), content.into());
	}

	/// Builder form of [`MemoryFileSystem::insert`].
	#[must_use]
	pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
		self.insert(path, content);
		self
	}

	fn is_directory(&self, path: &Path) -> bool {
		self.files
			.keys()
			.any(|file| file != path && file.starts_with(path))
	}
}

impl FileSystem for MemoryFileSystem {
	fn exists(&self, path: &Path) -> bool {
		self.files.contains_key(path) || self.is_directory(path)
	}

	fn read_lines(&self, path: &Path) -> io::Result<Vec<String>> {
		self.files
			.get(path)
			.map(|content| content.lines().map(ToString::to_string).collect())
			.ok_or_else(|| {
				io::Error::new(
					io::ErrorKind::NotFound,
					format!("no such file: {}", path.display()),
				)
			})
	}

	fn list_entries(&self, path: &Path) -> io::Result<BTreeSet<String>> {
		if !self.is_directory(path) {
			return Err(io::Error::new(
				io::ErrorKind::NotFound,
				format!("no such directory: {}", path.display()),
			));
		}

		let names = self
			.files
			.keys()
			.filter_map(|file| file.strip_prefix(path).ok())
			.filter_map(|relative| relative.components().next())
			.map(|component| component.as_os_str().to_string_lossy().into_owned())
			.collect();

		Ok(names)
	}
}
