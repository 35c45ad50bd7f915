use std::collections::HashMap;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::fs::FileSystem;
use crate::load_path::ResolvedFile;

/// Alias names declared with `provide "…" as "…"` during a resolution
/// session, mapped to the absolute location they stand for.
#[derive(Debug, Clone, Default)]
pub struct AliasRegistry {
	aliases: HashMap<String, PathBuf>,
}

impl AliasRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register `alias` for `location`. Re-registering a name replaces the
	/// previous location, which is returned.
	pub fn register(&mut self, alias: impl Into<String>, location: PathBuf) -> Option<PathBuf> {
		let alias = alias.into();
		tracing::debug!(%alias, location = %location.display(), "registered alias");
		self.aliases.insert(alias, location)
	}

	pub fn get(&self, alias: &str) -> Option<&Path> {
		self.aliases.get(alias).map(PathBuf::as_path)
	}

	pub fn len(&self) -> usize {
		self.aliases.len()
	}

	pub fn is_empty(&self) -> bool {
		self.aliases.is_empty()
	}

	/// Resolve a reference whose first segment is a registered alias. The
	/// alias alone resolves to its location; `alias/rest` resolves to `rest`
	/// under that location.
	pub fn resolve(&self, fs: &dyn FileSystem, reference: &Path) -> Option<ResolvedFile> {
		let mut components = reference.components();
		let Some(Component::Normal(first)) = components.next() else {
			return None;
		};
		let location = self.aliases.get(first.to_str()?)?;
		let rest = components.as_path();

		let file = if rest.as_os_str().is_empty() {
			ResolvedFile::from_absolute(location)
		} else {
			ResolvedFile::new(location.clone(), rest)
		};

		fs.exists(&file.path).then_some(file)
	}
}
