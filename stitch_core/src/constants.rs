use std::path::Path;

use serde_json::Value;

use crate::StitchError;
use crate::StitchResult;
use crate::fs::FileSystem;
use crate::interpolate::ConstantsMapping;
use crate::load_path::LoadPath;

/// Conventional name of the per-root constants resource.
pub const DEFAULT_CONSTANTS_FILE: &str = "constants.yml";

/// Merges constants discovered on disk under every root with the constants
/// supplied by configuration.
///
/// The merged mapping is cached; call [`ConstantsProvider::reload`] after the
/// load path or the files on disk change.
#[derive(Debug, Clone)]
pub struct ConstantsProvider {
	file_name: String,
	from_config: ConstantsMapping,
	from_disk: ConstantsMapping,
	merged: ConstantsMapping,
}

impl ConstantsProvider {
	/// Create a provider that only knows the configuration constants until it
	/// is first reloaded.
	pub fn new(file_name: impl Into<String>, from_config: ConstantsMapping) -> Self {
		Self {
			file_name: file_name.into(),
			merged: from_config.clone(),
			from_config,
			from_disk: ConstantsMapping::new(),
		}
	}

	/// Rescan every root for the constants resource and rebuild the merged
	/// mapping.
	pub fn reload(&mut self, fs: &dyn FileSystem, load_path: &LoadPath) {
		self.from_disk = constants_from_disk(fs, load_path, &self.file_name);
		self.merged = self.from_disk.clone();
		self.merged.extend(
			self.from_config
				.iter()
				.map(|(key, value)| (key.clone(), value.clone())),
		);
	}

	/// Disk constants overlaid with configuration constants.
	pub fn constants(&self) -> &ConstantsMapping {
		&self.merged
	}

	pub fn from_disk(&self) -> &ConstantsMapping {
		&self.from_disk
	}

	pub fn from_config(&self) -> &ConstantsMapping {
		&self.from_config
	}

	pub fn file_name(&self) -> &str {
		&self.file_name
	}
}

/// Collect the constants resource of every root. Roots are visited from the
/// lowest to the highest priority so that higher priority roots replace whole
/// values of the same key.
pub fn constants_from_disk(
	fs: &dyn FileSystem,
	load_path: &LoadPath,
	file_name: &str,
) -> ConstantsMapping {
	let mut constants = ConstantsMapping::new();

	for root in load_path.iter().rev() {
		let Ok(entries) = fs.list_entries(root.path()) else {
			tracing::debug!(root = %root, "skipping unreadable load location");
			continue;
		};

		if !entries.contains(file_name) {
			continue;
		}

		let path = root.path().join(file_name);
		match load_constants_resource(fs, &path) {
			Ok(found) => constants.extend(found),
			Err(error) => tracing::warn!("{error}; ignoring its constants"),
		}
	}

	constants
}

fn load_constants_resource(fs: &dyn FileSystem, path: &Path) -> StitchResult<ConstantsMapping> {
	let malformed = |reason: String| {
		StitchError::MalformedConstantsResource {
			path: path.display().to_string(),
			reason,
		}
	};

	let content = fs
		.read_lines(path)
		.map_err(|e| malformed(e.to_string()))?
		.join("\n");
	let value: Value = serde_yaml_ng::from_str(&content).map_err(|e| malformed(e.to_string()))?;

	match value {
		Value::Object(map) => Ok(map.into_iter().collect()),
		Value::Null => Ok(ConstantsMapping::new()),
		other => Err(malformed(format!("expected a mapping, found `{other}`"))),
	}
}
