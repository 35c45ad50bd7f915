use std::path::PathBuf;

use serde_json::Value;

use crate::Environment;
use crate::EnvironmentOptions;
use crate::MemoryFileSystem;
use crate::interpolate::ConstantsMapping;

pub const PROJECT_ROOT: &str = "/project";

pub fn project_path(relative: &str) -> PathBuf {
	PathBuf::from(PROJECT_ROOT).join(relative)
}

/// An in-memory filesystem with every `(relative path, content)` pair stored
/// under [`PROJECT_ROOT`].
pub fn memory_fs(files: &[(&str, &str)]) -> MemoryFileSystem {
	files
		.iter()
		.fold(MemoryFileSystem::new(), |fs, (path, content)| {
			fs.with_file(project_path(path), *content)
		})
}

/// An environment over [`memory_fs`] with `load_path` registered in order.
pub fn memory_environment(files: &[(&str, &str)], load_path: &[&str]) -> Environment {
	Environment::with_file_system(PROJECT_ROOT, memory_fs(files))
		.unwrap_or_else(|e| panic!("failed to create environment: {e}"))
		.with_load_path(load_path)
}

pub fn memory_environment_with_options(
	files: &[(&str, &str)],
	load_path: &[&str],
	options: EnvironmentOptions,
) -> Environment {
	memory_environment(files, load_path).with_options(options)
}

pub fn constants(pairs: &[(&str, &str)]) -> ConstantsMapping {
	pairs
		.iter()
		.map(|(key, value)| ((*key).to_string(), Value::String((*value).to_string())))
		.collect()
}

/// Relative paths of the resolved files, for compact assertions.
pub fn resolved_paths(result: &crate::ResolutionResult) -> Vec<String> {
	result
		.files()
		.map(|file| {
			file.path
				.strip_prefix(PROJECT_ROOT)
				.unwrap_or(&file.path)
				.display()
				.to_string()
		})
		.collect()
}
