use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::StitchError;
use crate::StitchResult;
use crate::constants::DEFAULT_CONSTANTS_FILE;
use crate::environment::CyclePolicy;
use crate::environment::DEFAULT_EXTENSION;
use crate::environment::EnvironmentOptions;
use crate::interpolate::ConstantsMapping;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = ["stitch.toml", ".stitch.toml", ".config/stitch.toml"];

/// Configuration loaded from a `stitch.toml` file.
///
/// ```toml
/// load_path = ["vendor", "src"]
/// source_files = ["src/application.js"]
/// output = "dist/application.js"
/// strip_comments = true
/// extension = "js"
/// constants_file = "constants.yml"
/// cycles = "tolerate"
///
/// [constants]
/// VERSION = "1.0"
/// ```
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StitchConfig {
	/// Locations searched for required files, lowest priority first. Relative
	/// locations are anchored at the project root.
	#[serde(default)]
	pub load_path: Vec<PathBuf>,
	/// Entry references resolved in order into a single concatenation.
	#[serde(default)]
	pub source_files: Vec<String>,
	/// Where `stitch build` writes the concatenation. Standard output when
	/// absent.
	#[serde(default)]
	pub output: Option<PathBuf>,
	/// Drop `//` comments and `/** … **/` documentation comments from the
	/// output.
	#[serde(default = "default_strip_comments")]
	pub strip_comments: bool,
	/// Extension appended to required paths without one. An empty string
	/// disables it.
	#[serde(default = "default_extension")]
	pub extension: String,
	/// Name of the constants resource looked up under every load location.
	#[serde(default = "default_constants_file")]
	pub constants_file: String,
	/// What to do when a file requires one of its own ancestors.
	#[serde(default)]
	pub cycles: CyclePolicy,
	/// Constants available to `<%= … %>` placeholders. These take
	/// precedence over constants found on disk.
	#[serde(default)]
	pub constants: toml::Table,
}

impl Default for StitchConfig {
	fn default() -> Self {
		Self {
			load_path: Vec::new(),
			source_files: Vec::new(),
			output: None,
			strip_comments: default_strip_comments(),
			extension: default_extension(),
			constants_file: default_constants_file(),
			cycles: CyclePolicy::default(),
			constants: toml::Table::new(),
		}
	}
}

fn default_strip_comments() -> bool {
	true
}

fn default_extension() -> String {
	DEFAULT_EXTENSION.to_string()
}

fn default_constants_file() -> String {
	DEFAULT_CONSTANTS_FILE.to_string()
}

impl StitchConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> StitchResult<Option<StitchConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config = Self::parse(&content)?;
		tracing::debug!(path = %config_path.display(), "loaded config");

		Ok(Some(config))
	}

	pub fn parse(content: &str) -> StitchResult<StitchConfig> {
		toml::from_str(content).map_err(|e| StitchError::ConfigParse(e.to_string()))
	}

	/// The resolution options described by this config.
	pub fn environment_options(&self) -> EnvironmentOptions {
		let extension = self.extension.trim().trim_start_matches('.');

		EnvironmentOptions {
			strip_comments: self.strip_comments,
			extension: (!extension.is_empty()).then(|| extension.to_string()),
			cycles: self.cycles,
			constants_file: self.constants_file.clone(),
		}
	}

	/// The `[constants]` table converted to interpolation values.
	pub fn constants(&self) -> StitchResult<ConstantsMapping> {
		self.constants
			.iter()
			.map(|(key, value)| Ok((key.clone(), toml_to_json(value.clone(), key)?)))
			.collect()
	}
}

/// Convert a `toml::Value` to a `serde_json::Value`.
fn toml_to_json(value: toml::Value, key: &str) -> StitchResult<serde_json::Value> {
	let json = match value {
		toml::Value::String(s) => serde_json::Value::String(s),
		toml::Value::Integer(i) => serde_json::Value::Number(i.into()),
		toml::Value::Float(f) => {
			serde_json::Value::Number(serde_json::Number::from_f64(f).ok_or_else(|| {
				StitchError::ConfigParse(format!("constant `{key}` is not a finite number: {f}"))
			})?)
		}
		toml::Value::Boolean(b) => serde_json::Value::Bool(b),
		toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
		toml::Value::Array(arr) => {
			let items: StitchResult<Vec<serde_json::Value>> =
				arr.into_iter().map(|v| toml_to_json(v, key)).collect();
			serde_json::Value::Array(items?)
		}
		toml::Value::Table(table) => {
			let mut map = serde_json::Map::new();
			for (k, v) in table {
				map.insert(k, toml_to_json(v, key)?);
			}
			serde_json::Value::Object(map)
		}
	};

	Ok(json)
}
