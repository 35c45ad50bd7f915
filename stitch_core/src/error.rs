use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum StitchError {
	#[error(transparent)]
	#[diagnostic(code(stitch::io_error))]
	Io(#[from] std::io::Error),

	#[error("couldn't find constant `{constant}` in line {line} of {file}")]
	#[diagnostic(
		code(stitch::undefined_constant),
		help("define `{constant}` in a `constants.yml` on the load path or under [constants] in stitch.toml")
	)]
	UndefinedConstant {
		constant: String,
		file: String,
		line: usize,
	},

	#[error("can't find file for `{reference}`{}", describe_origin(.file, .line))]
	#[diagnostic(
		code(stitch::file_not_found),
		help("check the spelling of the reference or add its directory to the load path")
	)]
	FileNotFound {
		reference: String,
		file: Option<String>,
		line: Option<usize>,
	},

	#[error("failed to read source file `{path}`: {source}")]
	#[diagnostic(
		code(stitch::read_source),
		help("check that the path names a readable file and not a directory")
	)]
	ReadSource {
		path: String,
		#[source]
		source: std::io::Error,
	},

	#[error("circular require detected: {chain}")]
	#[diagnostic(
		code(stitch::circular_require),
		help("remove one of the requires or set `cycles = \"tolerate\"` in stitch.toml")
	)]
	CircularRequire { chain: String },

	#[error("failed to load constants from `{path}`: {reason}")]
	#[diagnostic(
		code(stitch::malformed_constants),
		help("a constants resource must be a YAML mapping of names to values")
	)]
	MalformedConstantsResource { path: String, reason: String },

	#[error("no source files to build")]
	#[diagnostic(
		code(stitch::no_source_files),
		help("pass entry files on the command line or set `source_files` in stitch.toml")
	)]
	NoSourceFiles,

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(stitch::config_parse),
		help("check that stitch.toml is valid TOML with `load_path`, `source_files` and [constants]")
	)]
	ConfigParse(String),
}

#[allow(clippy::ref_option)]
fn describe_origin(file: &Option<String>, line: &Option<usize>) -> String {
	match (file, line) {
		(Some(file), Some(line)) => format!(" in line {line} of {file}"),
		(Some(file), None) => format!(" in {file}"),
		_ => String::new(),
	}
}

pub type StitchResult<T> = Result<T, StitchError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
