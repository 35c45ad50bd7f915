use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use stitch_core::CyclePolicy;
use stitch_core::LoadPath;
use stitch_core::StitchConfig;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Concatenate source files in dependency order.",
	long_about = "stitch reads `//= require` and `//= provide` directives from your source \
	              files, resolves them against a load path, and writes one concatenated file \
	              where every dependency appears once, before the files that need \
	              it.\n\nConstants from `constants.yml` files and the [constants] table of \
	              stitch.toml are substituted into `<%= NAME %>` placeholders.\n\nQuick \
	              start:\n  stitch init   Create a sample stitch.toml\n  stitch build  Write the \
	              concatenation\n  stitch list   Show the resolved file order\n  stitch check  \
	              Verify the output is up to date"
)]
pub struct StitchCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,

	/// Add a location to the load path. Repeat the flag to add several; later
	/// locations take precedence over earlier ones and over the configured
	/// load path.
	#[arg(long = "load-path", short = 'I', global = true, value_name = "DIR")]
	pub load_path: Vec<PathBuf>,

	/// Keep `//` comments and `/** … **/` documentation comments in the
	/// output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_strip_comments: bool,

	/// What to do when a file requires one of its own ancestors. Overrides
	/// the `cycles` setting in stitch.toml.
	#[arg(long, global = true, value_enum)]
	pub cycles: Option<CyclesArg>,
}

impl StitchCli {
	/// Apply the command-line overrides to a loaded (or default) config.
	/// Non-empty `entries` replace the configured source files.
	pub fn apply_overrides(&self, config: &mut StitchConfig, entries: &[String]) {
		config.load_path.extend(self.load_path.iter().cloned());

		if self.no_strip_comments {
			config.strip_comments = false;
		}

		if let Some(cycles) = self.cycles {
			config.cycles = cycles.into();
		}

		if !entries.is_empty() {
			config.source_files = entries.to_vec();
		}
	}
}

#[derive(Subcommand)]
pub enum Commands {
	/// Initialize stitch in a project by creating a sample `stitch.toml`.
	///
	/// If the file already exists, this command is a no-op and exits
	/// successfully.
	Init,
	/// Resolve the entry files and write their concatenation.
	///
	/// Writes to the configured `output` (or `--output`) and to standard
	/// output when neither is set.
	Build {
		/// Entry references to build instead of the configured
		/// `source_files`.
		entries: Vec<String>,

		/// Write the concatenation to this file instead of the configured
		/// output.
		#[arg(long, short)]
		output: Option<PathBuf>,

		/// Watch for file changes and rebuild automatically.
		#[arg(long, default_value_t = false)]
		watch: bool,
	},
	/// List the resolved files in concatenation order.
	///
	/// Also prints the locations declared with `provide` and the aliases
	/// they were provided as.
	List {
		/// Entry references to list instead of the configured
		/// `source_files`.
		entries: Vec<String>,

		/// Output format. Use `text` for human-readable output or `json` for
		/// programmatic consumption.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Check that the configured output is up to date.
	///
	/// Builds the concatenation in memory and compares it with the file on
	/// disk. Exits with a non-zero status code when they differ, which makes
	/// it suitable for CI pipelines.
	Check {
		/// Entry references to check instead of the configured
		/// `source_files`.
		entries: Vec<String>,

		/// Compare against this file instead of the configured output.
		#[arg(long, short)]
		output: Option<PathBuf>,

		/// Show a unified diff between the file on disk and a fresh build.
		#[arg(long, default_value_t = false)]
		diff: bool,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CyclesArg {
	/// Skip the circular require and keep going.
	Tolerate,
	/// Abort with an error naming the cycle.
	Fail,
}

impl From<CyclesArg> for CyclePolicy {
	fn from(value: CyclesArg) -> Self {
		match value {
			CyclesArg::Tolerate => Self::Tolerate,
			CyclesArg::Fail => Self::Fail,
		}
	}
}

/// The directories to watch for a rebuild: every load path root, skipping
/// roots nested inside another watched root.
pub fn watch_locations(load_path: &LoadPath) -> Vec<PathBuf> {
	let roots: Vec<PathBuf> = load_path.iter().map(|root| root.path().to_path_buf()).collect();

	roots
		.iter()
		.filter(|root| {
			!roots
				.iter()
				.any(|other| other != *root && root.starts_with(other))
		})
		.cloned()
		.collect()
}
