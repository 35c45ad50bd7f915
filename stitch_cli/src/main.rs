use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::mpsc;
use std::time::Duration;

use clap::Parser;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use stitch_cli::Commands;
use stitch_cli::OutputFormat;
use stitch_cli::StitchCli;
use stitch_cli::watch_locations;
use stitch_core::AnyResult;
use stitch_core::ResolutionResult;
use stitch_core::StitchConfig;
use stitch_core::concatenate;
use stitch_core::project::ProjectContext;
use stitch_core::write_concatenation;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = StitchCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(args.verbose, use_color);

	let result = match &args.command {
		Some(Commands::Init) => run_init(&args),
		Some(Commands::Build {
			entries,
			output,
			watch,
		}) => run_build(&args, entries, output.as_deref(), *watch),
		Some(Commands::List { entries, format }) => run_list(&args, entries, *format),
		Some(Commands::Check {
			entries,
			output,
			diff,
		}) => {
			match run_check(&args, entries, output.as_deref(), *diff) {
				Ok(true) => process::exit(1),
				other => other.map(|_| ()),
			}
		}
		None => {
			eprintln!("No subcommand specified. Run `stitch --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<stitch_core::StitchError>() {
			Ok(stitch_err) => {
				let report: miette::Report = (*stitch_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Log to stderr. `STITCH_LOG` takes an `EnvFilter` directive and overrides
/// the level implied by `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_env("STITCH_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.without_time()
		.init();
}

fn resolve_root(args: &StitchCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Load the project config, apply the command-line overrides and build the
/// context. A relative `output` is taken relative to the working directory.
fn load_context(
	args: &StitchCli,
	entries: &[String],
	output: Option<&Path>,
) -> AnyResult<ProjectContext> {
	let root = resolve_root(args);
	let mut config = StitchConfig::load(&root)?.unwrap_or_default();
	args.apply_overrides(&mut config, entries);

	let mut ctx = ProjectContext::from_config(&root, &config)?;
	if let Some(output) = output {
		ctx.output = Some(std::path::absolute(output)?);
	}

	if args.verbose {
		if let Some(config_path) = &ctx.config_path {
			eprintln!("Loaded config: {}", config_path.display());
		}
		eprintln!("Load path:");
		for location in ctx.environment.load_path().iter() {
			eprintln!("  {location}");
		}
	}

	Ok(ctx)
}

fn run_init(args: &StitchCli) -> AnyResult<()> {
	let root = resolve_root(args);
	let config_path = root.join("stitch.toml");

	if let Some(existing) = StitchConfig::resolve_path(&root) {
		println!("Config file already exists: {}", existing.display());
		return Ok(());
	}

	let sample_config = "# stitch configuration\n\n# Locations searched for required files, \
	                     lowest priority first.\nload_path = [\"vendor\", \"src\"]\n\n# Entry \
	                     files, concatenated in order.\nsource_files = [\"application\"]\n\n# \
	                     Where `stitch build` writes the result.\noutput = \
	                     \"dist/application.js\"\n\n# Drop `//` and `/** **/` comments from the \
	                     output.\nstrip_comments = true\n\n# Constants for `<%= NAME %>` \
	                     placeholders. These override any constants.yml on the load \
	                     path.\n[constants]\n# VERSION = \"1.0.0\"\n";

	std::fs::write(&config_path, sample_config)?;
	println!("Created {}", config_path.display());
	println!();
	println!("Next steps:");
	println!("  1. Add directives to your entry file:");
	println!("     //= require <library>");
	println!("     //= require \"relative/to/this/file\"");
	println!("  2. Run `stitch build` to write the concatenation");

	Ok(())
}

fn run_build(
	args: &StitchCli,
	entries: &[String],
	output: Option<&Path>,
	watch: bool,
) -> AnyResult<()> {
	run_build_once(args, entries, output)?;

	if !watch {
		return Ok(());
	}

	// Watch mode
	eprintln!("\nWatching for file changes... (press Ctrl+C to stop)");

	let ctx = load_context(args, entries, output)?;
	let (tx, rx) = mpsc::channel();

	let mut watcher =
		notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
			if let Ok(event) = res {
				if matches!(
					event.kind,
					notify::EventKind::Modify(_) | notify::EventKind::Create(_)
				) {
					tracing::debug!(paths = ?event.paths, "file change");
					let _ = tx.send(());
				}
			}
		})?;

	use notify::Watcher;
	for location in watch_locations(ctx.environment.load_path()) {
		if !location.is_dir() {
			tracing::warn!(location = %location.display(), "not watching missing load location");
			continue;
		}
		tracing::debug!(location = %location.display(), "watching");
		watcher.watch(&location, notify::RecursiveMode::Recursive)?;
	}

	loop {
		rx.recv()?;
		// Debounce: drain additional events within 200ms.
		while rx.recv_timeout(Duration::from_millis(200)).is_ok() {}

		// An unchanged output is not rewritten, so rebuilding here does not
		// trigger another round.
		eprintln!("\nFile change detected, rebuilding...");
		tracing::debug!("rebuilding after file change");
		if let Err(e) = run_build_once(args, entries, output) {
			eprintln!("{} {e}", colored!("error:", red));
		}
	}
}

fn run_build_once(args: &StitchCli, entries: &[String], output: Option<&Path>) -> AnyResult<()> {
	let ctx = load_context(args, entries, output)?;
	let root = ctx.environment.root().path();
	let result = ctx.resolve()?;

	if args.verbose {
		print_files(&result, root);
	}

	let Some(output) = &ctx.output else {
		print!("{}", concatenate(&result));
		return Ok(());
	};

	let rel = make_relative(output, root);
	if write_concatenation(output, &result)? {
		eprintln!(
			"{} {} file(s) into {rel}",
			colored!("Stitched", green),
			result.len()
		);
	} else {
		eprintln!("{rel} is already up to date.");
	}

	Ok(())
}

fn run_list(args: &StitchCli, entries: &[String], format: OutputFormat) -> AnyResult<()> {
	let ctx = load_context(args, entries, None)?;
	let root = ctx.environment.root().path();
	let result = ctx.resolve()?;

	match format {
		OutputFormat::Json => {
			let files: Vec<String> = result
				.paths()
				.into_iter()
				.map(|path| make_relative(path, root))
				.collect();
			let provided: Vec<serde_json::Value> = result
				.provided()
				.iter()
				.map(|asset| {
					serde_json::json!({
						"path": make_relative(&asset.path, root),
						"alias": asset.alias,
						"declared_in": make_relative(&asset.declared_in, root),
						"line": asset.line,
					})
				})
				.collect();
			let output = serde_json::json!({
				"files": files,
				"provided": provided,
			});
			println!("{output}");
		}
		OutputFormat::Text => {
			println!("{}", colored!("Files:", bold));
			for path in result.paths() {
				println!("  {}", make_relative(path, root));
			}

			if !result.provided().is_empty() {
				println!();
				println!("{}", colored!("Provided:", bold));
				for asset in result.provided() {
					let alias = asset
						.alias
						.as_ref()
						.map(|alias| format!(" as {alias}"))
						.unwrap_or_default();
					println!(
						"  {}{alias} ({}:{})",
						make_relative(&asset.path, root),
						make_relative(&asset.declared_in, root),
						asset.line
					);
				}
			}

			println!(
				"\n{} file(s), {} provided asset(s)",
				result.len(),
				result.provided().len()
			);
		}
	}

	Ok(())
}

/// Run a single check and return whether the output is stale (true = stale).
fn run_check(
	args: &StitchCli,
	entries: &[String],
	output: Option<&Path>,
	show_diff: bool,
) -> AnyResult<bool> {
	let ctx = load_context(args, entries, output)?;
	let root = ctx.environment.root().path();
	let output = ctx
		.output
		.as_ref()
		.ok_or("no output file to check; set `output` in stitch.toml or pass --output")?;
	let result = ctx.resolve()?;

	let expected = concatenate(&result);
	let rel = make_relative(output, root);
	let current = match std::fs::read_to_string(output) {
		Ok(current) => current,
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
			eprintln!("Check failed: {rel} does not exist.");
			eprintln!("\nRun `stitch build` to create it.");
			return Ok(true);
		}
		Err(e) => return Err(e.into()),
	};

	if current == expected {
		println!("Check passed: {rel} is up to date.");
		return Ok(false);
	}

	eprintln!("Check failed: {rel} is out of date.");
	if show_diff {
		eprintln!();
		print_diff(&current, &expected);
	}
	eprintln!("\nRun `stitch build` to update it.");

	Ok(true)
}

fn print_files(result: &ResolutionResult, root: &Path) {
	eprintln!("Resolved {} file(s):", result.len());
	for path in result.paths() {
		eprintln!("  {}", make_relative(path, root));
	}
}

fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
	}
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
