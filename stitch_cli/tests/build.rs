mod common;

use clap::Parser;
use predicates::prelude::PredicateBooleanExt;
use stitch_cli::Commands;
use stitch_cli::StitchCli;
use stitch_core::AnyEmptyResult;

const CONFIG: &str = "load_path = [\"vendor\", \"src\"]\nsource_files = [\"application\"]\noutput = \
                      \"dist/application.js\"\n\n[constants]\nVERSION = \"1.6.0\"\n";

fn write_project(root: &std::path::Path) -> std::io::Result<()> {
	common::write_files(
		root,
		&[
			("stitch.toml", CONFIG),
			(
				"src/application.js",
				"//= require <prototype>\n// application entry\nvar app = new Prototype();\n",
			),
			(
				"vendor/prototype.js",
				"/**\n * Prototype\n **/\nvar Prototype = function() {};\nPrototype.Version = \
				 '<%= VERSION %>';\n",
			),
		],
	)
}

#[test]
fn build_writes_configured_output() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_project(tmp.path())?;

	common::stitch_cmd()
		.arg("build")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stderr(predicates::str::contains("Stitched 2 file(s) into dist/application.js"));

	let output = std::fs::read_to_string(tmp.path().join("dist/application.js"))?;
	similar_asserts::assert_eq!(
		output,
		"var Prototype = function() {};\nPrototype.Version = '1.6.0';\nvar app = new Prototype();\n"
	);

	Ok(())
}

#[test]
fn build_is_a_noop_when_output_is_current() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_project(tmp.path())?;

	common::stitch_cmd()
		.arg("build")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	common::stitch_cmd()
		.arg("build")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stderr(predicates::str::contains("already up to date"));

	Ok(())
}

#[test]
fn build_prints_to_stdout_without_output() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_files(
		tmp.path(),
		&[
			("src/application.js", "//= require \"util\"\napp();\n"),
			("src/util.js", "util();\n"),
		],
	)?;

	common::stitch_cmd()
		.arg("build")
		.arg("application")
		.arg("--load-path")
		.arg("src")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("util();\napp();\n");

	Ok(())
}

#[test]
fn build_output_flag_overrides_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_project(tmp.path())?;
	let output = tmp.path().join("custom/out.js");

	common::stitch_cmd()
		.arg("build")
		.arg("--output")
		.arg(&output)
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	assert!(output.is_file());
	assert!(!tmp.path().join("dist/application.js").exists());

	Ok(())
}

#[test]
fn build_keeps_comments_when_asked() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_project(tmp.path())?;

	common::stitch_cmd()
		.arg("build")
		.arg("--no-strip-comments")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	let output = std::fs::read_to_string(tmp.path().join("dist/application.js"))?;
	assert!(output.starts_with("/**\n * Prototype\n **/\n"));
	assert!(output.contains("// application entry\n"));
	assert!(!output.contains("//= require"));

	Ok(())
}

#[test]
fn build_reports_missing_files() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_files(tmp.path(), &[("application.js", "//= require <missing>\n")])?;

	common::stitch_cmd()
		.arg("build")
		.arg("application")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("can't find file for").and(predicates::str::contains("<missing>")));

	Ok(())
}

#[test]
fn build_reports_undefined_constants() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_files(tmp.path(), &[("application.js", "var v = '<%= VERSION %>';\n")])?;

	common::stitch_cmd()
		.arg("build")
		.arg("application")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("couldn't find constant `VERSION`"));

	Ok(())
}

#[test]
fn build_fails_on_cycles_when_asked() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_files(
		tmp.path(),
		&[
			("a.js", "//= require \"b\"\na();\n"),
			("b.js", "//= require \"a\"\nb();\n"),
		],
	)?;

	common::stitch_cmd()
		.arg("build")
		.arg("a")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("b();\na();\n");

	common::stitch_cmd()
		.arg("build")
		.arg("a")
		.arg("--cycles")
		.arg("fail")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("circular require detected"));

	Ok(())
}

#[test]
fn build_without_source_files_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::stitch_cmd()
		.arg("build")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("no source files to build"));

	Ok(())
}

#[test]
fn build_warns_about_malformed_constants() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_files(
		tmp.path(),
		&[
			("constants.yml", "- not\n- a mapping\n"),
			("application.js", "app();\n"),
		],
	)?;

	common::stitch_cmd()
		.arg("build")
		.arg("application")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("app();\n")
		.stderr(predicates::str::contains("failed to load constants"));

	Ok(())
}

#[test]
fn build_watch_flag_parses() {
	let cli = StitchCli::parse_from(["stitch", "build", "--watch", "application", "-o", "out.js"]);
	match cli.command {
		Some(Commands::Build {
			entries,
			output,
			watch,
		}) => {
			assert!(watch);
			assert_eq!(entries, vec!["application".to_string()]);
			assert_eq!(output, Some(std::path::PathBuf::from("out.js")));
		}
		_ => panic!("expected Build command"),
	}

	let cli = StitchCli::parse_from(["stitch", "build"]);
	match cli.command {
		Some(Commands::Build { watch, entries, .. }) => {
			assert!(!watch);
			assert!(entries.is_empty());
		}
		_ => panic!("expected Build command"),
	}
}
