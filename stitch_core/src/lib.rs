//! `stitch_core` is the core library for the stitch source concatenator. It
//! reads build directives embedded in `//` comments, resolves them against a
//! prioritized load path, and produces a single ordered concatenation where
//! every file appears once, after everything it requires.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Entry reference
//!   → Session (finds the entry on the load path)
//!   → LineClassifier (comment state + directive for every line)
//!   → Directive grammar (require / provide / provide … as …)
//!   → Session (visits requires depth-first, registers provided aliases)
//!   → Interpolator (substitutes <%= CONSTANT %> placeholders)
//!   → Concatenation (joins rendered files in dependency order)
//! ```
//!
//! ## Directives
//!
//! ```js
//! //= require "relative/to/this/file"
//! //= require <searched/on/the/load/path>
//! //= provide "../assets"
//! //= provide "../assets/stylesheets" as "stylesheets"
//! ```
//!
//! Required paths without an extension get the configured default extension
//! (`js`). Quoted requires are looked up next to the requiring file before
//! the load path is searched.
//!
//! ## Constants
//!
//! `<%= VERSION %>` is replaced with the `VERSION` constant. Constants come
//! from a `constants.yml` mapping under any load location and from the
//! `[constants]` table of `stitch.toml`, which wins on conflicts. A dotted
//! chain such as `<%= VERSION.to_i %>` applies a projection or reads a nested
//! key. An undefined constant aborts the build.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stitch_core::Environment;
//! use stitch_core::concatenate;
//!
//! let environment = Environment::new(".")
//! 	.unwrap()
//! 	.with_load_path(["vendor", "src"]);
//! let result = environment.resolve("application").unwrap();
//!
//! for file in result.files() {
//! 	eprintln!("{file}");
//! }
//! print!("{}", concatenate(&result));
//! ```

pub use alias::*;
pub use concatenation::*;
pub use config::*;
pub use constants::*;
pub use directive::*;
pub use environment::*;
pub use error::*;
pub use fs::*;
pub use interpolate::*;
pub use line::*;
pub use load_path::*;
pub use project::*;
pub use resolver::*;
pub use source::*;

mod alias;
mod concatenation;
pub mod config;
mod constants;
mod directive;
mod environment;
#[allow(unused_assignments)]
mod error;
pub mod fs;
mod interpolate;
mod line;
mod load_path;
pub mod project;
mod resolver;
mod source;

#[cfg(test)]
mod __fixtures;
