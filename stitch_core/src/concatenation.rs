use std::path::Path;

use crate::StitchResult;
use crate::resolver::ResolutionResult;

/// Join the rendered lines of every resolved file in order.
pub fn concatenate(result: &ResolutionResult) -> String {
	let capacity = result
		.sources()
		.iter()
		.flat_map(|source| &source.rendered)
		.map(String::len)
		.sum();
	let mut output = String::with_capacity(capacity);

	for source in result.sources() {
		for line in &source.rendered {
			output.push_str(line);
		}
	}

	output
}

/// Write the concatenation to `path`, creating parent directories as needed.
/// Returns `false` without touching the file when it is already up to date.
pub fn write_concatenation(path: &Path, result: &ResolutionResult) -> StitchResult<bool> {
	let output = concatenate(result);
	if std::fs::read_to_string(path).is_ok_and(|current| current == output) {
		return Ok(false);
	}

	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)?;
	}
	std::fs::write(path, output)?;
	tracing::debug!(path = %path.display(), files = result.len(), "wrote concatenation");

	Ok(true)
}
