use std::collections::HashMap;

use serde_json::Value;

/// Constant name to value. Values may be nested mappings reachable through a
/// dotted accessor chain.
pub type ConstantsMapping = HashMap<String, Value>;

const PLACEHOLDER_OPEN: &str = "<%=";
const PLACEHOLDER_CLOSE: &str = "%>";

/// An interpolation expression that could not be evaluated. Carries the full
/// expression text, e.g. `VERSION.to_i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingConstant(pub String);

/// Replace every `<%= EXPR %>` placeholder in `line` with its value from
/// `constants`, strip trailing whitespace, and terminate the result with a
/// single `\n`.
///
/// Substituted values are not scanned again for placeholders.
#[allow(clippy::implicit_hasher)]
pub fn render(line: &str, constants: &ConstantsMapping) -> Result<String, MissingConstant> {
	let line = chomp(line);
	let mut result = String::with_capacity(line.len() + 1);
	let mut rest = line;

	while let Some(open) = rest.find(PLACEHOLDER_OPEN) {
		let after_open = &rest[open + PLACEHOLDER_OPEN.len()..];
		let Some(close) = after_open.find(PLACEHOLDER_CLOSE) else {
			break;
		};

		result.push_str(&rest[..open]);
		let expression = after_open[..close].trim();
		let value = evaluate(expression, constants)
			.ok_or_else(|| MissingConstant(expression.to_string()))?;
		result.push_str(&value);
		rest = &after_open[close + PLACEHOLDER_CLOSE.len()..];
	}

	result.push_str(rest);
	let trimmed_len = result.trim_end().len();
	result.truncate(trimmed_len);
	result.push('\n');

	Ok(result)
}

fn chomp(line: &str) -> &str {
	line.strip_suffix("\r\n")
		.or_else(|| line.strip_suffix('\n'))
		.or_else(|| line.strip_suffix('\r'))
		.unwrap_or(line)
}

/// Evaluate `NAME(.step)*` to the text that replaces the placeholder.
fn evaluate(expression: &str, constants: &ConstantsMapping) -> Option<String> {
	let mut steps = expression.split('.');
	let name = steps.next()?.trim();
	let mut value = constants.get(name)?.clone();

	for step in steps {
		value = project(&value, step.trim())?;
	}

	display(&value)
}

/// Apply one step of a dotted chain. Mapping keys and array indices take
/// precedence over named projections.
fn project(value: &Value, step: &str) -> Option<Value> {
	match value {
		Value::Object(map) if map.contains_key(step) => return map.get(step).cloned(),
		Value::Array(items) => {
			if let Ok(index) = step.parse::<usize>() {
				return items.get(index).cloned();
			}
		}
		_ => {}
	}

	Projection::from_name(step)?.apply(value)
}

fn display(value: &Value) -> Option<String> {
	match value {
		Value::Null => None,
		Value::String(text) => Some(text.clone()),
		Value::Number(number) => Some(number.to_string()),
		Value::Bool(flag) => Some(flag.to_string()),
		Value::Array(_) | Value::Object(_) => Some(value.to_string()),
	}
}

/// The closed set of read-only conversions available in a dotted chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
	/// `to_s` / `toString`
	ToString,
	/// `to_i` / `toInt`
	ToInteger,
	/// `to_f` / `toFloat`
	ToFloat,
	/// `inspect` / `quoted`
	Inspect,
	/// `upcase` / `toUpperCase`
	Upcase,
	/// `downcase` / `toLowerCase`
	Downcase,
	/// `strip` / `trim`
	Strip,
	/// `length` / `size`
	Length,
}

impl Projection {
	pub fn from_name(name: &str) -> Option<Self> {
		let projection = match name {
			"to_s" | "toString" => Self::ToString,
			"to_i" | "toInt" => Self::ToInteger,
			"to_f" | "toFloat" => Self::ToFloat,
			"inspect" | "quoted" => Self::Inspect,
			"upcase" | "toUpperCase" => Self::Upcase,
			"downcase" | "toLowerCase" => Self::Downcase,
			"strip" | "trim" => Self::Strip,
			"length" | "size" => Self::Length,
			_ => return None,
		};

		Some(projection)
	}

	/// Returns `None` when the projection does not apply to the value's kind.
	pub fn apply(self, value: &Value) -> Option<Value> {
		match self {
			Self::ToString => display(value).map(Value::String),
			Self::ToInteger => {
				match value {
					Value::String(text) => Some(Value::from(leading_integer(text))),
					Value::Number(number) => {
						number
							.as_i64()
							.or_else(|| number.as_f64().map(|float| float.trunc() as i64))
							.map(Value::from)
					}
					_ => None,
				}
			}
			Self::ToFloat => {
				let float = match value {
					Value::String(text) => leading_float(text),
					Value::Number(number) => number.as_f64()?,
					_ => return None,
				};
				serde_json::Number::from_f64(float).map(Value::Number)
			}
			Self::Inspect => {
				match value {
					Value::String(text) => serde_json::to_string(text).ok().map(Value::String),
					Value::Null => None,
					other => Some(Value::String(other.to_string())),
				}
			}
			Self::Upcase => value.as_str().map(|text| Value::from(text.to_uppercase())),
			Self::Downcase => value.as_str().map(|text| Value::from(text.to_lowercase())),
			Self::Strip => value.as_str().map(|text| Value::from(text.trim())),
			Self::Length => {
				match value {
					Value::String(text) => Some(Value::from(text.chars().count())),
					Value::Array(items) => Some(Value::from(items.len())),
					Value::Object(map) => Some(Value::from(map.len())),
					_ => None,
				}
			}
		}
	}
}

/// Parse the integer at the start of `text`, ignoring leading whitespace and
/// anything after the digits. Text without leading digits is `0`.
fn leading_integer(text: &str) -> i64 {
	let text = text.trim_start();
	let digits_start = usize::from(text.starts_with(['-', '+']));
	let digits_len = text[digits_start..]
		.bytes()
		.take_while(u8::is_ascii_digit)
		.count();

	text[..digits_start + digits_len].parse().unwrap_or(0)
}

/// Parse the longest float literal at the start of `text`, or `0.0`.
fn leading_float(text: &str) -> f64 {
	let text = text.trim_start();
	let candidate_len = text
		.bytes()
		.take_while(|byte| byte.is_ascii_digit() || matches!(byte, b'-' | b'+' | b'.' | b'e' | b'E'))
		.count();

	(1..=candidate_len)
		.rev()
		.find_map(|len| text[..len].parse::<f64>().ok())
		.unwrap_or(0.0)
}
