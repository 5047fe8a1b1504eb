use crate::config::types::Settings;
use crate::error::{ReplacerError, Result};
use log::warn;
use serde_json::{Map, Value};
use std::path::Path;

/// Parse a settings file from the given path.
pub fn parse_settings_file(path: &Path) -> Result<Settings> {
	let content = std::fs::read_to_string(path).map_err(|source| ReplacerError::SettingsRead {
		path: path.to_path_buf(),
		source,
	})?;

	parse_settings_str(&content, path)
}

/// Parse settings from a string (useful for testing).
///
/// The top level must be a JSON object. Each key is read on its own: a key that
/// is missing or has the wrong type takes its default without affecting the rest.
pub fn parse_settings_str(content: &str, path: &Path) -> Result<Settings> {
	let value: Value =
		serde_json::from_str(content).map_err(|source| ReplacerError::SettingsParse {
			path: path.to_path_buf(),
			source,
		})?;

	let Value::Object(obj) = value else {
		return Err(ReplacerError::SettingsNotObject {
			path: path.to_path_buf(),
		});
	};

	let defaults = Settings::default();
	Ok(Settings {
		enabled: read_key(&obj, "enabled", Value::as_bool).unwrap_or(defaults.enabled),
		rules: read_key(&obj, "rules", Value::as_str)
			.map(str::to_string)
			.unwrap_or(defaults.rules),
		save_txt: read_key(&obj, "save_txt", Value::as_bool).unwrap_or(defaults.save_txt),
	})
}

fn read_key<'a, T>(
	obj: &'a Map<String, Value>,
	key: &str,
	get: impl Fn(&'a Value) -> Option<T>,
) -> Option<T> {
	let value = obj.get(key)?;
	let read = get(value);
	if read.is_none() {
		warn!("Ignoring settings key `{}` with unexpected value {}", key, value);
	}
	read
}

/// Render settings as four-space indented JSON.
pub fn settings_to_string(settings: &Settings) -> Result<String> {
	let mut buf = Vec::new();
	let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
	let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
	serde::Serialize::serialize(settings, &mut ser).map_err(ReplacerError::SettingsSerialize)?;

	// serde_json only ever writes valid UTF-8.
	Ok(String::from_utf8_lossy(&buf).into_owned())
}
