use serde::{Deserialize, Serialize};

/// Persisted settings, stored as a JSON object.
///
/// Missing keys take their defaults, so `{}` is a valid settings file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
	/// Whether rules are applied at all.
	pub enabled: bool,

	/// The newline-delimited rule list.
	pub rules: String,

	/// Whether changed pairs are written to the change log.
	pub save_txt: bool,
}

impl Default for Settings {
	fn default() -> Self {
		Settings {
			enabled: true,
			rules: String::new(),
			save_txt: false,
		}
	}
}

impl Settings {
	/// Whether a batch should be processed with these settings.
	pub fn is_active(&self) -> bool {
		self.enabled && !self.rules.trim().is_empty()
	}
}
