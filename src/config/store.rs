use crate::config::parser::{parse_settings_file, settings_to_string};
use crate::config::types::Settings;
use crate::error::{ReplacerError, Result};
use log::{debug, warn};
use std::path::{Path, PathBuf};

/// Directory name used under the platform configuration directory.
pub const APP_DIR_NAME: &str = "prompt-replacer";

/// File name of the settings file.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Directory name of the change log, next to the settings file.
pub const LOG_DIR_NAME: &str = "log";

/// Source and sink for persisted settings.
pub trait SettingsProvider {
	/// Load settings. Never fails: an unreadable file yields the defaults, and a
	/// key of the wrong type yields that key's default.
	fn load(&self) -> Settings;

	/// Persist settings.
	fn save(&self, settings: &Settings) -> Result<()>;
}

/// Settings stored as a JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
	path: PathBuf,
}

impl JsonSettingsStore {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		JsonSettingsStore { path: path.into() }
	}

	/// A store at the default settings location.
	pub fn at_default_location() -> Result<Self> {
		Ok(Self::new(default_settings_path()?))
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// The change-log directory that belongs to this settings file.
	pub fn log_dir(&self) -> PathBuf {
		log_dir_for(&self.path)
	}
}

impl SettingsProvider for JsonSettingsStore {
	fn load(&self) -> Settings {
		if !self.path.exists() {
			debug!(
				"No settings file at {}, using defaults",
				self.path.display()
			);
			return Settings::default();
		}

		match parse_settings_file(&self.path) {
			Ok(settings) => settings,
			Err(e) => {
				warn!("{}; using default settings", e);
				Settings::default()
			}
		}
	}

	fn save(&self, settings: &Settings) -> Result<()> {
		let content = settings_to_string(settings)?;

		if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
			std::fs::create_dir_all(parent).map_err(|source| ReplacerError::SettingsWrite {
				path: self.path.clone(),
				source,
			})?;
		}

		std::fs::write(&self.path, content).map_err(|source| ReplacerError::SettingsWrite {
			path: self.path.clone(),
			source,
		})?;

		debug!("Saved settings to {}", self.path.display());
		Ok(())
	}
}

/// Get the path to the default settings file.
pub fn default_settings_path() -> Result<PathBuf> {
	let config_dir = dirs::config_dir().ok_or(ReplacerError::ConfigDirNotFound)?;
	Ok(config_dir.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME))
}

/// The change-log directory next to a settings file.
pub fn log_dir_for(settings_path: &Path) -> PathBuf {
	settings_path
		.parent()
		.map(|dir| dir.join(LOG_DIR_NAME))
		.unwrap_or_else(|| PathBuf::from(LOG_DIR_NAME))
}
