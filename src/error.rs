use std::path::PathBuf;

/// Library-level structured errors for prompt-replacer.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
///
/// Nothing in the rule engine itself returns these: malformed rules degrade to
/// no-ops. Only the settings store, the change log and batch assembly fail.
#[derive(Debug, thiserror::Error)]
pub enum ReplacerError {
	#[error("Failed to read settings file: {path}")]
	SettingsRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse settings file: {path}")]
	SettingsParse {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	#[error("Settings file is not a JSON object: {path}")]
	SettingsNotObject { path: PathBuf },

	#[error("Failed to write settings file: {path}")]
	SettingsWrite {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to serialize settings")]
	SettingsSerialize(#[source] serde_json::Error),

	#[error("Failed to write change log: {path}")]
	LogWrite {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Batch has {prompts} positive prompts but {negatives} negative prompts")]
	BatchMismatch { prompts: usize, negatives: usize },

	#[error("Failed to resolve configuration directory")]
	ConfigDirNotFound,
}

/// Result type alias using ReplacerError.
pub type Result<T> = std::result::Result<T, ReplacerError>;
