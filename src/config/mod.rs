//! Settings loading and persistence for prompt-replacer.
//!
//! This module handles:
//! - JSON settings parsing and rendering
//! - The settings store and its default locations

pub mod parser;
pub mod store;
pub mod types;

pub use parser::{parse_settings_file, parse_settings_str, settings_to_string};
pub use store::{
	JsonSettingsStore, SettingsProvider, default_settings_path, log_dir_for,
};
pub use types::Settings;
