//! Change log for rewritten prompt pairs.
//!
//! Each changed pair of a batch is written to its own file,
//! `<YYYYMMDD_HHMMSS>_<index>.txt`, with one timestamp shared by the batch.

use crate::error::{ReplacerError, Result};
use crate::rules::PromptPair;
use chrono::{DateTime, Local};
use log::debug;
use std::path::PathBuf;

/// `strftime` format of the file-name timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

const SECTION_GAP: &str = "\n\n\n\n\n";

/// Writes change-log entries into a directory.
#[derive(Debug, Clone)]
pub struct ChangeLog {
	dir: PathBuf,
	timestamp: String,
}

impl ChangeLog {
	/// A log for one batch, stamped with the current local time.
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self::with_time(dir, Local::now())
	}

	pub fn with_time(dir: impl Into<PathBuf>, time: DateTime<Local>) -> Self {
		ChangeLog {
			dir: dir.into(),
			timestamp: time.format(TIMESTAMP_FORMAT).to_string(),
		}
	}

	pub fn timestamp(&self) -> &str {
		&self.timestamp
	}

	/// Path of the entry for the pair at `index`.
	pub fn entry_path(&self, index: usize) -> PathBuf {
		self.dir.join(format!("{}_{}.txt", self.timestamp, index))
	}

	/// Write the entry for the pair at `index`, creating the directory if needed.
	pub fn write_entry(
		&self,
		index: usize,
		original: &PromptPair,
		edited: &PromptPair,
	) -> Result<PathBuf> {
		let path = self.entry_path(index);

		std::fs::create_dir_all(&self.dir).map_err(|source| ReplacerError::LogWrite {
			path: self.dir.clone(),
			source,
		})?;
		std::fs::write(&path, format_entry(original, edited)).map_err(|source| {
			ReplacerError::LogWrite {
				path: path.clone(),
				source,
			}
		})?;

		debug!("Wrote change log {}", path.display());
		Ok(path)
	}
}

/// Render the four sections of an entry.
pub fn format_entry(original: &PromptPair, edited: &PromptPair) -> String {
	let sections = [
		("ORIGINAL POSITIVE", &original.positive),
		("EDITED POSITIVE", &edited.positive),
		("ORIGINAL NEGATIVE", &original.negative),
		("EDITED NEGATIVE", &edited.negative),
	];

	sections
		.iter()
		.map(|(title, text)| format!("##### {title} #####\n\n{text}"))
		.collect::<Vec<_>>()
		.join(SECTION_GAP)
}
