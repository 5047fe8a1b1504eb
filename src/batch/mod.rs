//! Batch processing for prompt-replacer.
//!
//! This module handles:
//! - Applying the rule list to every index-aligned prompt pair of a batch
//! - Mirroring the first pair into the batch's scalar prompt fields
//! - Writing change-log entries for pairs that changed

use crate::changelog::ChangeLog;
use crate::config::Settings;
use crate::error::{ReplacerError, Result};
use crate::rules::{PromptPair, RuleSet};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A generation batch: one positive and one negative prompt per image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Batch {
	/// Representative positive prompt of the batch.
	pub prompt: String,

	/// Representative negative prompt of the batch.
	pub negative_prompt: String,

	pub all_prompts: Vec<String>,

	pub all_negative_prompts: Vec<String>,
}

impl Batch {
	/// Build a batch from index-aligned prompt lists.
	pub fn from_pairs(prompts: Vec<String>, negative_prompts: Vec<String>) -> Result<Self> {
		check_aligned(&prompts, &negative_prompts)?;
		Ok(Batch {
			prompt: prompts.first().cloned().unwrap_or_default(),
			negative_prompt: negative_prompts.first().cloned().unwrap_or_default(),
			all_prompts: prompts,
			all_negative_prompts: negative_prompts,
		})
	}

	/// A batch holding a single pair.
	pub fn single(prompt: impl Into<String>, negative_prompt: impl Into<String>) -> Self {
		let pair = PromptPair::new(prompt, negative_prompt);
		Batch {
			prompt: pair.positive.clone(),
			negative_prompt: pair.negative.clone(),
			all_prompts: vec![pair.positive],
			all_negative_prompts: vec![pair.negative],
		}
	}

	pub fn len(&self) -> usize {
		self.all_prompts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.all_prompts.is_empty()
	}

	/// The pair at `index`.
	pub fn pair(&self, index: usize) -> Option<PromptPair> {
		Some(PromptPair::new(
			self.all_prompts.get(index)?.as_str(),
			self.all_negative_prompts.get(index)?.as_str(),
		))
	}
}

fn check_aligned(prompts: &[String], negative_prompts: &[String]) -> Result<()> {
	if prompts.len() != negative_prompts.len() {
		return Err(ReplacerError::BatchMismatch {
			prompts: prompts.len(),
			negatives: negative_prompts.len(),
		});
	}
	Ok(())
}

/// What processing a batch did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
	/// False when the settings disabled processing.
	pub applied: bool,

	/// Indices of the pairs whose text changed.
	pub changed: Vec<usize>,

	/// Change-log files written.
	pub log_files: Vec<PathBuf>,
}

/// Apply the configured rules to every pair of `batch` in place.
///
/// Nothing happens when the settings are disabled or the rule list is blank.
/// With `save_txt` set, each changed pair gets a change-log entry in `log_dir`;
/// a failed write aborts before the batch is modified.
pub fn process_batch(batch: &mut Batch, settings: &Settings, log_dir: &Path) -> Result<BatchReport> {
	if !settings.is_active() {
		debug!("Prompt rules disabled or empty, batch left unchanged");
		return Ok(BatchReport::default());
	}
	check_aligned(&batch.all_prompts, &batch.all_negative_prompts)?;

	let rules = RuleSet::parse(&settings.rules);
	let mut edited = Vec::with_capacity(batch.len());
	let mut changed = Vec::new();

	for (i, (pos, neg)) in batch
		.all_prompts
		.iter()
		.zip(&batch.all_negative_prompts)
		.enumerate()
	{
		let (new_pos, new_neg) = rules.apply(pos, neg);
		if &new_pos != pos || &new_neg != neg {
			changed.push(i);
		}
		edited.push(PromptPair::new(new_pos, new_neg));
	}

	let mut log_files = Vec::new();
	if settings.save_txt && !changed.is_empty() {
		let log = ChangeLog::new(log_dir);
		for &i in &changed {
			let original = PromptPair::new(
				batch.all_prompts[i].as_str(),
				batch.all_negative_prompts[i].as_str(),
			);
			log_files.push(log.write_entry(i, &original, &edited[i])?);
		}
	}

	let (prompts, negatives): (Vec<_>, Vec<_>) = edited
		.into_iter()
		.map(|pair| (pair.positive, pair.negative))
		.unzip();
	batch.all_prompts = prompts;
	batch.all_negative_prompts = negatives;
	if let (Some(first), Some(first_neg)) =
		(batch.all_prompts.first(), batch.all_negative_prompts.first())
	{
		batch.prompt = first.clone();
		batch.negative_prompt = first_neg.clone();
	}

	info!(
		"Rewrote {} of {} prompt pair(s) with {} rule(s)",
		changed.len(),
		batch.len(),
		rules.len()
	);

	Ok(BatchReport {
		applied: true,
		changed,
		log_files,
	})
}
