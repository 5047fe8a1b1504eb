use crate::rules::tokenizer::{join_trimmed, rfind, tokenize};
use crate::rules::value::{Value, extract_value};
use log::debug;
use std::fmt;

/// Separator between the target and the replacement.
pub const ARROW: &str = "=>";

/// Keyword introducing the condition clause.
pub const WHEN: &str = "WHEN";

/// A fully parsed rule line.
#[derive(Debug, Clone)]
pub struct Rule {
	/// What to look for.
	pub target: Value,

	/// What to put in its place. `None` means the empty string.
	pub replacement: Option<Value>,

	/// Text that must appear in the combined prompts for the rule to fire.
	pub condition: Option<Value>,
}

/// Why a line of the rule list did not produce a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
	/// Empty or whitespace only.
	Blank,

	/// Starts with `#`.
	Comment,

	/// No standalone `=>` token in the action part.
	NoSeparator,

	/// The target was empty or an invalid pattern.
	NoTarget,
}

impl fmt::Display for SkipReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let text = match self {
			SkipReason::Blank => "blank",
			SkipReason::Comment => "comment",
			SkipReason::NoSeparator => "missing `=>` separator",
			SkipReason::NoTarget => "no usable target",
		};
		f.write_str(text)
	}
}

/// The result of parsing one line of a rule list.
#[derive(Debug, Clone)]
pub enum LineOutcome {
	Parsed(Rule),
	Skipped(SkipReason),
}

/// One line of a rule list with its 1-based line number.
#[derive(Debug, Clone)]
pub struct RuleLine {
	pub number: usize,
	pub text: String,
	pub outcome: LineOutcome,
}

/// Parse a single rule line.
///
/// The condition is split off at the last standalone `WHEN`, then the action
/// part is re-tokenized and split at its last standalone `=>`.
pub fn parse_line(line: &str) -> std::result::Result<Rule, SkipReason> {
	let line = line.trim();
	if line.is_empty() {
		return Err(SkipReason::Blank);
	}
	if line.starts_with('#') {
		return Err(SkipReason::Comment);
	}
	if !line.contains(ARROW) {
		return Err(SkipReason::NoSeparator);
	}

	let tokens = tokenize(line);
	let (action, condition) = match rfind(&tokens, WHEN) {
		Some(w) => (
			join_trimmed(&tokens[..w]),
			Some(join_trimmed(&tokens[w + 1..])),
		),
		None => (line.to_string(), None),
	};

	let action_tokens = tokenize(&action);
	let arrow = rfind(&action_tokens, ARROW).ok_or(SkipReason::NoSeparator)?;
	let target = join_trimmed(&action_tokens[..arrow]);
	let replacement = join_trimmed(&action_tokens[arrow + 1..]);

	let condition = condition.as_deref().and_then(extract_value);
	let target = extract_value(&target).ok_or(SkipReason::NoTarget)?;
	let replacement = extract_value(&replacement);

	Ok(Rule {
		target,
		replacement,
		condition,
	})
}

/// Parse every line of a rule list, keeping the reason for skipped lines.
pub fn parse_rule_list(text: &str) -> Vec<RuleLine> {
	text.split('\n')
		.enumerate()
		.map(|(i, raw)| {
			let outcome = match parse_line(raw) {
				Ok(rule) => LineOutcome::Parsed(rule),
				Err(reason) => {
					if !matches!(reason, SkipReason::Blank | SkipReason::Comment) {
						debug!("Skipping rule line {}: {}", i + 1, reason);
					}
					LineOutcome::Skipped(reason)
				}
			};
			RuleLine {
				number: i + 1,
				text: raw.trim().to_string(),
				outcome,
			}
		})
		.collect()
}
