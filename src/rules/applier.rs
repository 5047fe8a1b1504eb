use crate::rules::matcher::{CompiledRule, compile_rules};
use log::debug;

/// A positive/negative prompt pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptPair {
	pub positive: String,
	pub negative: String,
}

impl PromptPair {
	pub fn new(positive: impl Into<String>, negative: impl Into<String>) -> Self {
		PromptPair {
			positive: positive.into(),
			negative: negative.into(),
		}
	}
}

/// An ordered, compiled rule list.
///
/// Immutable once built, so one set can be applied to every pair of a batch.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
	rules: Vec<CompiledRule>,
}

impl RuleSet {
	/// Parse and compile a newline-delimited rule list. Unusable lines are dropped.
	pub fn parse(text: &str) -> Self {
		let rules = compile_rules(text);
		debug!("Compiled {} rule(s)", rules.len());
		RuleSet { rules }
	}

	pub fn len(&self) -> usize {
		self.rules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}

	/// Apply every rule in order to both prompts.
	///
	/// Line endings are normalized first. Conditions are checked against the
	/// normalized `positive + " " + negative` captured before any rule runs, while
	/// each rewrite sees the output of the rules before it.
	pub fn apply(&self, positive: &str, negative: &str) -> (String, String) {
		let mut pos = normalize_line_endings(positive);
		let mut neg = normalize_line_endings(negative);
		let combined = format!("{pos} {neg}");

		for (i, rule) in self.rules.iter().enumerate() {
			if !rule.condition_holds(&combined) {
				debug!("Rule {} skipped: condition not met", i + 1);
				continue;
			}
			pos = rule.rewrite(&pos);
			neg = rule.rewrite(&neg);
		}

		(pos, neg)
	}

	/// Apply the rules to a pair, returning the rewritten pair.
	pub fn apply_pair(&self, pair: &PromptPair) -> PromptPair {
		let (positive, negative) = self.apply(&pair.positive, &pair.negative);
		PromptPair { positive, negative }
	}
}

/// Rewrite a prompt pair with a rule list.
///
/// An empty rule list returns the inputs untouched.
pub fn apply(positive: &str, negative: &str, rules: &str) -> (String, String) {
	if rules.is_empty() {
		return (positive.to_string(), negative.to_string());
	}
	RuleSet::parse(rules).apply(positive, negative)
}

/// Convert `\r\n` and lone `\r` to `\n`.
pub fn normalize_line_endings(text: &str) -> String {
	text.replace("\r\n", "\n").replace('\r', "\n")
}
