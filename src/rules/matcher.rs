use crate::rules::parser::{LineOutcome, Rule, parse_rule_list};
use crate::rules::value::Value;
use log::warn;
use regex::{Regex, RegexBuilder};

/// A rule with its literal target and condition compiled into matchers.
#[derive(Debug, Clone)]
pub struct CompiledRule {
	/// The parsed rule.
	pub rule: Rule,

	/// Matches the target. `None` when the rule can never match.
	target_regex: Option<Regex>,

	/// Matches the condition against the combined prompts.
	condition_regex: Option<Regex>,

	/// Replacement text, already in the regex crate's syntax for pattern targets.
	replacement: String,

	/// Whether group references in `replacement` are expanded.
	expand: bool,
}

impl CompiledRule {
	/// Compile a parsed rule.
	///
	/// Literal targets and conditions become escaped, case-insensitive regexes.
	/// Pattern targets keep their own flags and get their `$N` group references
	/// rewritten to the regex crate's syntax.
	pub fn from_rule(rule: Rule) -> Self {
		let raw_replacement = rule
			.replacement
			.as_ref()
			.map(Value::as_replacement)
			.unwrap_or_default();

		let (target_regex, replacement, expand) = match &rule.target {
			Value::Pattern(pattern) => (
				Some(pattern.regex.clone()),
				native_replacement(raw_replacement),
				true,
			),
			Value::Literal(text) => (literal_regex(text), raw_replacement.to_string(), false),
		};

		let condition_regex = match &rule.condition {
			Some(Value::Pattern(pattern)) => Some(pattern.regex.clone()),
			Some(Value::Literal(text)) => literal_regex(text),
			None => None,
		};

		CompiledRule {
			rule,
			target_regex,
			condition_regex,
			replacement,
			expand,
		}
	}

	/// Check the condition gate against the combined prompt text.
	pub fn condition_holds(&self, combined: &str) -> bool {
		match (&self.rule.condition, &self.condition_regex) {
			(None, _) => true,
			(Some(_), Some(regex)) => regex.is_match(combined),
			(Some(_), None) => false,
		}
	}

	/// Replace every match of the target in `text`.
	///
	/// An empty match directly after a non-empty one is replaced too, so
	/// `/x*/ => "-"` turns `abxd` into `-a-b--d-`. Only a second empty match at
	/// the same position is skipped.
	pub fn rewrite(&self, text: &str) -> String {
		let Some(regex) = &self.target_regex else {
			return text.to_string();
		};

		let mut out = String::with_capacity(text.len());
		let mut copied = 0;
		let mut pos = 0;
		let mut last_empty = None;

		while let Some(caps) = regex.captures_at(text, pos) {
			let Some(m) = caps.get(0) else { break };

			if m.is_empty() && last_empty == Some(m.start()) {
				match text[pos..].chars().next() {
					Some(c) => pos += c.len_utf8(),
					None => break,
				}
				continue;
			}

			out.push_str(&text[copied..m.start()]);
			if self.expand {
				caps.expand(&self.replacement, &mut out);
			} else {
				out.push_str(&self.replacement);
			}

			copied = m.end();
			pos = m.end();
			last_empty = m.is_empty().then_some(m.start());
		}

		out.push_str(&text[copied..]);
		out
	}
}

/// Build an escaped, case-insensitive matcher for literal text.
fn literal_regex(text: &str) -> Option<Regex> {
	RegexBuilder::new(&regex::escape(text))
		.case_insensitive(true)
		.build()
		.map_err(|e| warn!("Ignoring literal that cannot be matched: {}", e))
		.ok()
}

/// Rewrite `$`-style group references into the regex crate's replacement syntax.
///
/// `$1` to `$99` and `$g<name>` become `${1}` and `${name}` so that text directly
/// after the reference is never absorbed into the group name. `${name}` is kept.
/// `$$` is a single backslash. `$0` and three-digit octal runs such as `$101`
/// are octal character codes, so a bare `$0` is NUL. Any other `$` is a literal
/// dollar sign.
pub fn native_replacement(replacement: &str) -> String {
	let mut out = String::with_capacity(replacement.len() + 4);
	let mut rest = replacement;

	while let Some(pos) = rest.find('$') {
		out.push_str(&rest[..pos]);
		let after = &rest[pos + 1..];

		if let Some(tail) = after.strip_prefix('$') {
			out.push('\\');
			rest = tail;
			continue;
		}

		if let Some((c, len)) = octal_escape(after) {
			push_literal(&mut out, c);
			rest = &after[len..];
			continue;
		}

		let digits = after
			.bytes()
			.take(2)
			.take_while(u8::is_ascii_digit)
			.count();
		if digits > 0 {
			push_group(&mut out, &after[..digits]);
			rest = &after[digits..];
			continue;
		}

		let named = after
			.strip_prefix("g<")
			.and_then(|s| s.split_once('>'))
			.or_else(|| after.strip_prefix('{').and_then(|s| s.split_once('}')))
			.filter(|(name, _)| is_group_name(name));
		if let Some((name, tail)) = named {
			push_group(&mut out, name);
			rest = tail;
			continue;
		}

		out.push_str("$$");
		rest = after;
	}

	out.push_str(rest);
	out
}

/// Decode a leading octal character code: `0` plus up to two more octal digits,
/// or exactly three octal digits not starting with `0`. Returns the character
/// and the number of bytes consumed.
fn octal_escape(text: &str) -> Option<(char, usize)> {
	let octal = text
		.bytes()
		.take(3)
		.take_while(|b| (b'0'..=b'7').contains(b))
		.count();

	let len = match text.as_bytes().first() {
		Some(b'0') => octal,
		Some(_) if octal == 3 => 3,
		_ => return None,
	};

	let code = u32::from_str_radix(&text[..len], 8).ok()?;
	if code > 0o377 {
		return None;
	}
	char::from_u32(code).map(|c| (c, len))
}

fn push_literal(out: &mut String, c: char) {
	if c == '$' {
		out.push_str("$$");
	} else {
		out.push(c);
	}
}

fn push_group(out: &mut String, name: &str) {
	out.push_str("${");
	out.push_str(name);
	out.push('}');
}

fn is_group_name(name: &str) -> bool {
	!name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parse and compile every usable rule in a rule list, in file order.
pub fn compile_rules(text: &str) -> Vec<CompiledRule> {
	parse_rule_list(text)
		.into_iter()
		.filter_map(|line| match line.outcome {
			LineOutcome::Parsed(rule) => Some(CompiledRule::from_rule(rule)),
			LineOutcome::Skipped(_) => None,
		})
		.collect()
}
