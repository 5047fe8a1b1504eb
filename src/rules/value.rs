use log::warn;
use regex::{Regex, RegexBuilder};

/// Flags parsed from the letters after the closing slash of a pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternFlags {
	/// `i`
	pub case_insensitive: bool,

	/// `m`: `^` and `$` match at line boundaries.
	pub multi_line: bool,

	/// `s`: `.` also matches `\n`.
	pub dot_matches_new_line: bool,

	/// `a`: `\w`, `\d`, `\s` and `\b` only consider ASCII.
	pub ascii: bool,
}

impl PatternFlags {
	/// Read flags from a suffix. Unknown letters are ignored.
	pub fn from_letters(letters: &str) -> Self {
		PatternFlags {
			case_insensitive: letters.contains('i'),
			multi_line: letters.contains('m'),
			dot_matches_new_line: letters.contains('s'),
			ascii: letters.contains('a'),
		}
	}
}

/// A compiled `/body/flags` value.
#[derive(Debug, Clone)]
pub struct Pattern {
	pub regex: Regex,

	/// The body as written between the slashes.
	pub source: String,

	pub flags: PatternFlags,
}

/// The typed value of a rule sub-expression.
#[derive(Debug, Clone)]
pub enum Value {
	/// Quoted or bare text, matched case-insensitively.
	Literal(String),

	/// A compiled regular expression.
	Pattern(Pattern),
}

impl Value {
	/// Text to insert when this value is used as a replacement.
	pub fn as_replacement(&self) -> &str {
		match self {
			Value::Literal(text) => text,
			Value::Pattern(pattern) => &pattern.source,
		}
	}
}

/// Convert a trimmed sub-expression into a value.
///
/// Returns `None` for an empty string or for a pattern whose body does not
/// compile.
pub fn extract_value(text: &str) -> Option<Value> {
	let text = text.trim();
	if text.is_empty() {
		return None;
	}

	if let Some((body, letters)) = split_pattern(text) {
		let flags = PatternFlags::from_letters(letters);
		return match compile_pattern(body, flags) {
			Ok(regex) => Some(Value::Pattern(Pattern {
				regex,
				source: body.to_string(),
				flags,
			})),
			Err(e) => {
				warn!("Ignoring invalid pattern /{}/: {}", body, e);
				None
			}
		};
	}

	if text.starts_with('"') && text.ends_with('"') {
		let inner = if text.len() >= 2 {
			&text[1..text.len() - 1]
		} else {
			""
		};
		let decoded = unescape(inner).unwrap_or_else(|| inner.to_string());
		return Some(Value::Literal(decoded));
	}

	Some(Value::Literal(text.to_string()))
}

/// Split `/body/flags` at the first and last slash. The body must be non-empty.
fn split_pattern(text: &str) -> Option<(&str, &str)> {
	let rest = text.strip_prefix('/')?;
	let last = rest.rfind('/')?;
	if last == 0 {
		return None;
	}
	Some((&rest[..last], &rest[last + 1..]))
}

/// Compile a pattern body with the given flags.
pub fn compile_pattern(body: &str, flags: PatternFlags) -> Result<Regex, regex::Error> {
	let translated;
	let body = if flags.ascii {
		translated = ascii_classes(body);
		translated.as_str()
	} else {
		body
	};

	RegexBuilder::new(body)
		.case_insensitive(flags.case_insensitive)
		.multi_line(flags.multi_line)
		.dot_matches_new_line(flags.dot_matches_new_line)
		.build()
}

/// Rewrite the Perl shorthand classes to their ASCII-only equivalents.
///
/// Bracketed replacements are used so the same text works both inside and
/// outside a character class.
fn ascii_classes(body: &str) -> String {
	let mut out = String::with_capacity(body.len());
	let mut chars = body.chars().peekable();
	let mut in_class = false;

	while let Some(c) = chars.next() {
		match c {
			'\\' => {
				let Some(next) = chars.next() else {
					out.push(c);
					break;
				};
				match next {
					'd' => out.push_str("[0-9]"),
					'D' => out.push_str("[^0-9]"),
					'w' => out.push_str("[0-9A-Za-z_]"),
					'W' => out.push_str("[^0-9A-Za-z_]"),
					's' => out.push_str(r"[\t\n\x0B\x0C\r ]"),
					'S' => out.push_str(r"[^\t\n\x0B\x0C\r ]"),
					'b' if !in_class => out.push_str(r"(?-u:\b)"),
					'B' if !in_class => out.push_str(r"(?-u:\B)"),
					other => {
						out.push('\\');
						out.push(other);
					}
				}
			}
			'[' if !in_class => {
				in_class = true;
				out.push(c);
				if chars.peek() == Some(&'^') {
					out.push('^');
					chars.next();
				}
				// A leading `]` is a literal member of the class.
				if chars.peek() == Some(&']') {
					out.push(']');
					chars.next();
				}
			}
			']' if in_class => {
				in_class = false;
				out.push(c);
			}
			_ => out.push(c),
		}
	}

	out
}

/// Decode backslash escapes in a quoted literal.
///
/// Supports the single-character escapes plus `\ooo`, `\xHH`, `\uHHHH` and
/// `\UHHHHHHHH`. Unknown escapes are kept verbatim. Returns `None` for a
/// truncated or out-of-range escape, or a trailing backslash.
pub fn unescape(input: &str) -> Option<String> {
	let mut out = String::with_capacity(input.len());
	let mut chars = input.chars().peekable();

	while let Some(c) = chars.next() {
		if c != '\\' {
			out.push(c);
			continue;
		}

		let escaped = chars.next()?;
		match escaped {
			'\n' => {}
			'\\' => out.push('\\'),
			'\'' => out.push('\''),
			'"' => out.push('"'),
			'a' => out.push('\x07'),
			'b' => out.push('\x08'),
			'f' => out.push('\x0C'),
			'n' => out.push('\n'),
			'r' => out.push('\r'),
			't' => out.push('\t'),
			'v' => out.push('\x0B'),
			'0'..='7' => {
				let mut code = escaped.to_digit(8)?;
				for _ in 0..2 {
					match chars.peek().and_then(|d| d.to_digit(8)) {
						Some(digit) => {
							code = code * 8 + digit;
							chars.next();
						}
						None => break,
					}
				}
				out.push(char::from_u32(code)?);
			}
			'x' => out.push(hex_escape(&mut chars, 2)?),
			'u' => out.push(hex_escape(&mut chars, 4)?),
			'U' => out.push(hex_escape(&mut chars, 8)?),
			other => {
				out.push('\\');
				out.push(other);
			}
		}
	}

	Some(out)
}

fn hex_escape(chars: &mut impl Iterator<Item = char>, digits: usize) -> Option<char> {
	let mut code = 0u32;
	for _ in 0..digits {
		code = code * 16 + chars.next()?.to_digit(16)?;
	}
	char::from_u32(code)
}
