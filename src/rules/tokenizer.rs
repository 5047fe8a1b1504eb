use regex::Regex;
use std::sync::LazyLock;

/// Quoted strings, slash patterns with trailing flags, bare words, whitespace runs.
/// Alternatives are tried in that order at every position.
static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#""(?:\\.|[^"])*"|/(?:\\.|[^/])*/[imsayg]*|[^"/\s]+|\s+"#)
		.expect("Invalid regex pattern")
});

/// The lexical class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
	/// `"..."` with backslash escapes.
	Quoted,

	/// `/.../flags`.
	Pattern,

	/// A run of characters that are neither quotes, slashes nor whitespace.
	Word,

	/// A run of whitespace.
	Whitespace,

	/// A single `"` or `/` that does not open a complete quoted or pattern token.
	Stray,
}

/// A contiguous slice of a rule line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
	pub kind: TokenKind,
	pub text: &'a str,
}

impl<'a> Token<'a> {
	fn new(text: &'a str) -> Self {
		let kind = match text.chars().next() {
			Some('"') => TokenKind::Quoted,
			Some('/') => TokenKind::Pattern,
			Some(c) if c.is_whitespace() => TokenKind::Whitespace,
			_ => TokenKind::Word,
		};
		Token { kind, text }
	}

	/// Whether this token is the standalone keyword or separator `word`.
	///
	/// Only bare words qualify; `"WHEN"` or `/=>/` never do.
	pub fn is(&self, word: &str) -> bool {
		self.kind == TokenKind::Word && self.text == word
	}
}

/// Split a line into tokens.
///
/// Concatenating the returned tokens reproduces `line` exactly: characters the
/// token pattern cannot start on are emitted one at a time as `Stray` tokens.
pub fn tokenize(line: &str) -> Vec<Token<'_>> {
	let mut tokens = Vec::new();
	let mut pos = 0;

	for m in TOKEN_PATTERN.find_iter(line) {
		push_stray(&mut tokens, &line[pos..m.start()]);
		tokens.push(Token::new(m.as_str()));
		pos = m.end();
	}
	push_stray(&mut tokens, &line[pos..]);

	tokens
}

fn push_stray<'a>(tokens: &mut Vec<Token<'a>>, gap: &'a str) {
	for (i, c) in gap.char_indices() {
		tokens.push(Token {
			kind: TokenKind::Stray,
			text: &gap[i..i + c.len_utf8()],
		});
	}
}

/// Concatenate tokens back into a string and trim the result.
pub fn join_trimmed(tokens: &[Token<'_>]) -> String {
	tokens
		.iter()
		.map(|t| t.text)
		.collect::<String>()
		.trim()
		.to_string()
}

/// Index of the last token equal to `word`, scanning right to left.
pub fn rfind(tokens: &[Token<'_>], word: &str) -> Option<usize> {
	tokens.iter().rposition(|t| t.is(word))
}
