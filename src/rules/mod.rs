//! Rule parsing and application for prompt-replacer.
//!
//! This module handles:
//! - Tokenizing rule lines and splitting them at `WHEN` and `=>`
//! - Typing sub-expressions as literals or compiled patterns
//! - Applying the compiled rule list to positive/negative prompt pairs

pub mod applier;
pub mod matcher;
pub mod parser;
pub mod tokenizer;
pub mod value;

pub use applier::{PromptPair, RuleSet, apply, normalize_line_endings};
pub use matcher::{CompiledRule, compile_rules, native_replacement};
pub use parser::{LineOutcome, Rule, RuleLine, SkipReason, parse_line, parse_rule_list};
pub use tokenizer::{Token, TokenKind, tokenize};
pub use value::{Pattern, PatternFlags, Value, extract_value};
