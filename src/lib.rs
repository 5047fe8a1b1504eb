//! Prompt Replacer - rule-based conditional find/replace for prompt pairs.
//!
//! This library provides the core functionality for prompt-replacer, including:
//! - Rule-line tokenizing and parsing (`"find" => "replace" WHEN "condition"`)
//! - Literal and `/pattern/flags` matching with group-reference replacement
//! - Batch processing of positive/negative prompt pairs
//! - JSON settings persistence and the on-disk change log
//!
//! # Example
//!
//! ```
//! use prompt_replacer::rules::apply;
//!
//! let rules = r#"
//! ## swap the colour at night
//! "blue" => "red" WHEN "night"
//! /(\w+) cat/i => "$1 owl"
//! "#;
//!
//! let (positive, negative) = apply("a blue sky, black Cat", "night, blurry", rules);
//! assert_eq!(positive, "a red sky, black owl");
//! assert_eq!(negative, "night, blurry");
//! ```

pub mod batch;
pub mod changelog;
pub mod config;
pub mod error;
pub mod rules;

pub use error::{ReplacerError, Result};
