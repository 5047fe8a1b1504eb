#![allow(deprecated)] // assert_cmd::Command::cargo_bin is deprecated but replacement requires nightly

use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn replacer_cmd(settings: &Path) -> assert_cmd::Command {
	let mut cmd = assert_cmd::Command::cargo_bin("prompt-replacer").unwrap();
	cmd.arg("--settings").arg(settings);
	cmd
}

fn output_json(output: &[u8]) -> serde_json::Value {
	serde_json::from_slice(output).unwrap()
}

// ============================================================================
// CLI flag tests
// ============================================================================

#[test]
fn test_help_flag() {
	assert_cmd::Command::cargo_bin("prompt-replacer")
		.unwrap()
		.arg("--help")
		.assert()
		.success()
		.stdout(predicate::str::contains("Rule-based conditional find/replace"));
}

#[test]
fn test_version_flag() {
	assert_cmd::Command::cargo_bin("prompt-replacer")
		.unwrap()
		.arg("--version")
		.assert()
		.success()
		.stdout(predicate::str::contains("prompt-replacer"));
}

#[test]
fn test_no_args_shows_help() {
	assert_cmd::Command::cargo_bin("prompt-replacer")
		.unwrap()
		.assert()
		.failure()
		.stderr(predicate::str::contains("Usage"));
}

// ============================================================================
// config subcommand tests
// ============================================================================

#[test]
fn test_config_show_defaults_without_file() {
	let temp_dir = tempfile::tempdir().unwrap();
	let settings = temp_dir.path().join("settings.json");

	replacer_cmd(&settings)
		.args(["config", "show"])
		.assert()
		.success()
		.stdout(predicate::str::contains("\"enabled\": true"))
		.stdout(predicate::str::contains("\"save_txt\": false"));
}

#[test]
fn test_config_show_corrupt_file_uses_defaults() {
	let temp_dir = tempfile::tempdir().unwrap();
	let settings = temp_dir.path().join("settings.json");
	fs::write(&settings, "not json at all").unwrap();

	replacer_cmd(&settings)
		.args(["config", "show"])
		.assert()
		.success()
		.stdout(predicate::str::contains("\"enabled\": true"));
}

#[test]
fn test_config_set_round_trip() {
	let temp_dir = tempfile::tempdir().unwrap();
	let settings = temp_dir.path().join("conf/settings.json");

	replacer_cmd(&settings)
		.args([
			"config", "set", "--enabled", "false", "--rules", "a=>b", "--save-txt", "true",
		])
		.assert()
		.success()
		.stdout(predicate::str::contains("Saved settings"));

	let stored: serde_json::Value =
		serde_json::from_str(&fs::read_to_string(&settings).unwrap()).unwrap();
	assert_eq!(stored["enabled"], false);
	assert_eq!(stored["rules"], "a=>b");
	assert_eq!(stored["save_txt"], true);

	// Partial updates keep the other fields.
	replacer_cmd(&settings)
		.args(["config", "set", "--enabled", "true"])
		.assert()
		.success();

	replacer_cmd(&settings)
		.args(["config", "show"])
		.assert()
		.success()
		.stdout(predicate::str::contains("\"enabled\": true"))
		.stdout(predicate::str::contains("\"rules\": \"a=>b\""))
		.stdout(predicate::str::contains("\"save_txt\": true"));
}

#[test]
fn test_config_set_rules_from_file() {
	let temp_dir = tempfile::tempdir().unwrap();
	let settings = temp_dir.path().join("settings.json");
	let rules = temp_dir.path().join("rules.txt");
	fs::write(&rules, "\"blue\" => \"red\"\n").unwrap();

	replacer_cmd(&settings)
		.args(["config", "set", "--rules-file"])
		.arg(&rules)
		.assert()
		.success();

	let stored: serde_json::Value =
		serde_json::from_str(&fs::read_to_string(&settings).unwrap()).unwrap();
	assert_eq!(stored["rules"], "\"blue\" => \"red\"\n");
}

#[test]
fn test_config_path() {
	let temp_dir = tempfile::tempdir().unwrap();
	let settings = temp_dir.path().join("settings.json");

	replacer_cmd(&settings)
		.args(["config", "path"])
		.assert()
		.success()
		.stdout(predicate::str::contains("settings.json"))
		.stdout(predicate::str::contains("(not found)"))
		.stdout(predicate::str::contains("Log directory"));
}

// ============================================================================
// check subcommand tests
// ============================================================================

#[test]
fn test_check_valid_rules() {
	let temp_dir = tempfile::tempdir().unwrap();
	let settings = temp_dir.path().join("settings.json");

	replacer_cmd(&settings)
		.args([
			"check",
			"--rules",
			"# colours\n\"blue\" => \"red\" WHEN \"night\"\n/day/i => night",
		])
		.assert()
		.success()
		.stdout(predicate::str::contains(
			"line 2: literal \"blue\" => literal \"red\" WHEN literal \"night\"",
		))
		.stdout(predicate::str::contains("line 3: pattern /day/i => literal \"night\""))
		.stdout(predicate::str::contains("2 rule(s), 0 problem(s)"));
}

#[test]
fn test_check_reports_problems() {
	let temp_dir = tempfile::tempdir().unwrap();
	let settings = temp_dir.path().join("settings.json");

	replacer_cmd(&settings)
		.args(["check", "--rules", "blue red\n/[/ => \"x\""])
		.assert()
		.failure()
		.stdout(predicate::str::contains("line 1: skipped (missing `=>` separator)"))
		.stdout(predicate::str::contains("line 2: skipped (no usable target)"));
}

#[test]
fn test_check_uses_stored_rules() {
	let temp_dir = tempfile::tempdir().unwrap();
	let settings = temp_dir.path().join("settings.json");
	fs::write(&settings, r#"{"rules": "cat => dog"}"#).unwrap();

	replacer_cmd(&settings)
		.arg("check")
		.assert()
		.success()
		.stdout(predicate::str::contains("1 rule(s), 0 problem(s)"));
}

// ============================================================================
// apply subcommand tests
// ============================================================================

#[test]
fn test_apply_with_rule_override() {
	let temp_dir = tempfile::tempdir().unwrap();
	let settings = temp_dir.path().join("settings.json");

	let output = replacer_cmd(&settings)
		.args([
			"apply",
			"--prompt",
			"It's a sunny Day",
			"--negative",
			"dark",
			"--rules",
			"/day/i => \"night\"",
		])
		.assert()
		.success()
		.get_output()
		.stdout
		.clone();

	let json = output_json(&output);
	assert_eq!(json["prompt"], "It's a sunny night");
	assert_eq!(json["negative_prompt"], "dark");
	assert_eq!(json["all_prompts"][0], "It's a sunny night");
}

#[test]
fn test_apply_uses_stored_settings() {
	let temp_dir = tempfile::tempdir().unwrap();
	let settings = temp_dir.path().join("settings.json");
	fs::write(
		&settings,
		r#"{"enabled": true, "rules": "\"blue\" => \"red\" WHEN \"night\"", "save_txt": false}"#,
	)
	.unwrap();

	let output = replacer_cmd(&settings)
		.args(["apply", "--prompt", "blue sky", "--negative", "NIGHT"])
		.assert()
		.success()
		.get_output()
		.stdout
		.clone();
	assert_eq!(output_json(&output)["prompt"], "red sky");

	let output = replacer_cmd(&settings)
		.args(["apply", "--prompt", "blue sky", "--negative", "day"])
		.assert()
		.success()
		.get_output()
		.stdout
		.clone();
	assert_eq!(output_json(&output)["prompt"], "blue sky");
}

#[test]
fn test_apply_disabled_settings_leave_prompts_alone() {
	let temp_dir = tempfile::tempdir().unwrap();
	let settings = temp_dir.path().join("settings.json");
	fs::write(&settings, r#"{"enabled": false, "rules": "blue => red"}"#).unwrap();

	let output = replacer_cmd(&settings)
		.args(["apply", "--prompt", "blue"])
		.assert()
		.success()
		.get_output()
		.stdout
		.clone();
	assert_eq!(output_json(&output)["prompt"], "blue");
}

#[test]
fn test_apply_batch_file_with_change_log() {
	let temp_dir = tempfile::tempdir().unwrap();
	let settings = temp_dir.path().join("settings.json");
	let log_dir = temp_dir.path().join("log");
	let batch = temp_dir.path().join("batch.json");
	fs::write(
		&batch,
		r#"{
	"all_prompts": ["big cat", "small dog", "fat cat"],
	"all_negative_prompts": ["", "", "cat hair"]
}"#,
	)
	.unwrap();

	let output = replacer_cmd(&settings)
		.args(["apply", "--rules", "/(\\w+) cat/ => \"$1 dog\"", "--save-txt"])
		.arg("--batch")
		.arg(&batch)
		.arg("--log-dir")
		.arg(&log_dir)
		.assert()
		.success()
		.get_output()
		.stdout
		.clone();

	let json = output_json(&output);
	assert_eq!(json["all_prompts"][0], "big dog");
	assert_eq!(json["all_prompts"][1], "small dog");
	assert_eq!(json["all_prompts"][2], "fat dog");
	assert_eq!(json["all_negative_prompts"][2], "cat hair");
	assert_eq!(json["prompt"], "big dog");

	let mut names: Vec<String> = fs::read_dir(&log_dir)
		.unwrap()
		.map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
		.collect();
	names.sort();
	assert_eq!(names.len(), 2);
	assert!(names[0].ends_with("_0.txt"));
	assert!(names[1].ends_with("_2.txt"));

	let content = fs::read_to_string(log_dir.join(&names[1])).unwrap();
	assert!(content.starts_with("##### ORIGINAL POSITIVE #####\n\nfat cat\n\n\n\n\n"));
	assert!(content.contains("##### EDITED POSITIVE #####\n\nfat dog\n"));
}

#[test]
fn test_apply_mismatched_batch_fails() {
	let temp_dir = tempfile::tempdir().unwrap();
	let settings = temp_dir.path().join("settings.json");
	let batch = temp_dir.path().join("batch.json");
	fs::write(&batch, r#"{"all_prompts": ["a", "b"], "all_negative_prompts": ["c"]}"#).unwrap();

	replacer_cmd(&settings)
		.args(["apply", "--rules", "a => z", "--batch"])
		.arg(&batch)
		.assert()
		.failure()
		.stderr(predicate::str::contains("2 positive prompts but 1 negative prompts"));
}

#[test]
fn test_apply_requires_prompt_or_batch() {
	let temp_dir = tempfile::tempdir().unwrap();
	let settings = temp_dir.path().join("settings.json");

	replacer_cmd(&settings)
		.args(["apply", "--rules", "a => b"])
		.assert()
		.failure()
		.stderr(predicate::str::contains("--prompt"));
}

#[test]
fn test_apply_missing_rules_file_fails() {
	let temp_dir = tempfile::tempdir().unwrap();
	let settings = temp_dir.path().join("settings.json");

	replacer_cmd(&settings)
		.args(["apply", "--prompt", "a", "--rules-file"])
		.arg(temp_dir.path().join("missing.txt"))
		.assert()
		.failure()
		.stderr(predicate::str::contains("Failed to read rules file"));
}
