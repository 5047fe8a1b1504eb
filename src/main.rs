use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use prompt_replacer::batch::{Batch, process_batch};
use prompt_replacer::config::{JsonSettingsStore, Settings, SettingsProvider, settings_to_string};
use prompt_replacer::rules::{LineOutcome, Rule, SkipReason, Value, parse_rule_list};

#[derive(Parser)]
#[command(name = "prompt-replacer")]
#[command(
	author,
	version,
	about = "Rule-based conditional find/replace for positive and negative prompts"
)]
#[command(arg_required_else_help = true)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Settings file to use instead of the default location
	#[arg(long, global = true, value_name = "PATH")]
	settings: Option<PathBuf>,

	/// Increase log verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
	/// Rewrite a prompt pair or a batch and print the result as JSON
	Apply(ApplyArgs),

	/// Parse a rule list and report how every line is understood
	Check {
		#[command(flatten)]
		rules: RulesSource,
	},

	/// Settings management commands
	Config {
		#[command(subcommand)]
		action: ConfigAction,
	},
}

#[derive(Args)]
struct ApplyArgs {
	/// Positive prompt
	#[arg(short, long, required_unless_present = "batch", conflicts_with = "batch")]
	prompt: Option<String>,

	/// Negative prompt
	#[arg(short, long, conflicts_with = "batch")]
	negative: Option<String>,

	/// JSON batch file with `all_prompts` and `all_negative_prompts`
	#[arg(long, value_name = "FILE")]
	batch: Option<PathBuf>,

	#[command(flatten)]
	rules: RulesSource,

	/// Write a change-log file for every changed pair
	#[arg(long)]
	save_txt: bool,

	/// Change-log directory (defaults to `log/` next to the settings file)
	#[arg(long, value_name = "DIR")]
	log_dir: Option<PathBuf>,
}

#[derive(Args)]
struct RulesSource {
	/// Rule list text, overriding the stored rules
	#[arg(long, conflicts_with = "rules_file")]
	rules: Option<String>,

	/// Read the rule list from a file, overriding the stored rules
	#[arg(long, value_name = "FILE")]
	rules_file: Option<PathBuf>,
}

impl RulesSource {
	fn read(&self) -> Result<Option<String>> {
		if let Some(ref text) = self.rules {
			return Ok(Some(text.clone()));
		}
		if let Some(ref path) = self.rules_file {
			let text = std::fs::read_to_string(path)
				.with_context(|| format!("Failed to read rules file {}", path.display()))?;
			return Ok(Some(text));
		}
		Ok(None)
	}
}

#[derive(Subcommand)]
enum ConfigAction {
	/// Display the effective settings
	Show,
	/// Update and save settings
	Set {
		/// Enable or disable rule processing
		#[arg(long, action = clap::ArgAction::Set, value_name = "BOOL")]
		enabled: Option<bool>,

		#[command(flatten)]
		rules: RulesSource,

		/// Enable or disable the change log
		#[arg(long, action = clap::ArgAction::Set, value_name = "BOOL")]
		save_txt: Option<bool>,
	},
	/// Print the settings file and change-log locations
	Path,
}

fn main() -> ExitCode {
	let cli = Cli::parse();
	init_logger(cli.verbose);

	match run(cli) {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn init_logger(verbose: u8) {
	let level = match verbose {
		0 => "warn",
		1 => "info",
		_ => "debug",
	};
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
		.format_timestamp(None)
		.init();
}

fn run(cli: Cli) -> Result<ExitCode> {
	let store = match cli.settings {
		Some(path) => JsonSettingsStore::new(path),
		None => JsonSettingsStore::at_default_location()
			.context("Failed to locate the settings file")?,
	};

	match cli.command {
		Commands::Apply(args) => handle_apply(&store, &args),
		Commands::Check { rules } => handle_check(&store, &rules),
		Commands::Config { action } => match action {
			ConfigAction::Show => handle_config_show(&store),
			ConfigAction::Set {
				enabled,
				rules,
				save_txt,
			} => handle_config_set(&store, enabled, &rules, save_txt),
			ConfigAction::Path => handle_config_path(&store),
		},
	}
}

fn handle_apply(store: &JsonSettingsStore, args: &ApplyArgs) -> Result<ExitCode> {
	let mut settings = store.load();
	if let Some(rules) = args.rules.read()? {
		settings.rules = rules;
		settings.enabled = true;
	}
	if args.save_txt {
		settings.save_txt = true;
	}

	let mut batch = match args.batch {
		Some(ref path) => read_batch(path)?,
		None => Batch::single(
			args.prompt.clone().unwrap_or_default(),
			args.negative.clone().unwrap_or_default(),
		),
	};

	let log_dir = args.log_dir.clone().unwrap_or_else(|| store.log_dir());
	let report = process_batch(&mut batch, &settings, &log_dir)
		.context("Failed to process prompt batch")?;

	for path in &report.log_files {
		log::info!("Wrote {}", path.display());
	}

	let json = serde_json::to_string_pretty(&batch).context("Failed to serialize batch")?;
	println!("{}", json);
	Ok(ExitCode::SUCCESS)
}

fn read_batch(path: &Path) -> Result<Batch> {
	let content = std::fs::read_to_string(path)
		.with_context(|| format!("Failed to read batch file {}", path.display()))?;
	serde_json::from_str(&content)
		.with_context(|| format!("Failed to parse batch file {}", path.display()))
}

fn handle_check(store: &JsonSettingsStore, source: &RulesSource) -> Result<ExitCode> {
	let text = match source.read()? {
		Some(text) => text,
		None => store.load().rules,
	};

	let mut rules = 0;
	let mut problems = 0;

	for line in parse_rule_list(&text) {
		match line.outcome {
			LineOutcome::Parsed(ref rule) => {
				rules += 1;
				println!("line {}: {}", line.number, describe_rule(rule));
			}
			LineOutcome::Skipped(SkipReason::Blank | SkipReason::Comment) => {}
			LineOutcome::Skipped(reason) => {
				problems += 1;
				println!("line {}: skipped ({}): {}", line.number, reason, line.text);
			}
		}
	}

	println!("{} rule(s), {} problem(s)", rules, problems);

	if problems > 0 {
		Ok(ExitCode::FAILURE)
	} else {
		Ok(ExitCode::SUCCESS)
	}
}

fn describe_rule(rule: &Rule) -> String {
	let mut text = format!(
		"{} => {}",
		describe_value(&rule.target),
		rule.replacement
			.as_ref()
			.map(describe_value)
			.unwrap_or_else(|| "(empty)".to_string())
	);
	if let Some(ref condition) = rule.condition {
		text.push_str(&format!(" WHEN {}", describe_value(condition)));
	}
	text
}

fn describe_value(value: &Value) -> String {
	match value {
		Value::Literal(text) => format!("literal {:?}", text),
		Value::Pattern(pattern) => {
			let mut flags = String::new();
			for (set, letter) in [
				(pattern.flags.case_insensitive, 'i'),
				(pattern.flags.multi_line, 'm'),
				(pattern.flags.dot_matches_new_line, 's'),
				(pattern.flags.ascii, 'a'),
			] {
				if set {
					flags.push(letter);
				}
			}
			format!("pattern /{}/{}", pattern.source, flags)
		}
	}
}

fn handle_config_show(store: &JsonSettingsStore) -> Result<ExitCode> {
	let settings = store.load();
	println!("{}", settings_to_string(&settings)?);
	Ok(ExitCode::SUCCESS)
}

fn handle_config_set(
	store: &JsonSettingsStore,
	enabled: Option<bool>,
	rules: &RulesSource,
	save_txt: Option<bool>,
) -> Result<ExitCode> {
	let mut settings: Settings = store.load();
	if let Some(enabled) = enabled {
		settings.enabled = enabled;
	}
	if let Some(text) = rules.read()? {
		settings.rules = text;
	}
	if let Some(save_txt) = save_txt {
		settings.save_txt = save_txt;
	}

	store
		.save(&settings)
		.with_context(|| format!("Failed to save settings to {}", store.path().display()))?;

	println!("Saved settings to {}", store.path().display());
	Ok(ExitCode::SUCCESS)
}

fn handle_config_path(store: &JsonSettingsStore) -> Result<ExitCode> {
	println!("Settings file: {}", store.path().display());
	if store.path().exists() {
		println!("  (exists)");
	} else {
		println!("  (not found)");
	}
	println!("Log directory: {}", store.log_dir().display());
	Ok(ExitCode::SUCCESS)
}
