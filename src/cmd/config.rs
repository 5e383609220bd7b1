use std::io::{self, BufRead, Write};

use clap::{Args, Subcommand};

use crate::config::{AppConfig, StoredConfig, config_file_path};
use crate::error::AppResult;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Run the interactive configuration wizard.
    Init,
    /// Show the effective configuration (secrets masked).
    Show,
}

pub fn run(command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Init => run_init(),
        ConfigCommand::Show => run_show(),
    }
}

const WIZARD_FIELDS: &[(&str, bool)] = &[
    ("Tracker API base URL", false),
    ("Tracker personal access token", true),
    ("Destination project id", false),
    ("Bucket strategy (static/lookup)", false),
    ("Priority custom field id", false),
    ("Webhook bind address", false),
];

fn run_init() -> AppResult<()> {
    let mut cfg = StoredConfig::load()?;

    println!("Configuring intake.");
    println!("Press Enter to keep the current value, '-' to clear it.");
    println!("Category and priority tables are edited directly in the config file.");
    println!();

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let targets = [
        &mut cfg.tracker_base_url,
        &mut cfg.tracker_token,
        &mut cfg.project_id,
        &mut cfg.bucket_strategy,
        &mut cfg.priority_field_id,
        &mut cfg.bind_addr,
    ];
    for ((field, secret), target) in WIZARD_FIELDS.iter().zip(targets) {
        let action = prompt(&mut input, field, target.as_deref(), *secret)?;
        action.apply(target);
    }

    cfg.save()?;

    let path = config_file_path()?;
    println!("\nConfiguration saved to {}", path.display());
    Ok(())
}

fn run_show() -> AppResult<()> {
    let cfg = StoredConfig::load()?;
    let effective = AppConfig::load()?;
    let path = config_file_path()?;

    println!("Configuration file: {}", path.display());
    println!("Tracker base URL: {}", effective.tracker_base_url);
    println!("Tracker token: {}", mask_secret(&effective.tracker_token));
    println!("Project id: {}", display_value(&effective.project_id));
    println!("Bucket strategy: {}", effective.bucket_strategy.as_str());
    println!(
        "Priority field id: {}",
        display_value(&effective.priority_field_id)
    );
    println!("Bind address: {}", effective.bind_addr);
    if cfg.tracker_token.is_some() && effective.tracker_token != cfg.tracker_token {
        println!("(tracker token overridden by INTAKE_TRACKER_TOKEN)");
    }

    println!("\nCategories:");
    let mut categories = effective.categories.categories().collect::<Vec<_>>();
    categories.sort_unstable();
    for category in categories {
        let route = effective.categories.lookup(category);
        println!(
            "  {} {category} -> {}",
            route.marker,
            route.bucket.unwrap_or("<default section>")
        );
    }

    println!("\nPriorities:");
    let mut priorities = effective.priorities.labels().collect::<Vec<_>>();
    priorities.sort_unstable_by_key(|(label, _)| *label);
    for (label, value) in priorities {
        println!("  {label} -> {}", value.as_str());
    }

    Ok(())
}

fn prompt(
    input: &mut impl BufRead,
    field: &str,
    current: Option<&str>,
    secret: bool,
) -> AppResult<PromptAction> {
    let mut stdout = io::stdout();

    match (current, secret) {
        (Some(_), true) => write!(stdout, "{field} [****] (Enter to keep, '-' to clear): ")?,
        (Some(value), false) => {
            write!(stdout, "{field} [{value}] (Enter to keep, '-' to clear): ")?
        }
        (None, _) => write!(stdout, "{field} (Enter to skip): ")?,
    }
    stdout.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(PromptAction::parse(&line))
}

fn display_value(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<not set>".to_string())
}

fn mask_secret(value: &Option<String>) -> String {
    match value {
        Some(token) if token.chars().count() > 8 => {
            let chars = token.chars().collect::<Vec<_>>();
            let prefix = chars[..4].iter().collect::<String>();
            format!("{prefix}***")
        }
        Some(token) if !token.is_empty() => "***".to_string(),
        _ => "<not set>".to_string(),
    }
}

#[derive(Debug, PartialEq, Eq)]
enum PromptAction {
    Keep,
    Clear,
    Set(String),
}

impl PromptAction {
    fn parse(line: &str) -> Self {
        match line.trim() {
            "" => PromptAction::Keep,
            "-" => PromptAction::Clear,
            value => PromptAction::Set(value.to_string()),
        }
    }

    fn apply(self, target: &mut Option<String>) {
        match self {
            PromptAction::Keep => {}
            PromptAction::Clear => *target = None,
            PromptAction::Set(value) => *target = Some(value),
        }
    }
}
