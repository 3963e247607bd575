mod config;
mod export_cmd;
mod plan_io;
mod render;
mod show_cmd;
mod synthesize_cmd;
mod tui;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::{Parser, Subcommand};

use atelier_core::session::Session;
use atelier_core::synthesis::{SynthesisService, response_schema};

use config::AtelierConfig;
use synthesize_cmd::PreferenceArgs;

#[derive(Parser)]
#[command(name = "atelier", about = "Weekly meal-plan synthesis with calendar export")]
struct Cli {
    /// Gemini API key (overrides GEMINI_API_KEY env var)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Gemini model name (overrides ATELIER_GEMINI_MODEL env var)
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write an atelier config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Synthesize a seven-day plan from a pantry description
    Synthesize {
        /// What is on hand; include "test_mode" for the offline plan
        #[arg(long)]
        pantry: String,
        #[command(flatten)]
        prefs: PreferenceArgs,
        /// Save the plan as JSON
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Print a saved plan
    Show {
        /// Plan JSON file
        file: PathBuf,
        /// Show a single day (1-7)
        #[arg(long)]
        day: Option<u32>,
        /// Show the grouped grocery list
        #[arg(long, conflicts_with = "day")]
        grocery: bool,
    },
    /// Export a saved plan's schedule as an iCalendar file
    Export {
        /// Plan JSON file
        file: PathBuf,
        /// Output path (default: atelier-plan-<id>.ics)
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Export a single day (1-7)
        #[arg(long)]
        day: Option<u32>,
        /// Write DTEND equal to DTSTART instead of applying the duration
        #[arg(long)]
        same_start_end: bool,
    },
    /// Print the JSON response schema sent to the model
    Schema,
    /// Interactive dashboard
    Dashboard {
        /// Open with a saved plan loaded
        #[arg(long)]
        plan: Option<PathBuf>,
    },
}

/// Execute the `atelier init` command: write the config file.
fn cmd_init(api_key: Option<&str>, model: Option<&str>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        gemini: config::GeminiSection {
            api_key: api_key.map(str::to_string),
            model: model.map(str::to_string),
            base_url: None,
        },
        preferences: config::PreferencesSection::default(),
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    match api_key {
        Some(key) => println!("  gemini.api_key = {}", mask_key(key)),
        None => println!("  gemini.api_key not set (GEMINI_API_KEY is read at run time)"),
    }
    if let Some(model) = model {
        println!("  gemini.model = {model}");
    }
    println!();
    println!("Next: run `atelier synthesize --pantry \"...\"` or `atelier dashboard`.");

    Ok(())
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() < 12 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

fn init_tracing(to_file: bool) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if to_file {
        // The dashboard owns the terminal, so logs go to a file.
        let dir = config::config_dir();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("cannot create {}", dir.display()))?;
        let path = dir.join("dashboard.log");
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("cannot open log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    init_tracing(matches!(cli.command, Commands::Dashboard { .. }))?;

    match cli.command {
        Commands::Init { force } => {
            cmd_init(cli.api_key.as_deref(), cli.model.as_deref(), force)?;
        }
        Commands::Synthesize {
            pantry,
            prefs,
            output,
        } => {
            let resolved = AtelierConfig::resolve(cli.api_key.as_deref(), cli.model.as_deref())?;
            synthesize_cmd::run_synthesize(resolved, &pantry, &prefs, output).await?;
        }
        Commands::Show { file, day, grocery } => {
            show_cmd::run_show(&file, day, grocery)?;
        }
        Commands::Export {
            file,
            output,
            day,
            same_start_end,
        } => {
            export_cmd::run_export_ics(&file, output.as_deref(), day, same_start_end)?;
        }
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&response_schema())?);
        }
        Commands::Dashboard { plan } => {
            let resolved = AtelierConfig::resolve(cli.api_key.as_deref(), cli.model.as_deref())?;
            let session = match plan {
                Some(path) => Session::with_plan(resolved.preferences, plan_io::load_plan(&path)?),
                None => Session::new(resolved.preferences),
            };
            let service =
                SynthesisService::from_config(resolved.gemini, resolved.explicit_api_key.as_deref())
                    .context("failed to build Gemini client")?;
            let export_dir = std::env::current_dir().context("cannot read current directory")?;
            tui::run_dashboard(session, Arc::new(service), export_dir).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod test_util {
    use std::sync::{Mutex, MutexGuard};

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Serialize tests that touch process environment variables.
    pub fn lock_env() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn masks_keys() {
        assert_eq!(mask_key("short"), "****");
        assert_eq!(mask_key("AIzaSyA-1234567890-abcd"), "AIza...abcd");
    }

    #[test]
    fn parses_synthesize_flags() {
        let cli = Cli::try_parse_from([
            "atelier",
            "--model",
            "gemini-flash",
            "synthesize",
            "--pantry",
            "rice, dal",
            "--persona",
            "student",
            "--allergy",
            "peanut",
            "--allergy",
            "sesame",
        ])
        .unwrap();
        assert_eq!(cli.model.as_deref(), Some("gemini-flash"));
        let Commands::Synthesize { pantry, prefs, output } = cli.command else {
            panic!("expected synthesize");
        };
        assert_eq!(pantry, "rice, dal");
        assert_eq!(prefs.persona, Some(atelier_core::model::Persona::Student));
        assert_eq!(prefs.allergies, vec!["peanut", "sesame"]);
        assert!(output.is_none());
    }

    #[test]
    fn rejects_unknown_persona() {
        assert!(
            Cli::try_parse_from(["atelier", "synthesize", "--pantry", "x", "--persona", "chef"])
                .is_err()
        );
    }
}
