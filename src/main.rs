//! dlcfg - Configuration Store CLI
//!
//! Loads a download manager's configuration into a store and inspects or edits
//! it locally.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use dl_config_store::constants::QUEUE_TOPIC;
use dl_config_store::feedback::{
    Confirmer, DialogPresenter, LogDialogPresenter, Notifier, NotifyLevel, NotifyOptions,
};
use dl_config_store::persistence::{FileKvStore, KeyValueStore, MemoryKvStore};
use dl_config_store::settings::ClientSettings;
use dl_config_store::state::{ConfigStore, LoadOutcome, PatchAction, PatchOutcome, RuntimeState};
use serde_json::Value;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Parser)]
#[command(name = "dlcfg", version, about = "Inspect a download manager's configuration")]
struct Cli {
    /// Server base url, overrides the settings file and DL_CONFIG_BASE_URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Answer yes to every confirmation
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the whole configuration
    Show,
    /// Print one value by dotted-path key
    Get {
        key: String,
        /// Value printed when the key is absent (JSON or plain text)
        #[arg(long)]
        default: Option<String>,
    },
    /// Set a value by dotted-path key and print the result
    Set { key: String, value: String },
    /// Apply a collection patch and print the collection
    Patch {
        feature: String,
        action: String,
        payload: String,
    },
    /// Turn a persisted feedback gate on or off
    Toggle {
        #[arg(value_enum)]
        gate: Gate,
        #[arg(action = ArgAction::Set)]
        value: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Gate {
    /// Show non-forced toasts
    Toasts,
    /// Skip confirmations
    ReduceConfirmation,
}

/// Asks on stderr, reads the answer from stdin
struct StdinPresenter;

impl DialogPresenter for StdinPresenter {
    fn confirm(&self, message: &str) -> bool {
        if let Err(e) = write_prompt(&mut io::stderr(), message) {
            warn!(error = %e, "Failed to write prompt");
        }

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).is_err() {
            return false;
        }
        is_yes(&line)
    }

    fn alert(&self, message: &str) {
        eprintln!("{message}");
    }
}

fn write_prompt(out: &mut impl Write, message: &str) -> io::Result<()> {
    write!(out, "{message} [y/N] ")?;
    out.flush()
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Parse a CLI argument as JSON, falling back to a plain string
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = ClientSettings::try_load().context("Failed to load settings")?;
    if let Some(url) = cli.base_url {
        settings.base_url = url;
    }

    let toggles: Arc<dyn KeyValueStore> = match FileKvStore::open_in_data_dir(&settings.feedback_file)
    {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(error = %e, "Feedback toggles unavailable, using defaults");
            Arc::new(MemoryKvStore::new())
        }
    };
    let notifier = Notifier::with_logging(toggles.clone());
    let presenter: Arc<dyn DialogPresenter> = if cli.yes {
        Arc::new(LogDialogPresenter { answer: true })
    } else {
        Arc::new(StdinPresenter)
    };
    let confirmer = Confirmer::new(toggles, presenter);

    if let Command::Toggle { gate, value } = cli.command {
        match gate {
            Gate::Toasts => notifier.set_enabled(value)?,
            Gate::ReduceConfirmation => confirmer.set_reduced(value)?,
        }
        notifier.notify(
            NotifyLevel::Info,
            format!("{gate:?} set to {value}"),
            NotifyOptions::forced(),
        );
        return Ok(());
    }

    let runtime = Arc::new(RuntimeState::new());
    let store = ConfigStore::from_settings(&settings, runtime.clone())?;

    match store.load_config().await {
        LoadOutcome::Loaded => {
            notifier.success(format!(
                "Loaded configuration from {} ({} queued, {} in history)",
                settings.base_url,
                runtime.len(QUEUE_TOPIC),
                runtime.history_count()
            ));
        }
        LoadOutcome::AlreadyLoading | LoadOutcome::Failed => {
            notifier.notify(
                NotifyLevel::Warning,
                "Could not load configuration, showing defaults",
                NotifyOptions::forced(),
            );
        }
    }

    match cli.command {
        Command::Show => print_json(&store.snapshot())?,
        Command::Get { key, default } => {
            let default = default.as_deref().map_or(Value::Null, parse_value);
            print_json(&store.get(&key, default))?;
        }
        Command::Set { key, value } => {
            store.add(&key, parse_value(&value))?;
            print_json(&store.get(&key, Value::Null))?;
        }
        Command::Patch {
            feature,
            action,
            payload,
        } => {
            let destructive = matches!(
                action.parse::<PatchAction>(),
                Ok(PatchAction::Delete | PatchAction::Replace)
            );
            if destructive && !confirmer.confirm(&format!("Apply '{action}' to {feature}?"), false) {
                confirmer.alert("Patch cancelled");
                return Ok(());
            }

            match store.patch(&feature, &action, parse_value(&payload))? {
                PatchOutcome::Applied => {}
                PatchOutcome::NotFound => {
                    notifier.warning(format!("No {feature} entry matched the payload id"));
                }
                PatchOutcome::Ignored => {
                    notifier.warning(format!("'{action}' is not supported for {feature}"));
                }
            }
            print_json(&store.get(&feature, Value::Null))?;
        }
        Command::Toggle { .. } => {}
    }

    Ok(())
}
