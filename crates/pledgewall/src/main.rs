// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pledgewall - live donation displays driven from a shared queue.
//!
//! This is the binary entry point: admin subcommands, `status`, `demo` and
//! the long-running `display` runner all share one SQLite store.

mod admin;
mod demo;
mod display;
mod format;
mod shutdown;
mod status;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use pledgewall_config::PledgewallConfig;
use pledgewall_core::{DisplayMode, LogoUpload, PlaybackRole, PledgeError};
use pledgewall_storage::SqliteStore;
use tracing::warn;

/// Pledgewall - live donation displays driven from a shared queue.
#[derive(Parser, Debug)]
#[command(name = "pledgewall", version, about, long_about = None)]
struct Cli {
    /// Load this config file (plus env overrides) instead of the standard hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Add one donation to the queue.
    Add {
        #[arg(long)]
        name: String,
        /// Amount; `$` and `,` are ignored.
        #[arg(long)]
        amount: String,
    },
    /// Import donations from a `name,amount` CSV file.
    Import { file: PathBuf },
    /// Start revealing donations.
    Start,
    /// Pause the displays.
    Stop,
    /// Flip between started and paused.
    Toggle,
    /// Empty the queue and rewind the cursor.
    Reset,
    /// Remove every stored record.
    Clear,
    /// Set the fundraising target.
    Goal { target: u64 },
    /// Choose a color preset or set custom colors.
    Theme(ThemeArgs),
    /// Manage the display logo.
    Logo {
        #[command(subcommand)]
        action: LogoCommand,
    },
    /// Show queue and goal status.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
    /// Seed the queue with random donations.
    Demo {
        #[arg(long, default_value_t = 10)]
        count: usize,
    },
    /// Run a display until Ctrl+C.
    Display {
        #[arg(long, default_value = "ticker")]
        mode: DisplayMode,
        /// Overrides `display.role` from the config.
        #[arg(long)]
        role: Option<PlaybackRole>,
        /// Print snapshots as JSON lines.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct ThemeArgs {
    /// Preset name, e.g. "Ocean Blue".
    #[arg(
        required_unless_present = "primary",
        conflicts_with_all = ["primary", "secondary", "accent", "text"]
    )]
    preset: Option<String>,
    #[arg(long, requires_all = ["secondary", "accent", "text"])]
    primary: Option<String>,
    #[arg(long)]
    secondary: Option<String>,
    #[arg(long)]
    accent: Option<String>,
    #[arg(long)]
    text: Option<String>,
}

#[derive(Subcommand, Debug)]
enum LogoCommand {
    /// Validate, scale and store a logo.
    Set {
        #[arg(long)]
        url: String,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        #[arg(long)]
        content_type: Option<String>,
        #[arg(long)]
        size_bytes: Option<u64>,
    },
    /// Remove the stored logo.
    Remove,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => pledgewall_config::load_and_validate_path(path),
        None => pledgewall_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            pledgewall_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.general.log_level);

    if let Err(e) = run(cli.command, &config).await {
        eprintln!("{:?}", miette::miette!("{e}"));
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: &PledgewallConfig) -> Result<(), PledgeError> {
    if let Commands::Display { mode, role, json } = command {
        return display::run_display(config, mode, role, json).await;
    }

    let store = SqliteStore::open(&config.storage).await?;
    let result = dispatch(command, &store, config).await;
    if let Some(message) = finish(result, store.close().await)? {
        println!("{message}");
    }
    Ok(())
}

/// Combines a command's result with closing the store. A command error
/// takes precedence; a close failure behind it is only logged.
fn finish<T>(result: Result<T, PledgeError>, closed: Result<(), PledgeError>) -> Result<T, PledgeError> {
    match (result, closed) {
        (Err(e), Err(close)) => {
            warn!(error = %close, "failed to close store");
            Err(e)
        }
        (result, closed) => {
            closed?;
            result
        }
    }
}

/// Runs a one-shot command, returning its status message.
async fn dispatch(
    command: Commands,
    store: &SqliteStore,
    config: &PledgewallConfig,
) -> Result<Option<String>, PledgeError> {
    let message = match command {
        Commands::Add { name, amount } => admin::add(store, &name, &amount).await?,
        Commands::Import { file } => admin::import(store, &file).await?,
        Commands::Start => admin::set_active(store, true).await?,
        Commands::Stop => admin::set_active(store, false).await?,
        Commands::Toggle => admin::toggle(store).await?,
        Commands::Reset => admin::reset(store).await?,
        Commands::Clear => admin::clear(store).await?,
        Commands::Goal { target } => admin::set_goal(store, target).await?,
        Commands::Theme(args) => match args {
            ThemeArgs {
                preset: Some(preset),
                ..
            } => admin::theme_preset(store, &preset).await?,
            ThemeArgs {
                primary: Some(primary),
                secondary: Some(secondary),
                accent: Some(accent),
                text: Some(text),
                ..
            } => admin::theme_custom(store, &primary, &secondary, &accent, &text).await?,
            _ => {
                return Err(PledgeError::InvalidInput(
                    "give a preset name or all four of --primary, --secondary, --accent, --text"
                        .into(),
                ));
            }
        },
        Commands::Logo { action } => match action {
            LogoCommand::Set {
                url,
                width,
                height,
                content_type,
                size_bytes,
            } => {
                let upload = LogoUpload {
                    url,
                    content_type,
                    size_bytes,
                    width,
                    height,
                };
                admin::set_logo(store, upload).await?
            }
            LogoCommand::Remove => admin::remove_logo(store).await?,
        },
        Commands::Status { json, plain } => {
            status::run_status(store, &config.storage.database_path, json, plain).await?;
            return Ok(None);
        }
        Commands::Demo { count } => demo::seed(store, count).await?,
        Commands::Display { .. } => {
            return Err(PledgeError::Internal("display is not a one-shot command".into()));
        }
    };
    Ok(Some(message))
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pledgewall={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
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
    fn parses_display_flags() {
        let cli = Cli::try_parse_from(["pledgewall", "display", "--mode", "live", "--role", "follower"])
            .unwrap();
        match cli.command {
            Commands::Display { mode, role, json } => {
                assert_eq!(mode, DisplayMode::Live);
                assert_eq!(role, Some(PlaybackRole::Follower));
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn theme_requires_preset_or_all_colors() {
        assert!(Cli::try_parse_from(["pledgewall", "theme", "Ocean Blue"]).is_ok());
        assert!(Cli::try_parse_from(["pledgewall", "theme", "--primary", "#000"]).is_err());
        assert!(Cli::try_parse_from(["pledgewall", "theme"]).is_err());
        assert!(
            Cli::try_parse_from([
                "pledgewall", "theme", "--primary", "#000", "--secondary", "#111", "--accent",
                "#222", "--text", "#fff",
            ])
            .is_ok()
        );
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = pledgewall_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn command_error_outranks_close_failure() {
        let closed = || Err(PledgeError::Internal("checkpoint failed".into()));

        let err = finish::<()>(Err(PledgeError::InvalidInput("line 3: bad amount".into())), closed())
            .unwrap_err();
        assert!(err.to_string().contains("line 3"));

        let err = finish(Ok(Some("done".to_string())), closed()).unwrap_err();
        assert!(err.to_string().contains("checkpoint failed"));

        assert_eq!(finish(Ok(1), Ok(())).unwrap(), 1);
    }

    #[tokio::test]
    async fn one_shot_commands_round_trip_through_sqlite() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let config = PledgewallConfig::default();

        let added = dispatch(
            Commands::Add {
                name: "Alice".into(),
                amount: "100".into(),
            },
            &store,
            &config,
        )
        .await
        .unwrap();
        assert_eq!(added.as_deref(), Some("Added $100 from Alice (1 in queue)"));

        let started = dispatch(Commands::Start, &store, &config).await.unwrap();
        assert_eq!(started.as_deref(), Some("Donation display started"));
    }
}
