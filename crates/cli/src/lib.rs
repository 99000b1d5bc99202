pub mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use remindly_core::config::{AppConfig, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "remindly",
    about = "Remindly invoice-reminder agent CLI",
    long_about = "Chat with the invoice-reminder agent, inspect effective configuration, and run readiness checks.",
    after_help = "Examples:\n  remindly chat\n  remindly config\n  remindly doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Start an interactive text conversation with the agent")]
    Chat {
        #[arg(long, help = "Override the configured LLM model for this session")]
        model: Option<String>,
    },
    #[command(about = "Inspect effective configuration values with secrets redacted")]
    Config,
    #[command(about = "Validate configuration and LLM credential readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        LogFormat::Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Chat { model } => match commands::chat::run(model).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                eprintln!("Error: {error}");
                ExitCode::FAILURE
            }
        },
        Command::Config => {
            println!("{}", commands::config::run());
            ExitCode::SUCCESS
        }
        Command::Doctor { json } => {
            println!("{}", commands::doctor::run(json));
            ExitCode::SUCCESS
        }
    }
}
