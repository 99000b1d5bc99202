//! Interactive text shell. Reads one line per turn, hands it to the
//! orchestration runtime, and prints the reply. Voice capture and synthesis
//! are external collaborators; this shell is text mode only.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use remindly_agent::{InvoiceAgent, MockMcpClient};
use remindly_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use remindly_llm::GroqClient;

use crate::init_logging;

const BANNER: &str = "Invoice Reminder Agent (text mode)\n\
Commands: 'check overdue invoices', 'send reminder to [company]', 'exit'\n";

/// Case-insensitive substring match against the configured exit words.
fn is_exit_command(line: &str, exit_words: &[String]) -> bool {
    let lowered = line.to_lowercase();
    exit_words.iter().any(|word| lowered.contains(&word.to_lowercase()))
}

pub async fn run(model_override: Option<String>) -> Result<()> {
    let config = AppConfig::load(LoadOptions {
        overrides: ConfigOverrides { llm_model: model_override, ..ConfigOverrides::default() },
        ..LoadOptions::default()
    })
    .context("configuration is invalid")?;
    init_logging(&config);

    let llm = GroqClient::from_config(&config.llm)
        .map_err(|err| anyhow::anyhow!("llm client construction failed: {err}"))?;
    let mcp = MockMcpClient::new();
    let exit_words = config.agent.exit_words.clone();

    let mut agent = InvoiceAgent::new(Arc::new(llm), Arc::new(mcp), config.agent)
        .context("agent construction failed")?;
    info!(event_name = "cli.chat.ready", "agent ready");

    println!("{BANNER}");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("You: ");
        stdout.flush().context("stdout flush failed")?;

        let mut line = String::new();
        let bytes = stdin.lock().read_line(&mut line).context("stdin read failed")?;
        if bytes == 0 {
            // EOF ends the session like an exit word would.
            println!("Goodbye!");
            break;
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if is_exit_command(line, &exit_words) {
            println!("Goodbye!");
            break;
        }

        let reply = agent.process(line).await;
        println!("Agent: {reply}\n");
    }

    Ok(())
}
