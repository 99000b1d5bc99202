use remindly_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let api_key = config
        .llm
        .api_key
        .as_ref()
        .map(|key| redact(key.expose_secret()))
        .unwrap_or_else(|| "(unset)".to_string());

    let mut lines = vec!["effective config (source precedence: overrides > env > file > default):".to_string()];
    lines.push(render_line("llm.api_key", &api_key));
    lines.push(render_line("llm.base_url", &config.llm.base_url));
    lines.push(render_line("llm.model", &config.llm.model));
    lines.push(render_line("llm.timeout_secs", &config.llm.timeout_secs.to_string()));
    lines.push(render_line("llm.max_retries", &config.llm.max_retries.to_string()));
    lines.push(render_line(
        "agent.max_invoices_to_display",
        &config.agent.max_invoices_to_display.to_string(),
    ));
    lines.push(render_line(
        "agent.max_user_input_len",
        &config.agent.max_user_input_len.to_string(),
    ));
    lines.push(render_line(
        "agent.max_company_name_len",
        &config.agent.max_company_name_len.to_string(),
    ));
    lines.push(render_line(
        "agent.max_email_content_len",
        &config.agent.max_email_content_len.to_string(),
    ));
    lines.push(render_line("agent.exit_words", &config.agent.exit_words.join(",")));
    lines.push(render_line("logging.level", &config.logging.level));
    lines.push(render_line("logging.format", &format!("{:?}", config.logging.format)));

    lines.join("\n")
}

fn render_line(key: &str, value: &str) -> String {
    format!("  {key} = {value}")
}

fn redact(secret: &str) -> String {
    if secret.chars().count() <= 4 {
        return "****".to_string();
    }
    let prefix: String = secret.chars().take(4).collect();
    format!("{prefix}****")
}
