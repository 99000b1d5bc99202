use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::ValidationLimits;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub agent: AgentConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_min_wait_secs: u64,
    pub retry_max_wait_secs: u64,
}

#[derive(Clone, Debug)]
pub struct AgentConfig {
    pub max_invoices_to_display: usize,
    pub max_user_input_len: usize,
    pub max_company_name_len: usize,
    pub max_email_content_len: usize,
    pub exit_words: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub llm_api_key: Option<String>,
    pub llm_model: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig {
                api_key: None,
                base_url: "https://api.groq.com/openai/v1".to_string(),
                model: "mixtral-8x7b-32768".to_string(),
                timeout_secs: 30,
                max_retries: 3,
                retry_min_wait_secs: 2,
                retry_max_wait_secs: 10,
            },
            agent: AgentConfig {
                max_invoices_to_display: 3,
                max_user_input_len: 500,
                max_company_name_len: 100,
                max_email_content_len: 5000,
                exit_words: vec!["exit".to_string(), "quit".to_string(), "bye".to_string()],
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl AgentConfig {
    pub fn validation_limits(&self) -> ValidationLimits {
        ValidationLimits {
            max_user_input_len: self.max_user_input_len,
            max_company_name_len: self.max_company_name_len,
            max_email_content_len: self.max_email_content_len,
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("remindly.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(llm) = patch.llm {
            if let Some(llm_api_key_value) = llm.api_key {
                self.llm.api_key = Some(secret_value(llm_api_key_value));
            }
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = base_url;
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
            if let Some(max_retries) = llm.max_retries {
                self.llm.max_retries = max_retries;
            }
            if let Some(retry_min_wait_secs) = llm.retry_min_wait_secs {
                self.llm.retry_min_wait_secs = retry_min_wait_secs;
            }
            if let Some(retry_max_wait_secs) = llm.retry_max_wait_secs {
                self.llm.retry_max_wait_secs = retry_max_wait_secs;
            }
        }

        if let Some(agent) = patch.agent {
            if let Some(max_invoices_to_display) = agent.max_invoices_to_display {
                self.agent.max_invoices_to_display = max_invoices_to_display;
            }
            if let Some(max_user_input_len) = agent.max_user_input_len {
                self.agent.max_user_input_len = max_user_input_len;
            }
            if let Some(max_company_name_len) = agent.max_company_name_len {
                self.agent.max_company_name_len = max_company_name_len;
            }
            if let Some(max_email_content_len) = agent.max_email_content_len {
                self.agent.max_email_content_len = max_email_content_len;
            }
            if let Some(exit_words) = agent.exit_words {
                self.agent.exit_words = exit_words;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        // GROQ_API_KEY is honored as an alias so the usual provider variable
        // works without a remindly-specific name.
        let api_key = read_env("REMINDLY_LLM_API_KEY").or_else(|| read_env("GROQ_API_KEY"));
        if let Some(value) = api_key {
            self.llm.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("REMINDLY_LLM_BASE_URL") {
            self.llm.base_url = value;
        }
        if let Some(value) = read_env("REMINDLY_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("REMINDLY_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("REMINDLY_LLM_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("REMINDLY_LLM_MAX_RETRIES") {
            self.llm.max_retries = parse_u32("REMINDLY_LLM_MAX_RETRIES", &value)?;
        }

        if let Some(value) = read_env("REMINDLY_AGENT_MAX_INVOICES_TO_DISPLAY") {
            self.agent.max_invoices_to_display =
                parse_usize("REMINDLY_AGENT_MAX_INVOICES_TO_DISPLAY", &value)?;
        }
        if let Some(value) = read_env("REMINDLY_AGENT_MAX_USER_INPUT_LEN") {
            self.agent.max_user_input_len =
                parse_usize("REMINDLY_AGENT_MAX_USER_INPUT_LEN", &value)?;
        }
        if let Some(value) = read_env("REMINDLY_AGENT_MAX_COMPANY_NAME_LEN") {
            self.agent.max_company_name_len =
                parse_usize("REMINDLY_AGENT_MAX_COMPANY_NAME_LEN", &value)?;
        }
        if let Some(value) = read_env("REMINDLY_AGENT_MAX_EMAIL_CONTENT_LEN") {
            self.agent.max_email_content_len =
                parse_usize("REMINDLY_AGENT_MAX_EMAIL_CONTENT_LEN", &value)?;
        }

        let log_level = read_env("REMINDLY_LOGGING_LEVEL").or_else(|| read_env("REMINDLY_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("REMINDLY_LOGGING_FORMAT").or_else(|| read_env("REMINDLY_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(llm_api_key) = overrides.llm_api_key {
            self.llm.api_key = Some(secret_value(llm_api_key));
        }
        if let Some(llm_model) = overrides.llm_model {
            self.llm.model = llm_model;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_llm(&self.llm)?;
        validate_agent(&self.agent)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("remindly.toml"), PathBuf::from("config/remindly.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    let missing = llm
        .api_key
        .as_ref()
        .map(|value| value.expose_secret().trim().is_empty())
        .unwrap_or(true);
    if missing {
        return Err(ConfigError::Validation(
            "llm.api_key is required. Get it from https://console.groq.com".to_string(),
        ));
    }

    if llm.base_url.trim().is_empty()
        || (!llm.base_url.starts_with("http://") && !llm.base_url.starts_with("https://"))
    {
        return Err(ConfigError::Validation(
            "llm.base_url must start with http:// or https://".to_string(),
        ));
    }

    if llm.model.trim().is_empty() {
        return Err(ConfigError::Validation("llm.model must not be empty".to_string()));
    }

    if llm.timeout_secs == 0 || llm.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "llm.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if llm.max_retries == 0 {
        return Err(ConfigError::Validation(
            "llm.max_retries must be greater than zero".to_string(),
        ));
    }

    if llm.retry_min_wait_secs == 0 || llm.retry_min_wait_secs > llm.retry_max_wait_secs {
        return Err(ConfigError::Validation(
            "llm retry waits must satisfy 0 < retry_min_wait_secs <= retry_max_wait_secs"
                .to_string(),
        ));
    }

    Ok(())
}

fn validate_agent(agent: &AgentConfig) -> Result<(), ConfigError> {
    if agent.max_invoices_to_display == 0 {
        return Err(ConfigError::Validation(
            "agent.max_invoices_to_display must be greater than zero".to_string(),
        ));
    }

    if agent.max_user_input_len == 0
        || agent.max_company_name_len == 0
        || agent.max_email_content_len == 0
    {
        return Err(ConfigError::Validation(
            "agent validation limits must all be greater than zero".to_string(),
        ));
    }

    if agent.exit_words.iter().any(|word| word.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "agent.exit_words must not contain empty entries".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    llm: Option<LlmPatch>,
    agent: Option<AgentPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
    retry_min_wait_secs: Option<u64>,
    retry_max_wait_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct AgentPatch {
    max_invoices_to_display: Option<usize>,
    max_user_input_len: Option<usize>,
    max_company_name_len: Option<usize>,
    max_email_content_len: Option<usize>,
    exit_words: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
