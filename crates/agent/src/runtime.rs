//! Intent routing and tool orchestration. One user turn moves through
//! validate -> classify -> dispatch -> compose, and every failure after
//! validation is converted into a user-facing reply at a single translation
//! point. The turn never panics and never terminates the process.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use remindly_core::config::AgentConfig;
use remindly_core::voice::{
    format_currency_for_voice, format_date_for_voice, format_email_for_voice,
};
use remindly_core::{
    validate_company_name, validate_email_content, validate_user_input, ConversationLog, Intent,
    Invoice, ValidationError, ValidationLimits,
};

use crate::llm::{LlmClient, LlmError};
use crate::mcp::{McpClient, McpError};
use crate::prompts::{PromptError, PromptLibrary};

const MAX_TOKENS_INTENT: u32 = 50;
const MAX_TOKENS_COMPANY: u32 = 50;
const MAX_TOKENS_EMAIL: u32 = 400;

const TEMPERATURE_INTENT: f32 = 0.1;
const TEMPERATURE_COMPANY: f32 = 0.0;
const TEMPERATURE_EMAIL: f32 = 0.7;

const REPLY_HELP: &str = "I can check invoices or send reminders. What would you like?";
const REPLY_ASK_COMPANY: &str = "Which company should I send a reminder to?";
const REPLY_LLM_TROUBLE: &str = "I'm having trouble understanding. Please try again.";
const REPLY_MCP_TROUBLE: &str = "I'm having trouble accessing invoice data. Please try again.";
const REPLY_UNEXPECTED: &str = "An unexpected error occurred. Please try again.";

/// Tagged per-turn failure. Each tag has exactly one user-facing rendering,
/// applied at the turn boundary in [`InvoiceAgent::process`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AgentError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Mcp(#[from] McpError),
    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl AgentError {
    pub fn user_reply(&self) -> String {
        match self {
            Self::Validation(detail) => format!("Invalid input: {detail}"),
            Self::Llm(_) => REPLY_LLM_TROUBLE.to_string(),
            Self::Mcp(_) => REPLY_MCP_TROUBLE.to_string(),
            Self::Unexpected(_) => REPLY_UNEXPECTED.to_string(),
        }
    }
}

impl From<PromptError> for AgentError {
    fn from(value: PromptError) -> Self {
        Self::Unexpected(value.to_string())
    }
}

/// The orchestration core. Holds its collaborators as an explicitly
/// constructed context; the only state carried across turns is the
/// append-only conversation log.
pub struct InvoiceAgent {
    llm: Arc<dyn LlmClient>,
    mcp: Arc<dyn McpClient>,
    prompts: PromptLibrary,
    config: AgentConfig,
    limits: ValidationLimits,
    history: ConversationLog,
}

impl InvoiceAgent {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        mcp: Arc<dyn McpClient>,
        config: AgentConfig,
    ) -> Result<Self, PromptError> {
        let prompts = PromptLibrary::new()?;
        let limits = config.validation_limits();
        info!(event_name = "agent.initialized", "invoice agent initialized");
        Ok(Self { llm, mcp, prompts, config, limits, history: ConversationLog::new() })
    }

    pub fn history(&self) -> &ConversationLog {
        &self.history
    }

    /// Process one user turn to completion. Always returns a reply string;
    /// failures are translated, logged, and never escape.
    pub async fn process(&mut self, user_input: &str) -> String {
        let correlation_id = Uuid::new_v4().to_string();

        match self.run_turn(user_input, &correlation_id).await {
            Ok((validated_input, reply)) => {
                self.history.push_user(validated_input);
                self.history.push_assistant(reply.clone());
                reply
            }
            Err(AgentError::Validation(detail)) => {
                warn!(
                    event_name = "agent.turn.validation_rejected",
                    correlation_id = %correlation_id,
                    %detail,
                    "turn rejected by validation"
                );
                AgentError::Validation(detail).user_reply()
            }
            Err(err) => {
                error!(
                    event_name = "agent.turn.failed",
                    correlation_id = %correlation_id,
                    error = %err,
                    "turn failed, replying with apology"
                );
                err.user_reply()
            }
        }
    }

    async fn run_turn(
        &self,
        user_input: &str,
        correlation_id: &str,
    ) -> Result<(String, String), AgentError> {
        let text = validate_user_input(user_input, &self.limits)?;

        let intent = self.classify_intent(&text).await?;
        debug!(
            event_name = "agent.turn.classified",
            correlation_id,
            intent = intent.as_str(),
            "intent classified"
        );

        let reply = match intent {
            Intent::CheckInvoices => self.handle_check_invoices().await?,
            Intent::SendReminder => match self.extract_company_name(&text).await? {
                Some(company) => self.handle_send_reminder(&company).await?,
                None => REPLY_ASK_COMPANY.to_string(),
            },
            Intent::Help | Intent::Other => REPLY_HELP.to_string(),
        };

        Ok((text, reply))
    }

    /// Generate -> normalize -> match against the closed intent set. The
    /// generation call runs near-deterministic with a small output budget.
    async fn classify_intent(&self, text: &str) -> Result<Intent, AgentError> {
        let prompt = self.prompts.intent_classification(text)?;
        let raw = self.llm.complete(&prompt, MAX_TOKENS_INTENT, TEMPERATURE_INTENT).await?;
        Ok(Intent::from_model_output(&raw))
    }

    async fn handle_check_invoices(&self) -> Result<String, AgentError> {
        let payload = self
            .mcp
            .call_tool("stripe", "list_invoices", json!({ "status": "past_due" }))
            .await?;
        let invoices = decode_invoice_list(payload)?;

        if invoices.is_empty() {
            return Ok("No overdue invoices!".to_string());
        }

        Ok(compose_overdue_summary(&invoices, self.config.max_invoices_to_display))
    }

    async fn handle_send_reminder(&self, company: &str) -> Result<String, AgentError> {
        let company = validate_company_name(company, &self.limits)?;

        let payload = self
            .mcp
            .call_tool(
                "stripe",
                "search_invoices",
                json!({ "customer_name": company, "status": "past_due" }),
            )
            .await?;
        let invoices = decode_invoice_list(payload)?;

        let Some(invoice) = invoices.into_iter().next() else {
            return Ok(format!("No overdue invoices for {company}."));
        };

        let email_body = self.generate_reminder_email(&invoice).await?;
        if !validate_email_content(&email_body, &self.limits) {
            return Err(ValidationError::UnsafeEmailContent.into());
        }

        self.mcp
            .call_tool(
                "gmail",
                "send_email",
                json!({
                    "to": invoice.customer_email,
                    "subject": format!("Payment Reminder - Invoice {}", invoice.id),
                    "body": email_body,
                }),
            )
            .await?;

        Ok(format!(
            "Email sent to {company} at {}.",
            format_email_for_voice(&invoice.customer_email)
        ))
    }

    async fn generate_reminder_email(&self, invoice: &Invoice) -> Result<String, AgentError> {
        let prompt = self.prompts.payment_reminder(invoice)?;
        let body = self.llm.complete(&prompt, MAX_TOKENS_EMAIL, TEMPERATURE_EMAIL).await?;
        Ok(body)
    }

    /// Ask the model for the company behind the utterance. The literal token
    /// `NONE` or a name failing validation both mean "ask the user instead".
    async fn extract_company_name(&self, text: &str) -> Result<Option<String>, AgentError> {
        let prompt = self.prompts.company_extraction(text)?;
        let raw = self.llm.complete(&prompt, MAX_TOKENS_COMPANY, TEMPERATURE_COMPANY).await?;
        let candidate = raw.trim();

        if candidate == "NONE" {
            return Ok(None);
        }

        Ok(validate_company_name(candidate, &self.limits).ok())
    }
}

/// Decode a list-style tool payload into invoices. Absent payloads count as
/// empty; a non-list payload or an item that fails field coercion is a tool
/// error, never a panic.
fn decode_invoice_list(payload: Value) -> Result<Vec<Invoice>, McpError> {
    let items = match payload {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        other => {
            return Err(McpError::MalformedPayload(format!(
                "expected a list of invoices, got {other}"
            )))
        }
    };

    items
        .into_iter()
        .map(|item| {
            serde_json::from_value::<Invoice>(item)
                .map_err(|err| McpError::MalformedPayload(err.to_string()))
        })
        .collect()
}

/// Deterministic reply composition for the overdue-invoice summary: count,
/// pluralized noun, total, then per-invoice detail up to the display cap.
fn compose_overdue_summary(invoices: &[Invoice], display_cap: usize) -> String {
    let total: Decimal = invoices.iter().map(|invoice| invoice.amount).sum();

    let mut reply = format!("You have {} overdue invoice", invoices.len());
    if invoices.len() > 1 {
        reply.push('s');
    }
    reply.push_str(&format!(", totaling {}. ", format_currency_for_voice(total)));

    for invoice in invoices.iter().take(display_cap) {
        reply.push_str(&format!(
            "{}, {}, due {}. ",
            invoice.customer_name,
            format_currency_for_voice(invoice.amount),
            format_date_for_voice(&invoice.due_date)
        ));
    }

    if invoices.len() > display_cap {
        reply.push_str(&format!("And {} more. ", invoices.len() - display_cap));
    }

    reply
}
