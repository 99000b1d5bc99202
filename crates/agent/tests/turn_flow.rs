//! End-to-end turn flows through the orchestration runtime, driven by a
//! scripted LLM double and a recording MCP double with canned billing data.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use remindly_agent::llm::{LlmClient, LlmError};
use remindly_agent::mcp::{McpClient, McpError};
use remindly_agent::runtime::InvoiceAgent;
use remindly_core::config::AgentConfig;
use remindly_core::Role;

struct ScriptedLlm {
    responses: Mutex<VecDeque<Result<String, LlmError>>>,
}

impl ScriptedLlm {
    fn new(responses: Vec<Result<String, LlmError>>) -> Self {
        Self { responses: Mutex::new(responses.into_iter().collect()) }
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(
        &self,
        _prompt: &str,
        _max_tokens: u32,
        _temperature: f32,
    ) -> Result<String, LlmError> {
        self.responses
            .lock()
            .expect("script lock")
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Transport("script exhausted".to_string())))
    }
}

#[derive(Clone, Debug, PartialEq)]
struct RecordedCall {
    server: String,
    tool: String,
    params: Value,
}

struct RecordingMcp {
    invoices: Vec<Value>,
    calls: Mutex<Vec<RecordedCall>>,
    fail_all: bool,
}

impl RecordingMcp {
    fn with_invoices(invoices: Vec<Value>) -> Self {
        Self { invoices, calls: Mutex::new(Vec::new()), fail_all: false }
    }

    fn failing() -> Self {
        Self { invoices: Vec::new(), calls: Mutex::new(Vec::new()), fail_all: true }
    }

    fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("call lock").clone()
    }

    fn canned_pair() -> Vec<Value> {
        vec![
            json!({
                "id": "inv_001",
                "customer_name": "Acme Corp",
                "customer_email": "john@acme.com",
                "amount": 500.00,
                "due_date": "2026-08-19T10:00:00Z",
                "status": "past_due",
                "days_overdue": 10
            }),
            json!({
                "id": "inv_002",
                "customer_name": "Beta Industries",
                "customer_email": "jane@beta.com",
                "amount": 600.00,
                "due_date": "2026-08-14T10:00:00Z",
                "status": "past_due",
                "days_overdue": 15
            }),
        ]
    }
}

#[async_trait]
impl McpClient for RecordingMcp {
    async fn call_tool(
        &self,
        server: &str,
        tool: &str,
        params: Value,
    ) -> Result<Value, McpError> {
        self.calls.lock().expect("call lock").push(RecordedCall {
            server: server.to_string(),
            tool: tool.to_string(),
            params: params.clone(),
        });

        if self.fail_all {
            return Err(McpError::CallFailed {
                server: server.to_string(),
                tool: tool.to_string(),
                message: "backend unavailable".to_string(),
            });
        }

        match (server, tool) {
            ("stripe", "list_invoices") => Ok(Value::Array(self.invoices.clone())),
            ("stripe", "search_invoices") => {
                let needle = params
                    .get("customer_name")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_ascii_lowercase();
                let matched: Vec<Value> = self
                    .invoices
                    .iter()
                    .filter(|invoice| {
                        invoice
                            .get("customer_name")
                            .and_then(Value::as_str)
                            .map(|name| name.to_ascii_lowercase().contains(&needle))
                            .unwrap_or(false)
                    })
                    .cloned()
                    .collect();
                Ok(Value::Array(matched))
            }
            ("gmail", "send_email") => {
                Ok(json!({ "status": "sent", "to": params.get("to").cloned() }))
            }
            _ => Ok(json!({ "status": "ok" })),
        }
    }
}

fn agent_with(
    llm: ScriptedLlm,
    mcp: Arc<RecordingMcp>,
) -> InvoiceAgent {
    InvoiceAgent::new(Arc::new(llm), mcp, AgentConfig {
        max_invoices_to_display: 3,
        max_user_input_len: 500,
        max_company_name_len: 100,
        max_email_content_len: 5000,
        exit_words: vec!["exit".to_string(), "quit".to_string(), "bye".to_string()],
    })
    .expect("agent should construct")
}

#[tokio::test]
async fn check_invoices_turn_composes_count_total_and_names() {
    let llm = ScriptedLlm::new(vec![Ok("check_invoices".to_string())]);
    let mcp = Arc::new(RecordingMcp::with_invoices(RecordingMcp::canned_pair()));
    let mut agent = agent_with(llm, mcp.clone());

    let reply = agent.process("check my overdue invoices").await;

    assert!(reply.contains("2 overdue invoices"), "reply was: {reply}");
    assert!(reply.contains("1100 dollars"), "reply was: {reply}");
    assert!(reply.contains("Acme Corp"));
    assert!(reply.contains("Beta Industries"));
    assert!(!reply.contains("And "), "display cap not exceeded, reply was: {reply}");

    let calls = mcp.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].server, "stripe");
    assert_eq!(calls[0].tool, "list_invoices");
    assert_eq!(calls[0].params, json!({ "status": "past_due" }));
}

#[tokio::test]
async fn check_invoices_with_empty_book_reports_no_overdues() {
    let llm = ScriptedLlm::new(vec![Ok("check_invoices".to_string())]);
    let mcp = Arc::new(RecordingMcp::with_invoices(Vec::new()));
    let mut agent = agent_with(llm, mcp);

    let reply = agent.process("anything overdue?").await;

    assert_eq!(reply, "No overdue invoices!");
}

#[tokio::test]
async fn reminder_without_matching_invoices_skips_the_email_tool() {
    let llm = ScriptedLlm::new(vec![
        Ok("send_reminder".to_string()),
        Ok("Gamma LLC".to_string()),
    ]);
    let mcp = Arc::new(RecordingMcp::with_invoices(RecordingMcp::canned_pair()));
    let mut agent = agent_with(llm, mcp.clone());

    let reply = agent.process("send a reminder to Gamma LLC").await;

    assert_eq!(reply, "No overdue invoices for Gamma LLC.");
    let calls = mcp.calls();
    assert_eq!(calls.len(), 1, "only the search should have run");
    assert_eq!(calls[0].tool, "search_invoices");
    assert!(!calls.iter().any(|call| call.tool == "send_email"));
}

#[tokio::test]
async fn reminder_happy_path_sends_email_and_spells_out_the_address() {
    let llm = ScriptedLlm::new(vec![
        Ok("send_reminder".to_string()),
        Ok("Acme Corp".to_string()),
        Ok("Dear John, invoice inv_001 for 500.00 is 10 days overdue. Please pay.".to_string()),
    ]);
    let mcp = Arc::new(RecordingMcp::with_invoices(RecordingMcp::canned_pair()));
    let mut agent = agent_with(llm, mcp.clone());

    let reply = agent.process("send a payment reminder to Acme Corp").await;

    assert_eq!(reply, "Email sent to Acme Corp at john at acme dot com.");

    let calls = mcp.calls();
    let send = calls.iter().find(|call| call.tool == "send_email").expect("email should be sent");
    assert_eq!(send.server, "gmail");
    assert_eq!(send.params["to"], "john@acme.com");
    assert_eq!(send.params["subject"], "Payment Reminder - Invoice inv_001");
    assert!(send.params["body"].as_str().unwrap_or_default().contains("inv_001"));
}

#[tokio::test]
async fn extraction_returning_none_asks_which_company() {
    let llm = ScriptedLlm::new(vec![
        Ok("send_reminder".to_string()),
        Ok("NONE".to_string()),
    ]);
    let mcp = Arc::new(RecordingMcp::with_invoices(RecordingMcp::canned_pair()));
    let mut agent = agent_with(llm, mcp.clone());

    let reply = agent.process("send a reminder").await;

    assert_eq!(reply, "Which company should I send a reminder to?");
    assert!(mcp.calls().is_empty(), "no tool should run without a company");
}

#[tokio::test]
async fn extraction_of_an_invalid_name_asks_which_company() {
    let llm = ScriptedLlm::new(vec![
        Ok("send_reminder".to_string()),
        Ok("Acme<script>alert(1)</script>".to_string()),
    ]);
    let mcp = Arc::new(RecordingMcp::with_invoices(RecordingMcp::canned_pair()));
    let mut agent = agent_with(llm, mcp);

    let reply = agent.process("send a reminder to that company").await;

    assert_eq!(reply, "Which company should I send a reminder to?");
}

#[tokio::test]
async fn unsafe_generated_email_fails_the_turn_without_sending() {
    let llm = ScriptedLlm::new(vec![
        Ok("send_reminder".to_string()),
        Ok("Acme Corp".to_string()),
        Ok("<script>alert(1)</script>".to_string()),
    ]);
    let mcp = Arc::new(RecordingMcp::with_invoices(RecordingMcp::canned_pair()));
    let mut agent = agent_with(llm, mcp.clone());

    let reply = agent.process("send a payment reminder to Acme Corp").await;

    assert_eq!(reply, "Invalid input: generated email content failed validation");
    assert!(!mcp.calls().iter().any(|call| call.tool == "send_email"));
}

#[tokio::test]
async fn classification_failure_yields_the_fixed_apology() {
    let llm = ScriptedLlm::new(vec![Err(LlmError::RateLimited("429".to_string()))]);
    let mcp = Arc::new(RecordingMcp::with_invoices(RecordingMcp::canned_pair()));
    let mut agent = agent_with(llm, mcp.clone());

    let reply = agent.process("check invoices").await;

    assert_eq!(reply, "I'm having trouble understanding. Please try again.");
    assert!(mcp.calls().is_empty());
    assert!(agent.history().is_empty(), "failed turns are not appended to the log");
}

#[tokio::test]
async fn tool_failure_yields_the_invoice_data_apology() {
    let llm = ScriptedLlm::new(vec![Ok("check_invoices".to_string())]);
    let mcp = Arc::new(RecordingMcp::failing());
    let mut agent = agent_with(llm, mcp);

    let reply = agent.process("check invoices").await;

    assert_eq!(reply, "I'm having trouble accessing invoice data. Please try again.");
}

#[tokio::test]
async fn invalid_user_input_short_circuits_before_any_capability_call() {
    let llm = ScriptedLlm::new(vec![]);
    let mcp = Arc::new(RecordingMcp::with_invoices(RecordingMcp::canned_pair()));
    let mut agent = agent_with(llm, mcp.clone());

    let reply = agent.process("<script>alert(1)</script>").await;

    assert_eq!(reply, "Invalid input: invalid input detected");
    assert!(mcp.calls().is_empty());
}

#[tokio::test]
async fn help_and_unknown_intents_reply_with_the_capability_summary() {
    let llm = ScriptedLlm::new(vec![
        Ok("help".to_string()),
        Ok("make me a sandwich".to_string()),
    ]);
    let mcp = Arc::new(RecordingMcp::with_invoices(RecordingMcp::canned_pair()));
    let mut agent = agent_with(llm, mcp);

    let help = agent.process("what can you do?").await;
    let other = agent.process("make me a sandwich").await;

    assert_eq!(help, "I can check invoices or send reminders. What would you like?");
    assert_eq!(other, help);
}

#[tokio::test]
async fn completed_turns_append_user_and_assistant_messages() {
    let llm = ScriptedLlm::new(vec![Ok("check_invoices".to_string())]);
    let mcp = Arc::new(RecordingMcp::with_invoices(Vec::new()));
    let mut agent = agent_with(llm, mcp);

    agent.process("  check invoices  ").await;

    let messages = agent.history().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content, "check invoices", "the validated (trimmed) text is logged");
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].content, "No overdue invoices!");
}
