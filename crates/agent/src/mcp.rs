//! MCP-style tool invocation: a structured call addressed by server name,
//! tool name, and a JSON parameter mapping, returning JSON payloads.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::info;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum McpError {
    #[error("tool call {server}/{tool} failed: {message}")]
    CallFailed { server: String, tool: String, message: String },
    #[error("tool payload could not be decoded: {0}")]
    MalformedPayload(String),
}

#[async_trait]
pub trait McpClient: Send + Sync {
    async fn call_tool(&self, server: &str, tool: &str, params: Value)
        -> Result<Value, McpError>;
}

/// In-process tool backend with canned billing data. Serves the same surface
/// a remote MCP server would: `stripe/list_invoices`, `stripe/search_invoices`
/// and `gmail/send_email`.
#[derive(Clone, Debug, Default)]
pub struct MockMcpClient;

impl MockMcpClient {
    pub fn new() -> Self {
        Self
    }

    fn all_invoices() -> Vec<Value> {
        let now = Utc::now();
        vec![
            json!({
                "id": "inv_001",
                "customer_name": "Acme Corp",
                "customer_email": "john@acme.com",
                "amount": 500.00,
                "due_date": (now - Duration::days(10)).to_rfc3339(),
                "status": "past_due",
                "days_overdue": 10
            }),
            json!({
                "id": "inv_002",
                "customer_name": "Beta Industries",
                "customer_email": "jane@beta.com",
                "amount": 600.00,
                "due_date": (now - Duration::days(15)).to_rfc3339(),
                "status": "past_due",
                "days_overdue": 15
            }),
        ]
    }
}

#[async_trait]
impl McpClient for MockMcpClient {
    async fn call_tool(
        &self,
        server: &str,
        tool: &str,
        params: Value,
    ) -> Result<Value, McpError> {
        info!(event_name = "mcp.mock.call", server, tool, "serving tool call from mock backend");

        match (server, tool) {
            ("stripe", "list_invoices") => Ok(Value::Array(Self::all_invoices())),
            ("stripe", "search_invoices") => {
                let needle = params
                    .get("customer_name")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_ascii_lowercase();
                let matched: Vec<Value> = Self::all_invoices()
                    .into_iter()
                    .filter(|invoice| {
                        invoice
                            .get("customer_name")
                            .and_then(Value::as_str)
                            .map(|name| name.to_ascii_lowercase().contains(&needle))
                            .unwrap_or(false)
                    })
                    .collect();
                info!(
                    event_name = "mcp.mock.search",
                    customer = %needle,
                    results = matched.len(),
                    "filtered canned invoices"
                );
                Ok(Value::Array(matched))
            }
            ("gmail", "send_email") => {
                Ok(json!({ "status": "sent", "to": params.get("to").cloned() }))
            }
            _ => Ok(json!({ "status": "ok" })),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::{McpClient, MockMcpClient};

    #[tokio::test]
    async fn list_invoices_returns_both_canned_records() {
        let client = MockMcpClient::new();
        let payload = client
            .call_tool("stripe", "list_invoices", json!({"status": "past_due"}))
            .await
            .expect("list should succeed");

        let items = payload.as_array().expect("payload should be a list");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["customer_name"], "Acme Corp");
        assert_eq!(items[1]["customer_name"], "Beta Industries");
    }

    #[tokio::test]
    async fn search_matches_case_insensitive_substrings() {
        let client = MockMcpClient::new();
        let payload = client
            .call_tool(
                "stripe",
                "search_invoices",
                json!({"customer_name": "acme", "status": "past_due"}),
            )
            .await
            .expect("search should succeed");

        let items = payload.as_array().expect("payload should be a list");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["id"], "inv_001");
    }

    #[tokio::test]
    async fn search_with_no_match_returns_empty_list() {
        let client = MockMcpClient::new();
        let payload = client
            .call_tool(
                "stripe",
                "search_invoices",
                json!({"customer_name": "Gamma LLC", "status": "past_due"}),
            )
            .await
            .expect("search should succeed");

        assert_eq!(payload, Value::Array(Vec::new()));
    }

    #[tokio::test]
    async fn send_email_acknowledges_with_recipient() {
        let client = MockMcpClient::new();
        let payload = client
            .call_tool(
                "gmail",
                "send_email",
                json!({"to": "john@acme.com", "subject": "s", "body": "b"}),
            )
            .await
            .expect("send should succeed");

        assert_eq!(payload["status"], "sent");
        assert_eq!(payload["to"], "john@acme.com");
    }

    #[tokio::test]
    async fn unknown_tools_acknowledge_generically() {
        let client = MockMcpClient::new();
        let payload = client
            .call_tool("calendar", "create_event", json!({}))
            .await
            .expect("unknown tool should still acknowledge");

        assert_eq!(payload["status"], "ok");
    }
}
