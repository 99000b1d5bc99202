pub mod llm;
pub mod mcp;
pub mod prompts;
pub mod runtime;

pub use llm::{LlmClient, LlmError};
pub use mcp::{McpClient, McpError, MockMcpClient};
pub use prompts::{PromptError, PromptLibrary};
pub use runtime::{AgentError, InvoiceAgent};
