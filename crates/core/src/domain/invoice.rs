use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One billing record as seen by the agent.
///
/// Constructed only by deserializing tool-invocation payloads; a missing or
/// mistyped required field fails deserialization and the caller reports a
/// tool error instead of crashing the turn. Lifetime is a single handler
/// invocation, nothing is persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub amount: Decimal,
    pub due_date: String,
    pub status: String,
    #[serde(default)]
    pub days_overdue: u32,
}
