//! Prompt templates for the three generation calls the runtime makes:
//! intent classification, company-name extraction, and the reminder email.

use remindly_core::Invoice;
use tera::{Context, Tera};
use thiserror::Error;

const INTENT_CLASSIFICATION: &str = "\
Classify the user's request into exactly one of these intents:
check_invoices - the user wants a summary of overdue invoices
send_reminder - the user wants a payment reminder emailed to a company
help - the user asks what this assistant can do
other - anything else

User request: \"{{ user_input }}\"

Respond with only the intent tag.";

const COMPANY_EXTRACTION: &str =
    "Extract company name from: \"{{ user_input }}\". Return only the name or \"NONE\".";

const PAYMENT_REMINDER: &str = "\
Write a short, polite payment reminder email to be sent on behalf of our
accounts receivable team.

Customer: {{ customer_name }}
Invoice: {{ invoice_id }}
Amount due: {{ amount }}
Original due date: {{ due_date }}
Days overdue: {{ days_overdue }}

Keep the tone friendly and professional, mention the invoice number and
amount, and ask for payment at their earliest convenience. Return only the
email body.";

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt template registration failed: {0}")]
    Register(#[source] tera::Error),
    #[error("prompt template `{name}` failed to render: {source}")]
    Render { name: &'static str, source: tera::Error },
}

pub struct PromptLibrary {
    tera: Tera,
}

impl PromptLibrary {
    pub fn new() -> Result<Self, PromptError> {
        let mut tera = Tera::default();
        tera.add_raw_templates([
            ("intent_classification", INTENT_CLASSIFICATION),
            ("company_extraction", COMPANY_EXTRACTION),
            ("payment_reminder", PAYMENT_REMINDER),
        ])
        .map_err(PromptError::Register)?;
        Ok(Self { tera })
    }

    pub fn intent_classification(&self, user_input: &str) -> Result<String, PromptError> {
        let mut context = Context::new();
        context.insert("user_input", user_input);
        self.render("intent_classification", &context)
    }

    pub fn company_extraction(&self, user_input: &str) -> Result<String, PromptError> {
        let mut context = Context::new();
        context.insert("user_input", user_input);
        self.render("company_extraction", &context)
    }

    pub fn payment_reminder(&self, invoice: &Invoice) -> Result<String, PromptError> {
        let mut context = Context::new();
        context.insert("customer_name", &invoice.customer_name);
        context.insert("invoice_id", &invoice.id);
        context.insert("amount", &invoice.amount.to_string());
        context.insert("due_date", &invoice.due_date);
        context.insert("days_overdue", &invoice.days_overdue);
        self.render("payment_reminder", &context)
    }

    fn render(&self, name: &'static str, context: &Context) -> Result<String, PromptError> {
        self.tera.render(name, context).map_err(|source| PromptError::Render { name, source })
    }
}

#[cfg(test)]
mod tests {
    use remindly_core::Invoice;
    use rust_decimal::Decimal;

    use super::PromptLibrary;

    fn invoice() -> Invoice {
        Invoice {
            id: "inv_001".to_string(),
            customer_name: "Acme Corp".to_string(),
            customer_email: "john@acme.com".to_string(),
            amount: Decimal::new(500_00, 2),
            due_date: "2026-08-19T10:00:00Z".to_string(),
            status: "past_due".to_string(),
            days_overdue: 10,
        }
    }

    #[test]
    fn classification_prompt_embeds_the_user_text() {
        let prompts = PromptLibrary::new().expect("templates should register");
        let rendered = prompts
            .intent_classification("check overdue invoices")
            .expect("render should succeed");

        assert!(rendered.contains("\"check overdue invoices\""));
        assert!(rendered.contains("check_invoices"));
        assert!(rendered.contains("Respond with only the intent tag."));
    }

    #[test]
    fn extraction_prompt_asks_for_the_none_token() {
        let prompts = PromptLibrary::new().expect("templates should register");
        let rendered = prompts
            .company_extraction("send a reminder to Acme Corp")
            .expect("render should succeed");

        assert!(rendered.contains("send a reminder to Acme Corp"));
        assert!(rendered.contains("\"NONE\""));
    }

    #[test]
    fn reminder_prompt_carries_all_invoice_fields() {
        let prompts = PromptLibrary::new().expect("templates should register");
        let rendered = prompts.payment_reminder(&invoice()).expect("render should succeed");

        assert!(rendered.contains("Acme Corp"));
        assert!(rendered.contains("inv_001"));
        assert!(rendered.contains("500.00"));
        assert!(rendered.contains("2026-08-19T10:00:00Z"));
        assert!(rendered.contains("10"));
    }
}
