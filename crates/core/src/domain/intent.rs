/// Closed classification tag describing what the user wants for one turn.
///
/// Produced by normalizing free-text model output; any value outside the
/// closed set maps to `Other`. Parsing is deliberately isolated from the
/// dispatch logic so it can be exercised with canned generation outputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    CheckInvoices,
    SendReminder,
    Help,
    Other,
}

impl Intent {
    /// Normalize raw model output: trim, lowercase, match the closed set.
    pub fn from_model_output(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "check_invoices" => Self::CheckInvoices,
            "send_reminder" => Self::SendReminder,
            "help" => Self::Help,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CheckInvoices => "check_invoices",
            Self::SendReminder => "send_reminder",
            Self::Help => "help",
            Self::Other => "other",
        }
    }
}
