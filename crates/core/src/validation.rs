//! Bounds checks and coarse injection guards for free text crossing a trust
//! boundary: the user utterance, the extracted company name, and model
//! generated email bodies. The deny lists are a guard for text that will be
//! spoken aloud or mailed out, not a full sanitizer.

use crate::errors::ValidationError;

/// Substrings rejected in user input (case-insensitive).
const USER_INPUT_DENY_LIST: &[&str] = &["<script", "javascript:", "onerror=", "onclick="];

/// Substrings that disqualify generated email content (case-insensitive).
const EMAIL_CONTENT_DENY_LIST: &[&str] = &["<script", "javascript:", "data:text/html"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValidationLimits {
    pub max_user_input_len: usize,
    pub max_company_name_len: usize,
    pub max_email_content_len: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self { max_user_input_len: 500, max_company_name_len: 100, max_email_content_len: 5000 }
    }
}

/// Validate one user utterance. Returns the trimmed text on success; the
/// result is idempotent for already-trimmed valid input.
pub fn validate_user_input(
    text: &str,
    limits: &ValidationLimits,
) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }
    if trimmed.chars().count() > limits.max_user_input_len {
        return Err(ValidationError::TooLong { max: limits.max_user_input_len });
    }

    let lowered = trimmed.to_ascii_lowercase();
    if USER_INPUT_DENY_LIST.iter().any(|pattern| lowered.contains(pattern)) {
        return Err(ValidationError::DeniedPattern);
    }

    Ok(trimmed.to_string())
}

/// Validate a company name against the character allow-list (alphanumerics,
/// whitespace, `. , - &`). Returns the trimmed name.
pub fn validate_company_name(
    name: &str,
    limits: &ValidationLimits,
) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyCompanyName);
    }
    if trimmed.chars().count() > limits.max_company_name_len {
        return Err(ValidationError::CompanyNameTooLong { max: limits.max_company_name_len });
    }

    let allowed = trimmed
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch.is_whitespace() || ".,-&".contains(ch));
    if !allowed {
        return Err(ValidationError::InvalidCompanyCharacters);
    }

    Ok(trimmed.to_string())
}

/// Predicate over model generated email content, not a fail-fast gate:
/// callers decide how to react to `false`.
pub fn validate_email_content(content: &str, limits: &ValidationLimits) -> bool {
    if content.chars().count() > limits.max_email_content_len {
        return false;
    }

    let lowered = content.to_ascii_lowercase();
    !EMAIL_CONTENT_DENY_LIST.iter().any(|pattern| lowered.contains(pattern))
}
