use thiserror::Error;

/// Rejected or unsafe free-text input. Recoverable per turn: the user
/// corrects the text and retries.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("input cannot be empty")]
    Empty,
    #[error("input too long, max {max} characters")]
    TooLong { max: usize },
    #[error("invalid input detected")]
    DeniedPattern,
    #[error("company name cannot be empty")]
    EmptyCompanyName,
    #[error("company name too long, max {max} characters")]
    CompanyNameTooLong { max: usize },
    #[error("company name contains invalid characters")]
    InvalidCompanyCharacters,
    #[error("generated email content failed validation")]
    UnsafeEmailContent,
}
