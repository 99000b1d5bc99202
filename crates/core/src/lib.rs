pub mod config;
pub mod domain;
pub mod errors;
pub mod validation;
pub mod voice;

pub use domain::conversation::{ConversationLog, Message, Role};
pub use domain::intent::Intent;
pub use domain::invoice::Invoice;
pub use errors::ValidationError;
pub use validation::{
    validate_company_name, validate_email_content, validate_user_input, ValidationLimits,
};
