//! Domain model for Moneta.
//!
//! Transaction and settings types shared across the workspace, plus the
//! input sanitizer that every untrusted value passes through before it can
//! become persisted state.

mod sanitize;
mod settings;
mod transaction;

pub use sanitize::{
    FALLBACK_CATEGORY, MAX_AMOUNT, MAX_CATEGORY_LEN, MAX_DESCRIPTION_LEN, SanitizeError,
    SanitizeResult, sanitize_amount, sanitize_category, sanitize_date, sanitize_text,
    sanitize_transaction, sanitize_type,
};
pub use settings::Settings;
pub use transaction::{CreateTransactionDto, Transaction, TransactionType};
