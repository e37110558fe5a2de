//! Input sanitization for untrusted transaction data.
//!
//! Every raw value is normalized before it can reach persisted state:
//! text is stripped of script/handler patterns, HTML-escaped and capped;
//! categories are restricted to a safe character set; amounts are bounded.
//! Only amount violations reject the record — everything else normalizes.

use crate::transaction::{CreateTransactionDto, Transaction, TransactionType};
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

/// Maximum description length in characters.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Maximum category length in characters.
pub const MAX_CATEGORY_LEN: usize = 50;

/// Amount ceiling; anything above is rejected as implausible.
pub const MAX_AMOUNT: f64 = 999_999_999.0;

/// Category assigned when sanitization leaves nothing usable.
pub const FALLBACK_CATEGORY: &str = "other";

/// Result type for sanitization.
pub type SanitizeResult<T> = Result<T, SanitizeError>;

/// Input violations that reject a record outright.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SanitizeError {
    #[error("amount must be a finite number")]
    NonFiniteAmount,

    #[error("amount must be positive")]
    NonPositiveAmount,

    #[error("amount exceeds the maximum of {MAX_AMOUNT}")]
    AmountOverLimit,
}

/// Sanitizes a full transaction DTO into a persistable [`Transaction`].
///
/// `now` doubles as the record's creation time and the fallback for a
/// missing or invalid date.
pub fn sanitize_transaction(
    dto: &CreateTransactionDto,
    now: DateTime<Utc>,
) -> SanitizeResult<Transaction> {
    let amount = sanitize_amount(dto.amount)?;

    Ok(Transaction {
        id: uuid::Uuid::new_v4().to_string(),
        tx_type: sanitize_type(&dto.tx_type),
        amount,
        category: sanitize_category(&dto.category),
        description: dto
            .description
            .as_deref()
            .map(sanitize_text)
            .unwrap_or_default(),
        date: sanitize_date(dto.date.as_deref(), now),
        created_at: now,
    })
}

/// Coerces and bounds a raw amount: negatives become positive via absolute
/// value; zero and out-of-range values are rejected.
pub fn sanitize_amount(raw: f64) -> SanitizeResult<f64> {
    if !raw.is_finite() {
        return Err(SanitizeError::NonFiniteAmount);
    }
    let amount = raw.abs();
    if amount == 0.0 {
        return Err(SanitizeError::NonPositiveAmount);
    }
    if amount > MAX_AMOUNT {
        return Err(SanitizeError::AmountOverLimit);
    }
    Ok(amount)
}

/// Normalizes free text: strips `<script>` blocks, `javascript:` URIs and
/// inline `on*=` handlers, HTML-escapes what remains, caps the length.
pub fn sanitize_text(raw: &str) -> String {
    let stripped = strip_script_blocks(raw);
    let stripped = strip_ci(&stripped, "javascript:");
    let stripped = strip_event_handlers(&stripped);

    let escaped: String = stripped
        .chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&#x27;".to_string(),
            c => c.to_string(),
        })
        .collect();

    escaped.chars().take(MAX_DESCRIPTION_LEN).collect()
}

/// Restricts a category to lowercase alphanumerics, space, `-` and `_`,
/// capped at 50 characters. An empty result maps to the fallback category.
pub fn sanitize_category(raw: &str) -> String {
    let cleaned: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .take(MAX_CATEGORY_LEN)
        .collect();

    let trimmed = cleaned.trim().to_string();
    if trimmed.is_empty() {
        FALLBACK_CATEGORY.to_string()
    } else {
        trimmed
    }
}

/// Parses a user-supplied date (RFC 3339 or `YYYY-MM-DD`), falling back to
/// `now` when absent or not a real calendar date.
pub fn sanitize_date(raw: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    let Some(raw) = raw else { return now };
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.with_timezone(&Utc);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return DateTime::from_naive_utc_and_offset(date.and_hms_opt(0, 0, 0).unwrap(), Utc);
    }
    now
}

/// Maps a raw type string onto [`TransactionType`], defaulting to `Expense`.
pub fn sanitize_type(raw: &str) -> TransactionType {
    match raw.trim().to_lowercase().as_str() {
        "income" => TransactionType::Income,
        _ => TransactionType::Expense,
    }
}

// ── Pattern stripping ────────────────────────────────────────────
// Scanner-based: the patterns of interest are ASCII, so byte-wise
// case-insensitive search keeps char boundaries intact.

/// Byte offset of the first case-insensitive occurrence of `needle`.
fn find_ci(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || h.len() < n.len() {
        return None;
    }
    (from..=h.len() - n.len()).find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}

/// Removes every case-insensitive occurrence of `needle`.
fn strip_ci(input: &str, needle: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pos = 0;
    while let Some(start) = find_ci(input, needle, pos) {
        out.push_str(&input[pos..start]);
        pos = start + needle.len();
    }
    out.push_str(&input[pos..]);
    out
}

/// Removes `<script … </script>` blocks, including their content. An
/// unterminated opening tag swallows the rest of the input.
fn strip_script_blocks(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pos = 0;
    while let Some(start) = find_ci(input, "<script", pos) {
        out.push_str(&input[pos..start]);
        match find_ci(input, "</script>", start) {
            Some(end) => pos = end + "</script>".len(),
            None => return out,
        }
    }
    out.push_str(&input[pos..]);
    out
}

/// Removes inline event-handler patterns (`onclick=`, `onerror =`, …).
fn strip_event_handlers(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut pos = 0;

    while pos < bytes.len() {
        if let Some(len) = handler_len(&input[pos..]) {
            pos += len;
            continue;
        }
        // Advance one full character
        let ch_len = input[pos..].chars().next().map_or(1, char::len_utf8);
        out.push_str(&input[pos..pos + ch_len]);
        pos += ch_len;
    }
    out
}

/// If `s` starts with `on<letters><spaces>=`, returns the pattern length.
fn handler_len(s: &str) -> Option<usize> {
    let b = s.as_bytes();
    if b.len() < 4 || !b[..2].eq_ignore_ascii_case(b"on") {
        return None;
    }
    let mut i = 2;
    while i < b.len() && b[i].is_ascii_alphabetic() {
        i += 1;
    }
    if i == 2 {
        return None; // "on" with no event name
    }
    let name_end = i;
    while i < b.len() && (b[i] == b' ' || b[i] == b'\t') {
        i += 1;
    }
    if i < b.len() && b[i] == b'=' && name_end > 2 {
        Some(i + 1)
    } else {
        None
    }
}
