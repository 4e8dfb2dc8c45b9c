//! Form field checks. Each failure carries the text shown next to the field.

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::currency;

pub(crate) const MAX_NAME_LEN: usize = 50;
pub(crate) const MAX_DESCRIPTION_LEN: usize = 200;

/// Largest amount or balance a form accepts: 1,000,000,000,000.
pub(crate) const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub(crate) enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("Enter a valid amount")]
    InvalidAmount,
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,
    #[error("Amount can have at most 2 decimal places")]
    TooPrecise,
    #[error("Amount cannot exceed 1,000,000,000,000")]
    TooLarge,
    #[error("Date must be in YYYY-MM-DD format")]
    InvalidDate,
    #[error("{0} is in the future")]
    FutureDate(NaiveDate),
    #[error("Enter a valid email address")]
    InvalidEmail,
    #[error("Enter a valid phone number")]
    InvalidPhone,
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),
    #[error("Passcode must be 4 to 6 digits")]
    InvalidPasscode,
    #[error("Colors look like #4CAF50")]
    InvalidColor,
}

/// Errors keyed by the form field they belong to.
pub(crate) type FieldErrors = Vec<(&'static str, ValidationError)>;

static EMAIL_RE: OnceLock<Option<Regex>> = OnceLock::new();
static PHONE_RE: OnceLock<Option<Regex>> = OnceLock::new();
static PASSCODE_RE: OnceLock<Option<Regex>> = OnceLock::new();
static COLOR_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn is_match(cell: &OnceLock<Option<Regex>>, pattern: &str, input: &str) -> bool {
    cell.get_or_init(|| Regex::new(pattern).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(input))
}

/// Parse a positive money amount. Thousands separators are accepted.
pub(crate) fn parse_amount(input: &str) -> Result<Decimal, ValidationError> {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Err(ValidationError::Required("Amount"));
    }
    let amount = Decimal::from_str(&cleaned).map_err(|_| ValidationError::InvalidAmount)?;
    if amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount);
    }
    if amount > MAX_AMOUNT {
        return Err(ValidationError::TooLarge);
    }
    if amount.normalize().scale() > 2 {
        return Err(ValidationError::TooPrecise);
    }
    Ok(amount)
}

/// Trimmed, non-empty text of at most `max` characters.
pub(crate) fn required_text(
    field: &'static str,
    input: &str,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required(field));
    }
    optional_text(field, trimmed, max)
}

pub(crate) fn optional_text(
    field: &'static str,
    input: &str,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(trimmed.to_string())
}

/// A `YYYY-MM-DD` date no later than `today`. Empty input means today.
pub(crate) fn parse_date(input: &str, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(today);
    }
    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate)?;
    if date > today {
        return Err(ValidationError::FutureDate(date));
    }
    Ok(date)
}

/// Empty is allowed; profile emails are optional.
pub(crate) fn validate_email(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || is_match(&EMAIL_RE, r"^[^\s@]+@[^\s@]+\.[^\s@]+$", trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

/// 7 to 15 digits with optional leading `+`, spaces and dashes. Empty is allowed.
pub(crate) fn validate_phone(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    let digits = trimmed.chars().filter(|c| c.is_ascii_digit()).count();
    if is_match(&PHONE_RE, r"^\+?[0-9][0-9 \-]*$", trimmed) && (7..=15).contains(&digits) {
        Ok(trimmed.to_string())
    } else {
        Err(ValidationError::InvalidPhone)
    }
}

/// Uppercased code of a supported currency.
pub(crate) fn validate_currency(input: &str) -> Result<String, ValidationError> {
    match currency::lookup(input) {
        Some(info) => Ok(info.code.to_string()),
        None => Err(ValidationError::UnknownCurrency(input.trim().to_uppercase())),
    }
}

/// A `#RRGGBB` swatch, uppercased.
pub(crate) fn validate_color(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if is_match(&COLOR_RE, r"^#[0-9A-Fa-f]{6}$", trimmed) {
        Ok(trimmed.to_uppercase())
    } else {
        Err(ValidationError::InvalidColor)
    }
}

/// An account balance: any sign, at most 2 decimal places.
pub(crate) fn parse_balance(input: &str) -> Result<Decimal, ValidationError> {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Err(ValidationError::Required("Balance"));
    }
    let balance = Decimal::from_str(&cleaned).map_err(|_| ValidationError::InvalidAmount)?;
    if balance.abs() > MAX_AMOUNT {
        return Err(ValidationError::TooLarge);
    }
    if balance.normalize().scale() > 2 {
        return Err(ValidationError::TooPrecise);
    }
    Ok(balance)
}

pub(crate) fn validate_passcode(input: &str) -> Result<(), ValidationError> {
    if is_match(&PASSCODE_RE, r"^[0-9]{4,6}$", input) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPasscode)
    }
}

/// Raw text of the add/edit expense form.
#[derive(Debug, Clone, Default)]
pub(crate) struct ExpenseForm {
    pub(crate) amount: String,
    /// Merchant or category text; resolved to a category later.
    pub(crate) merchant: String,
    pub(crate) description: String,
    pub(crate) date: String,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ValidExpense {
    pub(crate) amount: Decimal,
    pub(crate) merchant: String,
    pub(crate) description: String,
    pub(crate) date: NaiveDate,
}

impl ExpenseForm {
    /// Check every field, reporting all failures at once.
    pub(crate) fn validate(&self, today: NaiveDate) -> Result<ValidExpense, FieldErrors> {
        let mut errors = FieldErrors::new();

        let amount = parse_amount(&self.amount).map_err(|e| errors.push(("amount", e))).ok();
        let merchant = required_text("Merchant", &self.merchant, MAX_NAME_LEN)
            .map_err(|e| errors.push(("merchant", e)))
            .ok();
        let description = optional_text("Description", &self.description, MAX_DESCRIPTION_LEN)
            .map_err(|e| errors.push(("description", e)))
            .ok();
        let date = parse_date(&self.date, today).map_err(|e| errors.push(("date", e))).ok();

        match (amount, merchant, description, date) {
            (Some(amount), Some(merchant), Some(description), Some(date)) => Ok(ValidExpense {
                amount,
                merchant,
                description,
                date,
            }),
            _ => Err(errors),
        }
    }
}

/// Render field errors as one line per field, for toasts and CLI output.
pub(crate) fn describe(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, e)| format!("{field}: {e}"))
        .collect::<Vec<_>>()
        .join("; ")
}
