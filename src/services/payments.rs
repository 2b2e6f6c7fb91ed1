use chrono::{Datelike, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::entities::order::PaymentMethod;
use crate::errors::FieldErrors;

static EXPIRY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2}/\d{2}$").unwrap());
static CVV_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{3,4}$").unwrap());

/// Card fields as submitted at checkout. Only the `card` payment method
/// reads these; they are validated, reduced to a last-four snapshot, and
/// discarded.
#[derive(Clone, Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CardPaymentInput {
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub card_name: String,
    /// MM/YY
    #[serde(default)]
    pub expiry_date: String,
    #[serde(default)]
    pub cvv: String,
}

/// Payment details as a sum type over the payment method, so each method
/// carries exactly the fields it requires.
#[derive(Clone, Debug)]
pub enum PaymentDetails {
    Card(CardPaymentInput),
    Transfer,
    Cash,
}

impl PaymentDetails {
    /// Pairs the declared method with the conditionally-present card
    /// payload. A missing card payload becomes an all-empty one so that
    /// validation reports every missing field instead of a parse error.
    pub fn from_request(method: PaymentMethod, card: Option<CardPaymentInput>) -> Self {
        match method {
            PaymentMethod::Card => PaymentDetails::Card(card.unwrap_or_default()),
            PaymentMethod::Transfer => PaymentDetails::Transfer,
            PaymentMethod::Cash => PaymentDetails::Cash,
        }
    }

    pub fn method(&self) -> PaymentMethod {
        match self {
            PaymentDetails::Card(_) => PaymentMethod::Card,
            PaymentDetails::Transfer => PaymentMethod::Transfer,
            PaymentDetails::Cash => PaymentMethod::Cash,
        }
    }
}

/// Luhn checksum over a digits-only string.
pub fn luhn_valid(digits: &str) -> bool {
    let mut sum = 0u32;
    for (i, ch) in digits.chars().rev().enumerate() {
        let Some(d) = ch.to_digit(10) else {
            return false;
        };
        let d = if i % 2 == 1 {
            let doubled = d * 2;
            if doubled > 9 {
                doubled - 9
            } else {
                doubled
            }
        } else {
            d
        };
        sum += d;
    }
    sum % 10 == 0
}

/// Validates a payment payload against the rules of its method, collecting
/// every violation keyed by field. Pure check, no side effects; the clock
/// is the server's local calendar.
pub fn validate_payment(details: &PaymentDetails) -> FieldErrors {
    let now = Local::now();
    validate_payment_at(details, now.month(), now.year().rem_euclid(100) as u32)
}

/// Same as [`validate_payment`] but with an explicit current month and
/// two-digit year, so expiry behavior is reproducible in tests.
pub fn validate_payment_at(
    details: &PaymentDetails,
    current_month: u32,
    current_year: u32,
) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let card = match details {
        PaymentDetails::Card(card) => card,
        // transfer and cash need nothing beyond the method tag
        PaymentDetails::Transfer | PaymentDetails::Cash => return errors,
    };

    let number: String = card
        .card_number
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if number.is_empty() {
        errors.add("payment.card_number", "The card number is required");
    } else if !number.chars().all(|c| c.is_ascii_digit()) {
        errors.add("payment.card_number", "The card number may only contain digits");
    } else if number.len() < 13 || number.len() > 19 {
        errors.add("payment.card_number", "The card number must be 13 to 19 digits");
    } else if !luhn_valid(&number) {
        errors.add("payment.card_number", "The card number is invalid");
    }

    if !EXPIRY_RE.is_match(&card.expiry_date) {
        errors.add("payment.expiry_date", "The expiry date must be in MM/YY format");
    } else {
        // the regex guarantees both halves parse
        let month: u32 = card.expiry_date[..2].parse().unwrap_or(0);
        let year: u32 = card.expiry_date[3..].parse().unwrap_or(0);
        if !(1..=12).contains(&month) {
            errors.add("payment.expiry_date", "The expiry month is invalid");
        } else if year < current_year || (year == current_year && month < current_month) {
            errors.add("payment.expiry_date", "The card has expired");
        }
    }

    if !CVV_RE.is_match(&card.cvv) {
        errors.add("payment.cvv", "The CVV must be 3 or 4 digits");
    }

    if card.card_name.trim().is_empty() {
        errors.add("payment.card_name", "The cardholder name is required");
    }

    errors
}

/// Builds the payment-details blob persisted on the order. Card numbers
/// are reduced to their last four digits; the raw number and CVV never
/// reach storage.
pub fn payment_snapshot(details: &PaymentDetails) -> serde_json::Value {
    match details {
        PaymentDetails::Card(card) => {
            let number: String = card
                .card_number
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            let last_four = if number.len() >= 4 {
                number[number.len() - 4..].to_string()
            } else {
                number
            };
            json!({
                "method": "card",
                "card_last_four": last_four,
                "card_name": card.card_name.trim(),
            })
        }
        PaymentDetails::Transfer => json!({
            "method": "transfer",
            "instructions": "Transfer the total amount to our bank account, quoting the order number as the payment reference.",
        }),
        PaymentDetails::Cash => json!({
            "method": "cash",
            "instructions": "Pay the courier in cash on delivery.",
        }),
    }
}
