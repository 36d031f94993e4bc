use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Card network inferred from the leading digits of the card number.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum CardNetwork {
    Visa,
    Mastercard,
    Amex,
    Discover,
    Unknown,
}

impl fmt::Display for CardNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CardNetwork::Visa => "visa",
            CardNetwork::Mastercard => "mastercard",
            CardNetwork::Amex => "amex",
            CardNetwork::Discover => "discover",
            CardNetwork::Unknown => "unknown",
        };
        write!(f, "{name}")
    }
}

/// Card details collected for a single validation + settlement call.
///
/// Transient by design: never persisted, never logged in full.
#[derive(Debug, Clone, PartialEq)]
pub struct CardDetails {
    pub number: String,
    pub holder: String,
    pub expiry_month: u32,
    pub expiry_year: u32,
    pub cvv: String,
}

/// Removes all whitespace from a card number.
pub fn strip(number: &str) -> String {
    number.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Detects the card network from the (whitespace-stripped) number.
pub fn detect_network(number: &str) -> CardNetwork {
    let cleaned = strip(number);

    if cleaned.starts_with('4') {
        return CardNetwork::Visa;
    }
    if in_prefix_range(&cleaned, 51, 55) || in_prefix_range(&cleaned, 22, 27) {
        return CardNetwork::Mastercard;
    }
    if cleaned.starts_with("34") || cleaned.starts_with("37") {
        return CardNetwork::Amex;
    }
    if cleaned.starts_with("6011") || cleaned.starts_with("65") {
        return CardNetwork::Discover;
    }

    CardNetwork::Unknown
}

fn in_prefix_range(cleaned: &str, lo: u32, hi: u32) -> bool {
    cleaned
        .get(..2)
        .and_then(|p| p.parse::<u32>().ok())
        .is_some_and(|p| (lo..=hi).contains(&p))
}

/// Validates a card number: digits only, length 13..=19, Luhn checksum.
pub fn validate_number(number: &str) -> bool {
    let cleaned = strip(number);

    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    if cleaned.len() < 13 || cleaned.len() > 19 {
        return false;
    }

    luhn_checksum(&cleaned) % 10 == 0
}

/// Luhn checksum over an all-digit string: right to left, double every
/// second digit, subtract 9 when a doubled digit exceeds 9, sum everything.
fn luhn_checksum(digits: &str) -> u32 {
    digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let mut d = u32::from(b - b'0');
            if i % 2 == 1 {
                d *= 2;
                if d > 9 {
                    d -= 9;
                }
            }
            d
        })
        .sum()
}

/// Validates an expiry date against the current month (UTC).
///
/// A card expiring in the current month is still valid. Two-digit years are
/// interpreted as `2000 + YY`.
pub fn validate_expiry(month: u32, year: u32) -> bool {
    let now = Utc::now();
    expiry_is_valid_at(month, year, now.year(), now.month())
}

/// Deterministic core of [`validate_expiry`], checked against an explicit
/// "now" so the rule can be tested without the wall clock.
pub fn expiry_is_valid_at(month: u32, year: u32, now_year: i32, now_month: u32) -> bool {
    if !(1..=12).contains(&month) {
        return false;
    }

    let full_year = if year < 100 { 2000 + year as i32 } else { year as i32 };

    if full_year < now_year {
        return false;
    }
    if full_year == now_year && month < now_month {
        return false;
    }

    true
}

/// Validates a CVV against the network: 4 digits for Amex, 3 otherwise.
pub fn validate_cvv(cvv: &str, network: CardNetwork) -> bool {
    if cvv.is_empty() || !cvv.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    match network {
        CardNetwork::Amex => cvv.len() == 4,
        _ => cvv.len() == 3,
    }
}

/// Groups the stripped digits into blocks of 4 for display.
pub fn format_number(number: &str) -> String {
    let chars: Vec<char> = strip(number).chars().collect();
    chars
        .chunks(4)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Masks a card number, showing only the last 4 digits.
pub fn mask_number(number: &str) -> String {
    let cleaned = strip(number);
    if cleaned.chars().count() < 4 {
        return number.to_string();
    }
    format!("**** **** **** {}", last4(number))
}

/// Last 4 characters of the stripped number (the whole string if shorter).
///
/// Runs before validation in the gateway, so it must tolerate arbitrary
/// input, not just digits.
pub fn last4(number: &str) -> String {
    let cleaned = strip(number);
    let skip = cleaned.chars().count().saturating_sub(4);
    cleaned.chars().skip(skip).collect()
}
