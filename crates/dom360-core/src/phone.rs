// ABOUTME: Phone number normalization between E.164 and national (CRM) formats
// ABOUTME: Validation, Brazilian display formatting and area code extraction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 DOM360

//! # Phone Normalizer
//!
//! The messaging channel identifies contacts by E.164 numbers (`+5524974023279`)
//! while the CRM stores them without the country code (`24974023279`).
//! Numbers that look Brazilian (two-digit area code plus 8 or 9 digits) and
//! carry no country code are assumed to be `+55`.

use regex::Regex;
use std::sync::LazyLock;

/// Brazilian country calling code, with the leading `+`
pub const BRAZIL_PREFIX: &str = "+55";

static E164_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\+[1-9]\d{1,14}$").ok());

static BRAZILIAN_NATIONAL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[1-9]{2}\d{8,9}$").ok());

/// Strip everything except digits and `+`
fn clean(phone: &str) -> String {
    phone
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Normalize to E.164 (`+5524974023279`)
///
/// Numbers already carrying a `+` are returned cleaned; Brazilian national
/// numbers get `+55`; anything else is returned cleaned but otherwise as is.
#[must_use]
pub fn normalize_to_e164(phone: &str) -> String {
    let cleaned = clean(phone);
    if cleaned.starts_with('+') {
        return cleaned;
    }
    let is_brazilian = BRAZILIAN_NATIONAL_PATTERN
        .as_ref()
        .is_some_and(|re| re.is_match(&cleaned));
    if is_brazilian {
        format!("{BRAZIL_PREFIX}{cleaned}")
    } else {
        cleaned
    }
}

/// Normalize to the national CRM format (`24974023279`)
#[must_use]
pub fn normalize_to_national(phone: &str) -> String {
    let cleaned = clean(phone);
    if let Some(national) = cleaned.strip_prefix(BRAZIL_PREFIX) {
        return national.to_owned();
    }
    cleaned
        .strip_prefix('+')
        .map_or_else(|| cleaned.clone(), str::to_owned)
}

/// Whether the value is a valid E.164 number
#[must_use]
pub fn is_valid_e164(phone: &str) -> bool {
    E164_PATTERN
        .as_ref()
        .is_some_and(|re| re.is_match(phone.trim()))
}

/// Format for display: `+55 (24) 97402-3279` for mobiles, `+55 (24) 7402-3279` for landlines
///
/// Non-Brazilian numbers are shown in plain E.164.
#[must_use]
pub fn format_display(phone: &str) -> String {
    let e164 = normalize_to_e164(phone);
    if let Some(number) = e164.strip_prefix(BRAZIL_PREFIX) {
        match number.len() {
            11 => {
                return format!(
                    "{BRAZIL_PREFIX} ({}) {}-{}",
                    &number[..2],
                    &number[2..7],
                    &number[7..]
                );
            }
            10 => {
                return format!(
                    "{BRAZIL_PREFIX} ({}) {}-{}",
                    &number[..2],
                    &number[2..6],
                    &number[6..]
                );
            }
            _ => {}
        }
    }
    e164
}

/// Two-digit area code (DDD) of a Brazilian number, if any
#[must_use]
pub fn area_code(phone: &str) -> Option<String> {
    let national = normalize_to_national(phone);
    national.get(..2).map(str::to_owned)
}
