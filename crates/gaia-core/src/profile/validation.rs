//! Client-side validation and input masks for the personal-data step.
//!
//! Validation runs before any remote call; a failing form never reaches the
//! profile store.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::ProfilePatch;

pub const MIN_PHONE_DIGITS: usize = 10;

static PHONE_NOISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9+\s()-]").expect("phone pattern is valid"));
static DATE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}/\d{2}/\d{4}$").expect("date pattern is valid"));
pub const MIN_BIRTH_YEAR: i32 = 1900;

/// Age brackets offered by the preferences wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeRange {
    #[serde(rename = "18-24")]
    From18To24,
    #[serde(rename = "25-34")]
    From25To34,
    #[serde(rename = "35-44")]
    From35To44,
    #[serde(rename = "45-54")]
    From45To54,
    #[serde(rename = "55+")]
    From55,
}

impl AgeRange {
    pub const ALL: [AgeRange; 5] = [
        AgeRange::From18To24,
        AgeRange::From25To34,
        AgeRange::From35To44,
        AgeRange::From45To54,
        AgeRange::From55,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgeRange::From18To24 => "18-24",
            AgeRange::From25To34 => "25-34",
            AgeRange::From35To44 => "35-44",
            AgeRange::From45To54 => "45-54",
            AgeRange::From55 => "55+",
        }
    }
}

impl fmt::Display for AgeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgeRange::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("unknown age range: {s}"))
    }
}

/// Field-level validation failures, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("invalid fields: {}", .0.keys().cloned().collect::<Vec<_>>().join(", "))]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

impl ValidationErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }
}

/// Raw personal-data form as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonalInfoForm {
    pub full_name: String,
    pub phone: String,
    pub cpf: String,
    pub birth_date: String,
    pub state: String,
}

impl PersonalInfoForm {
    /// Validates every field and returns the cleaned patch to write.
    pub fn validate(&self, today: NaiveDate) -> Result<ProfilePatch, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if self.full_name.trim().is_empty() {
            errors.add("full_name", "Informe seu nome completo.");
        }
        if !is_valid_phone(&self.phone) {
            errors.add("phone", "Telefone inválido (coloque DDD).");
        }
        if !is_valid_cpf(&self.cpf) {
            errors.add("cpf", "CPF inválido.");
        }
        if !is_valid_birth_date(&self.birth_date, today) {
            errors.add("birth_date", "Data inválida (DD/MM/AAAA).");
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ProfilePatch {
            full_name: Some(self.full_name.trim().to_string()),
            phone: Some(clean_phone(&self.phone)),
            cpf: Some(digits_only(&self.cpf)),
            birth_date: Some(self.birth_date.trim().to_string()),
            state: Some(self.state.trim().to_string()),
            ..Default::default()
        })
    }
}

pub fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Keeps digits, `+`, spaces, parentheses and dashes.
pub fn clean_phone(value: &str) -> String {
    PHONE_NOISE.replace_all(value, "").trim().to_string()
}

pub fn is_valid_phone(value: &str) -> bool {
    digits_only(value).len() >= MIN_PHONE_DIGITS
}

/// Brazilian CPF check: 11 digits, not all equal, both mod-11 check digits.
pub fn is_valid_cpf(value: &str) -> bool {
    let digits: Vec<u32> = digits_only(value)
        .chars()
        .filter_map(|c| c.to_digit(10))
        .collect();
    if digits.len() != 11 {
        return false;
    }
    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    let check = |base: &[u32], factor: u32| -> u32 {
        let sum: u32 = base
            .iter()
            .enumerate()
            .map(|(i, d)| d * (factor - i as u32))
            .sum();
        let m = (sum * 10) % 11;
        if m == 10 {
            0
        } else {
            m
        }
    };

    check(&digits[..9], 10) == digits[9] && check(&digits[..10], 11) == digits[10]
}

/// `DD/MM/YYYY`, a real calendar day, year between 1900 and the current year.
pub fn is_valid_birth_date(value: &str, today: NaiveDate) -> bool {
    let s = value.trim();
    if !DATE_SHAPE.is_match(s) {
        return false;
    }
    let mut parts = s.split('/').map(|p| p.parse::<u32>().unwrap_or(0));
    let (dd, mm, yyyy) = match (parts.next(), parts.next(), parts.next()) {
        (Some(d), Some(m), Some(y)) => (d, m, y as i32),
        _ => return false,
    };
    if yyyy < MIN_BIRTH_YEAR || yyyy > today.year() {
        return false;
    }
    NaiveDate::from_ymd_opt(yyyy, mm, dd).is_some()
}

/// Progressive `DD/MM/YYYY` mask over at most eight digits.
pub fn format_birth_date(value: &str) -> String {
    let digits: String = digits_only(value).chars().take(8).collect();
    let mut parts = Vec::new();
    if !digits.is_empty() {
        parts.push(&digits[..digits.len().min(2)]);
    }
    if digits.len() >= 3 {
        parts.push(&digits[2..digits.len().min(4)]);
    }
    if digits.len() >= 5 {
        parts.push(&digits[4..]);
    }
    parts.join("/")
}

/// Progressive `###.###.###-##` mask over at most eleven digits.
pub fn format_cpf(value: &str) -> String {
    let digits: String = digits_only(value).chars().take(11).collect();
    let mut parts = Vec::new();
    if !digits.is_empty() {
        parts.push(&digits[..digits.len().min(3)]);
    }
    if digits.len() >= 4 {
        parts.push(&digits[3..digits.len().min(6)]);
    }
    if digits.len() >= 7 {
        parts.push(&digits[6..digits.len().min(9)]);
    }
    let mut out = parts.join(".");
    if digits.len() >= 10 {
        out.push('-');
        out.push_str(&digits[9..]);
    }
    out
}
