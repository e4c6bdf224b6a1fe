//! Per-step edit buffers and the rules that gate each step transition.
//!
//! A buffer holds what the user has typed on one screen. Nothing reaches the
//! shared draft until the buffer validates, except on Back where the raw
//! values are kept as-is.

use super::errors::{ValidationErrors, ValidationResult};
use super::models::{
    AMOUNT_MAX, AMOUNT_MIN, AMOUNT_STEP, ApplicationDraft, DraftPatch, Field, Gender, TERM_MAX,
    TERM_MIN, TERM_STEP,
};

const PHONE_MIN_LEN: usize = 6;
const PHONE_MAX_LEN: usize = 16;

/// Letters, whitespace, hyphens and apostrophes.
fn is_name_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c.is_whitespace() || c == '-' || c == '\''
}

fn check_name(errors: &mut ValidationErrors, field: Field, value: &str, label: &str) {
    if value.is_empty() {
        errors.add(field, format!("{label} is required"));
    } else if !value.chars().all(is_name_char) {
        errors.add(
            field,
            format!("{label} can only contain english letters, spaces, hyphens, and apostrophes"),
        );
    }
}

fn check_bounded(
    errors: &mut ValidationErrors,
    field: Field,
    raw: &str,
    label: &str,
    min: u32,
    max: u32,
) -> Option<u32> {
    let raw = raw.trim();
    match raw.parse::<u32>() {
        Ok(value) if (min..=max).contains(&value) => Some(value),
        _ if is_integer(raw) => {
            errors.add(field, format!("{label} must be between {min} and {max}"));
            None
        }
        _ => {
            errors.add(field, format!("{label} must be a whole number"));
            None
        }
    }
}

/// Optional minus sign followed by at least one digit, of any length.
fn is_integer(raw: &str) -> bool {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Moves a slider value by `delta` steps, snapping into `[min, max]`.
/// Unparseable input restarts from `min`.
fn nudge(raw: &str, delta: i64, step: u32, min: u32, max: u32) -> String {
    let current = raw.trim().parse::<i64>().unwrap_or(min as i64);
    let next = current
        .saturating_add(delta.saturating_mul(step as i64))
        .clamp(min as i64, max as i64);
    next.to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonalForm {
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<Gender>,
}

impl PersonalForm {
    pub fn from_draft(draft: &ApplicationDraft) -> Self {
        Self {
            phone: draft.phone.clone(),
            first_name: draft.first_name.clone(),
            last_name: draft.last_name.clone(),
            gender: draft.gender,
        }
    }

    pub fn validate(&self) -> ValidationResult<DraftPatch> {
        let mut errors = ValidationErrors::new();
        let phone = self.phone.trim();
        let first_name = self.first_name.trim();
        let last_name = self.last_name.trim();

        let phone_len = phone.chars().count();
        if phone_len < PHONE_MIN_LEN {
            errors.add(Field::Phone, "Phone number must be at least 5 digits");
        } else if phone_len > PHONE_MAX_LEN {
            errors.add(Field::Phone, "Phone number must be at most 15 digits");
        }
        check_name(&mut errors, Field::FirstName, first_name, "First name");
        check_name(&mut errors, Field::LastName, last_name, "Last name");
        if self.gender.is_none() {
            errors.add(Field::Gender, "Gender is required");
        }

        errors.into_result(DraftPatch {
            phone: Some(phone.to_string()),
            first_name: Some(first_name.to_string()),
            last_name: Some(last_name.to_string()),
            gender: self.gender,
            ..DraftPatch::default()
        })
    }

    pub fn to_patch(&self) -> DraftPatch {
        DraftPatch {
            phone: Some(self.phone.clone()),
            first_name: Some(self.first_name.clone()),
            last_name: Some(self.last_name.clone()),
            gender: self.gender,
            ..DraftPatch::default()
        }
    }

    pub fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Phone => Some(&mut self.phone),
            Field::FirstName => Some(&mut self.first_name),
            Field::LastName => Some(&mut self.last_name),
            _ => None,
        }
    }

    pub fn cycle_gender(&mut self, forward: bool) {
        self.gender = Some(match (self.gender, forward) {
            (None, true) | (Some(Gender::Female), true) => Gender::Male,
            (None, false) | (Some(Gender::Male), _) => Gender::Female,
            (Some(Gender::Female), false) => Gender::Male,
        });
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressForm {
    pub workplace: String,
    pub address: String,
}

impl AddressForm {
    pub fn from_draft(draft: &ApplicationDraft) -> Self {
        Self {
            workplace: draft.workplace.clone(),
            address: draft.address.clone(),
        }
    }

    /// `categories` is the list the workplace must be chosen from.
    pub fn validate(&self, categories: &[String]) -> ValidationResult<DraftPatch> {
        let mut errors = ValidationErrors::new();
        let workplace = self.workplace.trim();
        let address = self.address.trim();

        if workplace.is_empty() {
            errors.add(Field::Workplace, "Workplace is required");
        } else if !categories.iter().any(|c| c == workplace) {
            errors.add(Field::Workplace, "Select a workplace from the list");
        }
        if address.is_empty() {
            errors.add(Field::Address, "Residential address is required");
        }

        errors.into_result(DraftPatch {
            workplace: Some(workplace.to_string()),
            address: Some(address.to_string()),
            ..DraftPatch::default()
        })
    }

    pub fn to_patch(&self) -> DraftPatch {
        DraftPatch {
            workplace: Some(self.workplace.clone()),
            address: Some(self.address.clone()),
            ..DraftPatch::default()
        }
    }

    pub fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Address => Some(&mut self.address),
            _ => None,
        }
    }

    /// Picks the neighbouring category, wrapping around the list.
    pub fn cycle_workplace(&mut self, categories: &[String], forward: bool) {
        if categories.is_empty() {
            return;
        }
        let len = categories.len();
        let next = match categories.iter().position(|c| *c == self.workplace) {
            Some(i) if forward => (i + 1) % len,
            Some(i) => (i + len - 1) % len,
            None if forward => 0,
            None => len - 1,
        };
        self.workplace = categories[next].clone();
    }
}

/// Loan parameters are edited as text so that typed values can be rejected
/// with a message instead of being silently clamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanForm {
    pub amount: String,
    pub term: String,
}

impl Default for LoanForm {
    fn default() -> Self {
        Self::from_draft(&ApplicationDraft::default())
    }
}

impl LoanForm {
    pub fn from_draft(draft: &ApplicationDraft) -> Self {
        Self {
            amount: draft.amount.to_string(),
            term: draft.term.to_string(),
        }
    }

    pub fn validate(&self) -> ValidationResult<DraftPatch> {
        let mut errors = ValidationErrors::new();
        let amount = check_bounded(
            &mut errors,
            Field::Amount,
            &self.amount,
            "Amount",
            AMOUNT_MIN,
            AMOUNT_MAX,
        );
        let term = check_bounded(&mut errors, Field::Term, &self.term, "Term", TERM_MIN, TERM_MAX);

        errors.into_result(DraftPatch {
            amount,
            term,
            ..DraftPatch::default()
        })
    }

    /// Keeps whatever parses; a half-typed number is dropped rather than stored.
    pub fn to_patch(&self) -> DraftPatch {
        DraftPatch {
            amount: self.amount.trim().parse().ok(),
            term: self.term.trim().parse().ok(),
            ..DraftPatch::default()
        }
    }

    pub fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Amount => Some(&mut self.amount),
            Field::Term => Some(&mut self.term),
            _ => None,
        }
    }

    pub fn slide(&mut self, field: Field, delta: i64) {
        match field {
            Field::Amount => {
                self.amount = nudge(&self.amount, delta, AMOUNT_STEP, AMOUNT_MIN, AMOUNT_MAX)
            }
            Field::Term => self.term = nudge(&self.term, delta, TERM_STEP, TERM_MIN, TERM_MAX),
            _ => {}
        }
    }
}
