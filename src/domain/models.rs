use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub const AMOUNT_MIN: u32 = 200;
pub const AMOUNT_MAX: u32 = 1000;
pub const AMOUNT_STEP: u32 = 100;
pub const TERM_MIN: u32 = 10;
pub const TERM_MAX: u32 = 30;
pub const TERM_STEP: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    pub fn parse(value: &str) -> Option<Gender> {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Persisted as a plain string; "" means not chosen yet.
fn serialize_gender<S>(gender: &Option<Gender>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(gender.map(|g| g.as_str()).unwrap_or(""))
}

fn deserialize_gender<'de, D>(deserializer: D) -> Result<Option<Gender>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Gender::parse))
}

/// The in-progress loan application, shared by every wizard step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationDraft {
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(serialize_with = "serialize_gender", deserialize_with = "deserialize_gender")]
    pub gender: Option<Gender>,
    pub workplace: String,
    pub address: String,
    pub amount: u32,
    pub term: u32,
}

impl Default for ApplicationDraft {
    fn default() -> Self {
        Self {
            phone: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            gender: None,
            workplace: String::new(),
            address: String::new(),
            amount: AMOUNT_MIN,
            term: TERM_MIN,
        }
    }
}

impl ApplicationDraft {
    pub fn personal_complete(&self) -> bool {
        !self.phone.is_empty()
            && !self.first_name.is_empty()
            && !self.last_name.is_empty()
            && self.gender.is_some()
    }

    pub fn address_complete(&self) -> bool {
        !self.workplace.is_empty() && !self.address.is_empty()
    }

    /// Shallow merge: every field present in the patch overwrites the draft.
    pub fn apply(&mut self, patch: DraftPatch) {
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(first_name) = patch.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            self.last_name = last_name;
        }
        if let Some(gender) = patch.gender {
            self.gender = Some(gender);
        }
        if let Some(workplace) = patch.workplace {
            self.workplace = workplace;
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(term) = patch.term {
            self.term = term;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftPatch {
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<Gender>,
    pub workplace: Option<String>,
    pub address: Option<String>,
    pub amount: Option<u32>,
    pub term: Option<u32>,
}

/// Wizard steps in the order they are filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    Personal,
    Address,
    Loan,
}

impl Step {
    pub fn title(&self) -> &'static str {
        match self {
            Step::Personal => "Personal Data",
            Step::Address => "Address and Workplace",
            Step::Loan => "Loan Parameters",
        }
    }

    pub fn fields(&self) -> &'static [Field] {
        match self {
            Step::Personal => &[Field::Phone, Field::FirstName, Field::LastName, Field::Gender],
            Step::Address => &[Field::Workplace, Field::Address],
            Step::Loan => &[Field::Amount, Field::Term],
        }
    }

    pub fn previous(&self) -> Option<Step> {
        match self {
            Step::Personal => None,
            Step::Address => Some(Step::Personal),
            Step::Loan => Some(Step::Address),
        }
    }

    pub fn next(&self) -> Option<Step> {
        match self {
            Step::Personal => Some(Step::Address),
            Step::Address => Some(Step::Loan),
            Step::Loan => None,
        }
    }

    pub fn number(&self) -> usize {
        match self {
            Step::Personal => 1,
            Step::Address => 2,
            Step::Loan => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Phone,
    FirstName,
    LastName,
    Gender,
    Workplace,
    Address,
    Amount,
    Term,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::Phone => "Phone number",
            Field::FirstName => "First name",
            Field::LastName => "Last name",
            Field::Gender => "Gender",
            Field::Workplace => "Workplace",
            Field::Address => "Residential address",
            Field::Amount => "Loan amount",
            Field::Term => "Loan term",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            Field::Phone => "+90 555 123 4567",
            Field::FirstName => "Ivan",
            Field::LastName => "Ivanov",
            Field::Gender => "Select your gender",
            Field::Workplace => "Select your workplace from the list",
            Field::Address => "100 Flushcombe Road, Albury, Spain 2148",
            Field::Amount => "",
            Field::Term => "",
        }
    }

    /// Fields edited by picking from a list rather than typing.
    pub fn is_choice(&self) -> bool {
        matches!(self, Field::Gender | Field::Workplace)
    }

    /// Fields with slider semantics.
    pub fn is_slider(&self) -> bool {
        matches!(self, Field::Amount | Field::Term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_draft() {
        let draft = ApplicationDraft::default();
        assert!(draft.phone.is_empty());
        assert!(draft.first_name.is_empty());
        assert!(draft.last_name.is_empty());
        assert_eq!(draft.gender, None);
        assert!(draft.workplace.is_empty());
        assert!(draft.address.is_empty());
        assert_eq!(draft.amount, 200);
        assert_eq!(draft.term, 10);
    }

    #[test]
    fn test_apply_overwrites_only_present_fields() {
        let mut draft = ApplicationDraft::default();
        draft.apply(DraftPatch {
            first_name: Some("Jane".to_string()),
            amount: Some(500),
            ..DraftPatch::default()
        });
        draft.apply(DraftPatch {
            first_name: Some("Janet".to_string()),
            last_name: Some("Doe".to_string()),
            ..DraftPatch::default()
        });

        assert_eq!(draft.first_name, "Janet");
        assert_eq!(draft.last_name, "Doe");
        assert_eq!(draft.amount, 500);
        assert_eq!(draft.term, 10);
    }

    #[test]
    fn test_draft_json_uses_camel_case_and_string_gender() {
        let draft = ApplicationDraft {
            first_name: "Jane".to_string(),
            gender: Some(Gender::Female),
            ..ApplicationDraft::default()
        };
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["firstName"], "Jane");
        assert_eq!(json["gender"], "female");
        assert_eq!(json["lastName"], "");

        let empty = serde_json::to_value(ApplicationDraft::default()).unwrap();
        assert_eq!(empty["gender"], "");
    }

    #[test]
    fn test_draft_deserializes_partial_json_with_defaults() {
        let draft: ApplicationDraft =
            serde_json::from_str(r#"{"firstName":"Jane","gender":""}"#).unwrap();
        assert_eq!(draft.first_name, "Jane");
        assert_eq!(draft.gender, None);
        assert_eq!(draft.amount, 200);
        assert_eq!(draft.term, 10);
    }

    #[test]
    fn test_completeness_checks() {
        let mut draft = ApplicationDraft::default();
        assert!(!draft.personal_complete());
        draft.phone = "5551234567".to_string();
        draft.first_name = "Jane".to_string();
        draft.last_name = "Doe".to_string();
        assert!(!draft.personal_complete());
        draft.gender = Some(Gender::Female);
        assert!(draft.personal_complete());
        assert!(!draft.address_complete());
        draft.workplace = "laptops".to_string();
        draft.address = "1 Main St".to_string();
        assert!(draft.address_complete());
    }

    #[test]
    fn test_step_order() {
        assert!(Step::Personal < Step::Address);
        assert!(Step::Address < Step::Loan);
        assert_eq!(Step::Loan.previous(), Some(Step::Address));
        assert_eq!(Step::Personal.previous(), None);
        assert_eq!(Step::Address.next(), Some(Step::Loan));
    }
}
