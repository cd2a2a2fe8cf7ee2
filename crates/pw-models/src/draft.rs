//! Draft sections
//!
//! A draft is a partially written [`UserRecord`](crate::UserRecord) keyed by
//! section. Each section is stored on its own as soon as its step is submitted.

use chrono::{DateTime, NaiveDate, Utc};
use pw_core::types::UserId;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::section::Section;
use crate::user::{Avatar, Skill};

/// Step 1: account fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct AccountSection {
    pub avatar: Option<Avatar>,

    #[validate(length(min = 1, message = "Required field"))]
    pub name: String,

    #[validate(length(min = 1, message = "Required field"))]
    pub password: String,

    #[serde(rename = "repeatpassword")]
    #[validate(length(min = 1, message = "Required field"))]
    pub repeat_password: String,
}

/// Step 2: personal fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ProfileSection {
    #[validate(length(min = 1, message = "Required field"))]
    pub firstname: String,

    #[validate(length(min = 1, message = "Required field"))]
    pub lastname: String,

    #[serde(rename = "dateofbirth")]
    pub date_of_birth: Option<NaiveDate>,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub gender: String,
}

/// Step 3: contact fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ContactsSection {
    #[validate(length(min = 1, message = "Required field"))]
    pub company: String,

    #[serde(default)]
    pub fax: Option<String>,
    #[serde(default)]
    pub facebook: Option<String>,
    #[serde(default)]
    pub phone1: Option<String>,
    #[serde(default)]
    pub phone2: Option<String>,
    #[serde(default)]
    pub phone3: Option<String>,
}

/// Step 4: capability fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CapabilitiesSection {
    #[validate(length(min = 1, message = "Select at least one skill"))]
    pub skills: Vec<Skill>,

    #[serde(default)]
    #[validate(length(max = 300, message = "Too Long!"))]
    pub info: Option<String>,

    #[serde(default, alias = "hobies")]
    pub hobbies: Vec<String>,
}

/// Field values of exactly one section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "section", content = "values", rename_all = "snake_case")]
pub enum SectionValues {
    Account(AccountSection),
    Profile(ProfileSection),
    Contacts(ContactsSection),
    Capabilities(CapabilitiesSection),
}

impl SectionValues {
    pub fn section(&self) -> Section {
        match self {
            SectionValues::Account(_) => Section::Account,
            SectionValues::Profile(_) => Section::Profile,
            SectionValues::Contacts(_) => Section::Contacts,
            SectionValues::Capabilities(_) => Section::Capabilities,
        }
    }

    /// Parse a section payload given as a bare JSON object of fields
    pub fn from_fields(section: Section, fields: serde_json::Value) -> serde_json::Result<Self> {
        Ok(match section {
            Section::Account => SectionValues::Account(serde_json::from_value(fields)?),
            Section::Profile => SectionValues::Profile(serde_json::from_value(fields)?),
            Section::Contacts => SectionValues::Contacts(serde_json::from_value(fields)?),
            Section::Capabilities => {
                SectionValues::Capabilities(serde_json::from_value(fields)?)
            }
        })
    }
}

/// Durable entry for one completed step of a draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftSection {
    /// Identifier of the record being drafted, shared by all sections
    pub user_id: UserId,
    pub saved_at: DateTime<Utc>,
    pub values: SectionValues,
}

impl DraftSection {
    pub fn new(user_id: UserId, values: SectionValues, saved_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            saved_at,
            values,
        }
    }

    pub fn section(&self) -> Section {
        self.values.section()
    }
}

/// Field values accumulated in memory across steps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DraftValues {
    pub account: Option<AccountSection>,
    pub profile: Option<ProfileSection>,
    pub contacts: Option<ContactsSection>,
    pub capabilities: Option<CapabilitiesSection>,
}

impl DraftValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store one section's values, replacing any previous ones
    pub fn set(&mut self, values: SectionValues) {
        match values {
            SectionValues::Account(v) => self.account = Some(v),
            SectionValues::Profile(v) => self.profile = Some(v),
            SectionValues::Contacts(v) => self.contacts = Some(v),
            SectionValues::Capabilities(v) => self.capabilities = Some(v),
        }
    }

    pub fn get(&self, section: Section) -> Option<SectionValues> {
        match section {
            Section::Account => self.account.clone().map(SectionValues::Account),
            Section::Profile => self.profile.clone().map(SectionValues::Profile),
            Section::Contacts => self.contacts.clone().map(SectionValues::Contacts),
            Section::Capabilities => self.capabilities.clone().map(SectionValues::Capabilities),
        }
    }

    pub fn contains(&self, section: Section) -> bool {
        match section {
            Section::Account => self.account.is_some(),
            Section::Profile => self.profile.is_some(),
            Section::Contacts => self.contacts.is_some(),
            Section::Capabilities => self.capabilities.is_some(),
        }
    }

    pub fn is_empty(&self) -> bool {
        Section::ALL.iter().all(|s| !self.contains(*s))
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_values_wire_format() {
        let values = SectionValues::Account(AccountSection {
            avatar: None,
            name: "alice".into(),
            password: "secret1".into(),
            repeat_password: "secret1".into(),
        });
        let json = serde_json::to_value(&values).unwrap();
        assert_eq!(json["section"], "account");
        assert_eq!(json["values"]["repeatpassword"], "secret1");

        let back: SectionValues = serde_json::from_value(json).unwrap();
        assert_eq!(back.section(), Section::Account);
    }

    #[test]
    fn test_from_fields_accepts_legacy_hobby_key() {
        let values = SectionValues::from_fields(
            Section::Capabilities,
            serde_json::json!({ "skills": [{ "value": "Rust" }], "hobies": ["chess"] }),
        )
        .unwrap();

        match values {
            SectionValues::Capabilities(c) => assert_eq!(c.hobbies, vec!["chess".to_string()]),
            other => panic!("unexpected section {:?}", other.section()),
        }
    }

    #[test]
    fn test_draft_values_accumulate() {
        let mut draft = DraftValues::new();
        assert!(draft.is_empty());

        draft.set(SectionValues::Contacts(ContactsSection {
            company: "Acme".into(),
            ..Default::default()
        }));
        assert!(draft.contains(Section::Contacts));
        assert!(!draft.contains(Section::Account));
        assert!(draft.get(Section::Contacts).is_some());

        draft.clear();
        assert!(draft.is_empty());
    }

    #[test]
    fn test_validator_rules() {
        let profile = ProfileSection {
            firstname: "".into(),
            lastname: "Doe".into(),
            email: "not-an-email".into(),
            ..Default::default()
        };
        let errors = profile.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("firstname"));
        assert!(fields.contains_key("email"));
        assert!(!fields.contains_key("lastname"));
    }
}
