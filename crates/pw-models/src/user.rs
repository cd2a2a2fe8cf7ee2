//! Finalized user record

use chrono::{DateTime, NaiveDate, Utc};
use pw_core::types::UserId;
use serde::{Deserialize, Serialize};

use crate::draft::{
    AccountSection, CapabilitiesSection, ContactsSection, ProfileSection, SectionValues,
};
use crate::section::Section;

/// Uploaded avatar image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Avatar {
    /// MIME type reported by the upload, e.g. `image/png`
    pub content_type: String,
    pub size_bytes: u64,
    /// Image payload as a `data:` URL
    pub data_url: String,
}

/// One entry of the skill list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub value: String,
}

impl Skill {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// A user record committed to the list of users
///
/// Built once by merging the four draft sections; afterwards it only changes
/// through the edit path, which replaces it as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,

    // Account
    pub avatar: Option<Avatar>,
    pub name: String,
    pub password: String,

    // Personal
    pub firstname: String,
    pub lastname: String,
    #[serde(rename = "dateofbirth")]
    pub date_of_birth: Option<NaiveDate>,
    pub email: String,
    pub address: String,
    pub gender: String,

    // Contacts
    pub company: String,
    pub fax: Option<String>,
    pub facebook: Option<String>,
    pub phone1: Option<String>,
    pub phone2: Option<String>,
    pub phone3: Option<String>,

    // Capabilities
    pub skills: Vec<Skill>,
    pub info: Option<String>,
    pub hobbies: Vec<String>,

    /// Set on every edit after finalization
    #[serde(rename = "lastUpdated", default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl UserRecord {
    /// Merge the four sections of a completed draft into one record
    pub fn assemble(
        id: UserId,
        account: AccountSection,
        profile: ProfileSection,
        contacts: ContactsSection,
        capabilities: CapabilitiesSection,
    ) -> Self {
        Self {
            id,
            avatar: account.avatar,
            name: account.name,
            password: account.password,
            firstname: profile.firstname,
            lastname: profile.lastname,
            date_of_birth: profile.date_of_birth,
            email: profile.email,
            address: profile.address,
            gender: profile.gender,
            company: contacts.company,
            fax: contacts.fax,
            facebook: contacts.facebook,
            phone1: contacts.phone1,
            phone2: contacts.phone2,
            phone3: contacts.phone3,
            skills: capabilities.skills,
            info: capabilities.info,
            hobbies: capabilities.hobbies,
            last_updated: None,
        }
    }

    /// Overwrite the fields belonging to one section. The id never changes.
    pub fn apply(&mut self, values: SectionValues) {
        match values {
            SectionValues::Account(account) => {
                if account.avatar.is_some() {
                    self.avatar = account.avatar;
                }
                self.name = account.name;
                self.password = account.password;
            }
            SectionValues::Profile(profile) => {
                self.firstname = profile.firstname;
                self.lastname = profile.lastname;
                self.date_of_birth = profile.date_of_birth;
                self.email = profile.email;
                self.address = profile.address;
                self.gender = profile.gender;
            }
            SectionValues::Contacts(contacts) => {
                self.company = contacts.company;
                self.fax = contacts.fax;
                self.facebook = contacts.facebook;
                self.phone1 = contacts.phone1;
                self.phone2 = contacts.phone2;
                self.phone3 = contacts.phone3;
            }
            SectionValues::Capabilities(capabilities) => {
                self.skills = capabilities.skills;
                self.info = capabilities.info;
                self.hobbies = capabilities.hobbies;
            }
        }
    }

    /// Current values of one section, used to pre-populate an edit form
    pub fn section_values(&self, section: Section) -> SectionValues {
        match section {
            Section::Account => SectionValues::Account(AccountSection {
                avatar: self.avatar.clone(),
                name: self.name.clone(),
                password: self.password.clone(),
                repeat_password: self.password.clone(),
            }),
            Section::Profile => SectionValues::Profile(ProfileSection {
                firstname: self.firstname.clone(),
                lastname: self.lastname.clone(),
                date_of_birth: self.date_of_birth,
                email: self.email.clone(),
                address: self.address.clone(),
                gender: self.gender.clone(),
            }),
            Section::Contacts => SectionValues::Contacts(ContactsSection {
                company: self.company.clone(),
                fax: self.fax.clone(),
                facebook: self.facebook.clone(),
                phone1: self.phone1.clone(),
                phone2: self.phone2.clone(),
                phone3: self.phone3.clone(),
            }),
            Section::Capabilities => SectionValues::Capabilities(CapabilitiesSection {
                skills: self.skills.clone(),
                info: self.info.clone(),
                hobbies: self.hobbies.clone(),
            }),
        }
    }

    /// Case-insensitive name comparison used by the uniqueness rule
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}
