//! # pw-contracts
//!
//! Validation contracts for the wizard sections.
//!
//! Contracts validate a section's values before the section is written to the
//! draft store or, when editing, before the user record is replaced. The name
//! uniqueness rule is exposed separately through [`NameRegistry`] so callers
//! can report it as its own failure kind.

pub mod account;
pub mod base;
pub mod capabilities;
pub mod contacts;
pub mod profile;

pub use account::{ensure_unique_name, AccountContract, NameRegistry};
pub use base::*;
pub use capabilities::CapabilitiesContract;
pub use contacts::ContactsContract;
pub use profile::ProfileContract;

use chrono::NaiveDate;
use pw_core::config::AppConfig;
use pw_models::SectionValues;

/// All section contracts, configured once from [`AppConfig`]
#[derive(Debug, Clone)]
pub struct SectionContracts {
    account: AccountContract,
    contacts: ContactsContract,
    capabilities: CapabilitiesContract,
}

impl SectionContracts {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            account: AccountContract::new(config.account.clone(), config.avatar.clone()),
            contacts: ContactsContract,
            capabilities: CapabilitiesContract,
        }
    }

    /// Validate one section. `today` bounds the birth date.
    pub fn validate(&self, values: &SectionValues, today: NaiveDate) -> ValidationResult {
        match values {
            SectionValues::Account(account) => self.account.validate(account),
            SectionValues::Profile(profile) => ProfileContract::new(today).validate(profile),
            SectionValues::Contacts(contacts) => self.contacts.validate(contacts),
            SectionValues::Capabilities(capabilities) => self.capabilities.validate(capabilities),
        }
    }
}

impl Default for SectionContracts {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}
