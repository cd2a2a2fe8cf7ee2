//! Step registry
//!
//! The wizard is made of four fixed sections. Their order is the order in which
//! they are completed, and each one maps to exactly one step number.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four sub-forms composing a full user record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Account,
    Profile,
    Contacts,
    Capabilities,
}

impl Section {
    /// All sections in completion order
    pub const ALL: [Section; 4] = [
        Section::Account,
        Section::Profile,
        Section::Contacts,
        Section::Capabilities,
    ];

    /// Number of sections in the registry
    pub const COUNT: usize = Self::ALL.len();

    /// Store key of the section's draft entry
    pub fn key(&self) -> &'static str {
        match self {
            Section::Account => "account",
            Section::Profile => "profile",
            Section::Contacts => "contacts",
            Section::Capabilities => "capabilities",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|section| section.key() == key)
    }

    pub fn step(&self) -> StepIndex {
        match self {
            Section::Account => StepIndex(1),
            Section::Profile => StepIndex(2),
            Section::Contacts => StepIndex(3),
            Section::Capabilities => StepIndex(4),
        }
    }

    pub fn from_step(step: StepIndex) -> Self {
        match step.0 {
            1 => Section::Account,
            2 => Section::Profile,
            3 => Section::Contacts,
            _ => Section::Capabilities,
        }
    }

    /// The section presented after this one, if any
    pub fn next(&self) -> Option<Self> {
        self.step().next().map(Self::from_step)
    }

    pub fn is_last(&self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(&s.to_ascii_lowercase()).ok_or_else(|| format!("unknown section '{}'", s))
    }
}

/// Wizard step number, always in `1..=4`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct StepIndex(u8);

impl StepIndex {
    pub const FIRST: StepIndex = StepIndex(1);
    pub const LAST: StepIndex = StepIndex(Section::COUNT as u8);

    pub fn get(&self) -> u8 {
        self.0
    }

    pub fn next(&self) -> Option<Self> {
        if *self < Self::LAST {
            Some(StepIndex(self.0 + 1))
        } else {
            None
        }
    }
}

impl TryFrom<u8> for StepIndex {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::FIRST.0..=Self::LAST.0).contains(&value) {
            Ok(StepIndex(value))
        } else {
            Err(format!(
                "step {} is outside {}..={}",
                value,
                Self::FIRST.0,
                Self::LAST.0
            ))
        }
    }
}

impl From<StepIndex> for u8 {
    fn from(step: StepIndex) -> Self {
        step.0
    }
}

impl fmt::Display for StepIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
