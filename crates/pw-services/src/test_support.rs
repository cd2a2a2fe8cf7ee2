//! Shared fixtures for service tests

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use mockable::Clock;
use pw_models::{
    AccountSection, CapabilitiesSection, ContactsSection, ProfileSection, SectionValues, Skill,
};
use pw_store::{MemoryStore, Stores};

/// Clock that only moves when told to
pub struct FixtureClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixtureClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(fixture_timestamp()),
        })
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

/// In-memory stores with handles kept for failure injection
pub struct MemoryStores {
    pub drafts: Arc<MemoryStore>,
    pub users: Arc<MemoryStore>,
    pub stores: Stores,
}

pub fn memory_stores() -> MemoryStores {
    let drafts = Arc::new(MemoryStore::new("drafts"));
    let users = Arc::new(MemoryStore::new("users"));
    let session = Arc::new(MemoryStore::new("session"));
    let stores = Stores::from_parts(drafts.clone(), users.clone(), session);
    MemoryStores {
        drafts,
        users,
        stores,
    }
}

pub fn account(name: &str, password: &str) -> SectionValues {
    SectionValues::Account(AccountSection {
        avatar: None,
        name: name.into(),
        password: password.into(),
        repeat_password: password.into(),
    })
}

pub fn profile() -> SectionValues {
    SectionValues::Profile(ProfileSection {
        firstname: "Alice".into(),
        lastname: "Liddell".into(),
        date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 4),
        email: "alice@example.com".into(),
        address: "1 Rabbit Hole".into(),
        gender: "female".into(),
    })
}

pub fn contacts() -> SectionValues {
    SectionValues::Contacts(ContactsSection {
        company: "Wonderland Ltd".into(),
        phone1: Some("+44 20 7946 0000".into()),
        ..Default::default()
    })
}

pub fn capabilities() -> SectionValues {
    SectionValues::Capabilities(CapabilitiesSection {
        skills: vec![Skill::new("Rust"), Skill::new("SQL")],
        info: Some("Curious".into()),
        hobbies: vec!["croquet".into()],
    })
}
