//! Edit write-through
//!
//! Changes to an already finalized record bypass the draft store entirely:
//! the record is replaced in the user list by id and mirrored into the
//! selected-user slot, stamped with the edit time.

use mockable::Clock;
use pw_contracts::{ensure_unique_name, SectionContracts};
use pw_core::error::WizardError;
use pw_core::result::WizardResult;
use pw_models::{SectionValues, UserId, UserRecord};
use pw_store::Stores;
use tracing::{info, instrument};

/// Service for editing finalized users
pub struct EditUserService<'a> {
    stores: &'a Stores,
    contracts: &'a SectionContracts,
    clock: &'a dyn Clock,
}

impl<'a> EditUserService<'a> {
    pub fn new(stores: &'a Stores, contracts: &'a SectionContracts, clock: &'a dyn Clock) -> Self {
        Self {
            stores,
            contracts,
            clock,
        }
    }

    /// Validate and apply one section's new values to the record `id`
    #[instrument(skip(self, values), fields(section = %values.section()))]
    pub async fn call(&self, id: UserId, values: SectionValues) -> WizardResult<UserRecord> {
        let mut user = self
            .stores
            .users
            .find(id)
            .await?
            .ok_or_else(|| WizardError::not_found("user", id))?;

        self.contracts
            .validate(&values, self.clock.utc().date_naive())?;

        if let SectionValues::Account(account) = &values {
            let existing = self.stores.users.list().await?;
            ensure_unique_name(&existing, &account.name, Some(id))?;
        }

        user.apply(values);
        self.save(user).await
    }

    /// Stamp, replace in the user list, then refresh the selected-user slot
    pub async fn save(&self, mut user: UserRecord) -> WizardResult<UserRecord> {
        user.last_updated = Some(self.clock.utc());

        self.stores.users.upsert(&user).await?;
        self.stores.selected.set(&user).await?;

        info!(user_id = %user.id, "User record updated");
        Ok(user)
    }
}
