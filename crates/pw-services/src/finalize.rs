//! Finalization
//!
//! Merges the four stored draft sections into one [`UserRecord`], appends it
//! to the user list and clears the draft. The append is acknowledged before
//! the clear is issued; if the clear fails the draft stays in place and a
//! later call replaces the same record instead of adding a second one.

use pw_contracts::ensure_unique_name;
use pw_core::error::WizardError;
use pw_core::result::WizardResult;
use pw_models::{DraftSection, Section, SectionValues, UserRecord};
use pw_store::Stores;
use tracing::{error, info, warn};

/// Service committing a complete draft
pub struct FinalizeService<'a> {
    stores: &'a Stores,
}

impl<'a> FinalizeService<'a> {
    pub fn new(stores: &'a Stores) -> Self {
        Self { stores }
    }

    /// Execute the finalization
    pub async fn call(&self) -> WizardResult<UserRecord> {
        let drafts = self.stores.drafts.load_all().await?;
        let user = Self::merge(drafts)?;

        let existing = self.stores.users.list().await?;
        ensure_unique_name(&existing, &user.name, Some(user.id))?;

        let replaced = self.stores.users.upsert(&user).await?;
        if replaced {
            warn!(user_id = %user.id, "Record was already committed by an earlier attempt");
        }

        if let Err(e) = self.stores.drafts.clear().await {
            error!(user_id = %user.id, error = %e, "Record committed but draft could not be cleared");
            return Err(e.into());
        }

        info!(user_id = %user.id, name = %user.name, "Draft finalized");
        Ok(user)
    }

    /// Merge stored sections by name. All must share one identifier.
    pub fn merge(drafts: Vec<DraftSection>) -> WizardResult<UserRecord> {
        let Some(user_id) = drafts.first().map(|d| d.user_id) else {
            return Err(WizardError::InconsistentDraftState(
                "no draft sections stored".to_string(),
            ));
        };

        let (mut account, mut profile, mut contacts, mut capabilities) = (None, None, None, None);
        for draft in drafts {
            if draft.user_id != user_id {
                return Err(WizardError::InconsistentDraftState(format!(
                    "section {} belongs to {} instead of {}",
                    draft.section(),
                    draft.user_id,
                    user_id
                )));
            }
            match draft.values {
                SectionValues::Account(v) => account = Some(v),
                SectionValues::Profile(v) => profile = Some(v),
                SectionValues::Contacts(v) => contacts = Some(v),
                SectionValues::Capabilities(v) => capabilities = Some(v),
            }
        }

        match (account, profile, contacts, capabilities) {
            (Some(account), Some(profile), Some(contacts), Some(capabilities)) => Ok(
                UserRecord::assemble(user_id, account, profile, contacts, capabilities),
            ),
            (account, profile, contacts, capabilities) => {
                let missing = [
                    (Section::Account, account.is_none()),
                    (Section::Profile, profile.is_none()),
                    (Section::Contacts, contacts.is_none()),
                    (Section::Capabilities, capabilities.is_none()),
                ]
                .into_iter()
                .filter(|(_, missing)| *missing)
                .map(|(section, _)| section.key())
                .collect::<Vec<_>>();
                Err(WizardError::InconsistentDraftState(format!(
                    "draft is missing sections: {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use chrono::Utc;
    use pw_models::UserId;

    async fn store_full_draft(stores: &Stores, id: UserId, name: &str) {
        for values in [account(name, "secret1"), profile(), contacts(), capabilities()] {
            stores
                .drafts
                .save(&DraftSection::new(id, values, Utc::now()))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_finalize_commits_and_clears() {
        let fx = memory_stores();
        let id = UserId::new();
        store_full_draft(&fx.stores, id, "alice").await;

        let user = FinalizeService::new(&fx.stores).call().await.unwrap();

        assert_eq!(user.id, id);
        assert_eq!(user.name, "alice");
        assert_eq!(user.company, "Wonderland Ltd");
        assert!(fx.stores.drafts.keys().await.unwrap().is_empty());
        assert_eq!(fx.stores.users.find(id).await.unwrap(), Some(user));
    }

    #[tokio::test]
    async fn test_failure_between_append_and_clear_is_retryable() {
        let fx = memory_stores();
        let id = UserId::new();
        store_full_draft(&fx.stores, id, "alice").await;

        fx.drafts.set_writes_failing(true);
        let err = FinalizeService::new(&fx.stores).call().await.unwrap_err();
        assert_eq!(err.error_code(), "store_unavailable");
        assert_eq!(fx.stores.users.count().await.unwrap(), 1);
        assert_eq!(fx.stores.drafts.keys().await.unwrap().len(), 4);

        fx.drafts.set_writes_failing(false);
        let user = FinalizeService::new(&fx.stores).call().await.unwrap();

        let all = fx.stores.users.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, id);
        assert_eq!(user.id, id);
        assert!(fx.stores.drafts.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_append_leaves_draft_intact() {
        let fx = memory_stores();
        store_full_draft(&fx.stores, UserId::new(), "alice").await;

        fx.users.set_writes_failing(true);
        assert!(FinalizeService::new(&fx.stores).call().await.is_err());
        assert_eq!(fx.stores.drafts.keys().await.unwrap().len(), 4);
        assert_eq!(fx.stores.users.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_name_blocks_commit() {
        let fx = memory_stores();
        store_full_draft(&fx.stores, UserId::new(), "bob").await;
        let bob = FinalizeService::new(&fx.stores).call().await.unwrap();

        store_full_draft(&fx.stores, UserId::new(), "BOB").await;
        let err = FinalizeService::new(&fx.stores).call().await.unwrap_err();

        assert!(matches!(err, WizardError::DuplicateName { .. }));
        assert_eq!(fx.stores.users.list().await.unwrap(), vec![bob]);
        assert_eq!(fx.stores.drafts.keys().await.unwrap().len(), 4);
    }

    #[test]
    fn test_merge_rejects_incomplete_draft() {
        let id = UserId::new();
        let drafts = vec![
            DraftSection::new(id, account("alice", "secret1"), Utc::now()),
            DraftSection::new(id, contacts(), Utc::now()),
            DraftSection::new(id, capabilities(), Utc::now()),
        ];
        let err = FinalizeService::merge(drafts).unwrap_err();
        assert_eq!(err.error_code(), "inconsistent_draft_state");
        assert_eq!(
            err.to_string(),
            "Inconsistent draft state: draft is missing sections: profile"
        );

        let drafts = vec![DraftSection::new(id, profile(), Utc::now())];
        assert_eq!(
            FinalizeService::merge(drafts).unwrap_err().to_string(),
            "Inconsistent draft state: draft is missing sections: account, contacts, capabilities"
        );
    }

    #[test]
    fn test_merge_rejects_mixed_identifiers() {
        let drafts = vec![
            DraftSection::new(UserId::new(), account("alice", "secret1"), Utc::now()),
            DraftSection::new(UserId::new(), profile(), Utc::now()),
            DraftSection::new(UserId::new(), contacts(), Utc::now()),
            DraftSection::new(UserId::new(), capabilities(), Utc::now()),
        ];
        assert!(matches!(
            FinalizeService::merge(drafts),
            Err(WizardError::InconsistentDraftState(_))
        ));
    }

    #[test]
    fn test_merge_empty() {
        assert!(FinalizeService::merge(Vec::new()).is_err());
    }
}
