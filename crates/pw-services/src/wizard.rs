//! Wizard controller
//!
//! Owns the in-memory form state: the active step, the values accumulated
//! across steps and the record being edited, if any. Every change goes
//! through [`WizardState::apply`] and is published as a [`FormSnapshot`] on a
//! watch channel for the rendering layer.
//!
//! The durable draft store stays the source of truth for resumption. The
//! in-memory values only spare the UI from re-reading it on every step.

use std::collections::BTreeSet;
use std::sync::Arc;

use mockable::Clock;
use pw_contracts::{ensure_unique_name, SectionContracts};
use pw_core::error::{ValidationErrors, WizardError};
use pw_core::result::WizardResult;
use pw_models::{DraftSection, DraftValues, Section, SectionValues, UserId, UserRecord};
use pw_store::Stores;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::edit::EditUserService;
use crate::finalize::FinalizeService;
use crate::resume::{ResumeDecision, ResumeDetector};
use crate::result::ServiceResult;

/// Where the wizard currently is
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WizardState {
    Account,
    Profile,
    Contacts,
    Capabilities,
    Finalized { user_id: UserId },
    Editing { user_id: UserId, section: Section },
}

/// Inputs to the transition function
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardEvent {
    /// The section's values were validated and durably saved
    SectionCommitted(Section),
    /// The draft became the record `UserId`
    Finalized(UserId),
    /// Move to `to`; any step up to `reachable` may be visited
    Navigate { to: Section, reachable: Section },
    BeginEdit { user_id: UserId, section: Section },
    /// Back to an empty first step
    Restart,
}

impl WizardState {
    /// Drafting state for a section
    pub fn at(section: Section) -> Self {
        match section {
            Section::Account => WizardState::Account,
            Section::Profile => WizardState::Profile,
            Section::Contacts => WizardState::Contacts,
            Section::Capabilities => WizardState::Capabilities,
        }
    }

    /// Section whose form is on screen
    pub fn section(&self) -> Option<Section> {
        match self {
            WizardState::Account => Some(Section::Account),
            WizardState::Profile => Some(Section::Profile),
            WizardState::Contacts => Some(Section::Contacts),
            WizardState::Capabilities => Some(Section::Capabilities),
            WizardState::Finalized { .. } => None,
            WizardState::Editing { section, .. } => Some(*section),
        }
    }

    pub fn is_drafting(&self) -> bool {
        !matches!(
            self,
            WizardState::Finalized { .. } | WizardState::Editing { .. }
        )
    }

    /// Transition function.
    ///
    /// Committing the last section keeps the wizard on that step until the
    /// [`WizardEvent::Finalized`] event arrives, so a failed commit can be
    /// retried from where it stopped.
    pub fn apply(self, event: WizardEvent) -> WizardResult<WizardState> {
        use WizardEvent as E;
        use WizardState as S;

        let next = match (self, event) {
            (_, E::Restart) => S::Account,
            (_, E::BeginEdit { user_id, section }) => S::Editing { user_id, section },

            (S::Editing { user_id, section }, E::SectionCommitted(committed))
                if section == committed =>
            {
                S::Editing { user_id, section }
            }
            (S::Editing { user_id, .. }, E::Navigate { to, .. }) => S::Editing {
                user_id,
                section: to,
            },

            (S::Capabilities, E::Finalized(user_id)) => S::Finalized { user_id },

            (state, E::SectionCommitted(committed)) if state.section() == Some(committed) => {
                match committed.next() {
                    Some(next) => S::at(next),
                    None => state,
                }
            }
            (state, E::Navigate { to, reachable }) if state.is_drafting() && to <= reachable => {
                S::at(to)
            }

            (state, event) => {
                return Err(WizardError::InvalidTransition(format!(
                    "{:?} cannot handle {:?}",
                    state, event
                )))
            }
        };
        Ok(next)
    }
}

/// Progress indicator for the rendering layer
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FormStatus {
    #[default]
    Idle,
    Loading,
    Failed {
        code: &'static str,
        errors: ValidationErrors,
    },
}

/// Everything the rendering layer needs to draw the wizard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSnapshot {
    pub state: WizardState,
    pub user_id: UserId,
    pub values: DraftValues,
    pub editing: Option<UserRecord>,
    pub resume: ResumeDecision,
    pub status: FormStatus,
}

pub struct Wizard {
    stores: Stores,
    contracts: SectionContracts,
    clock: Arc<dyn Clock>,
    /// Carried from the first step through to the finalized record
    user_id: UserId,
    values: DraftValues,
    /// Sections whose draft save was acknowledged by the store
    committed: BTreeSet<Section>,
    editing: Option<UserRecord>,
    state: WizardState,
    resume: ResumeDecision,
    status: FormStatus,
    tx: watch::Sender<FormSnapshot>,
}

impl Wizard {
    /// Open the wizard, resuming any draft left in the store.
    ///
    /// An unreadable store does not prevent opening: the wizard starts empty
    /// at the first step with a failed status.
    pub async fn open(stores: Stores, contracts: SectionContracts, clock: Arc<dyn Clock>) -> Self {
        let user_id = UserId::new();
        let (tx, _) = watch::channel(FormSnapshot {
            state: WizardState::Account,
            user_id,
            values: DraftValues::new(),
            editing: None,
            resume: ResumeDecision::NoDraft,
            status: FormStatus::Loading,
        });

        let mut wizard = Self {
            stores,
            contracts,
            clock,
            user_id,
            values: DraftValues::new(),
            committed: BTreeSet::new(),
            editing: None,
            state: WizardState::Account,
            resume: ResumeDecision::NoDraft,
            status: FormStatus::Loading,
            tx,
        };

        let loaded = wizard.load_draft().await;
        wizard.settle(loaded);
        info!(state = ?wizard.state, resume = ?wizard.resume, "Wizard opened");
        wizard
    }

    pub fn subscribe(&self) -> watch::Receiver<FormSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            state: self.state.clone(),
            user_id: self.user_id,
            values: self.values.clone(),
            editing: self.editing.clone(),
            resume: self.resume.clone(),
            status: self.status.clone(),
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn values(&self) -> &DraftValues {
        &self.values
    }

    /// Re-run resume detection against the store
    pub async fn resume_hint(&mut self) -> ServiceResult<ResumeDecision> {
        let result = ResumeDetector::inspect(&self.stores.drafts)
            .await
            .map_err(WizardError::from);
        if let Ok(decision) = &result {
            self.resume = decision.clone();
        }
        self.settle(result)
    }

    /// Submit the values of the section on screen.
    ///
    /// While drafting, the section is validated and saved as a draft before
    /// the wizard advances; the last section also finalizes the record.
    /// While editing, the record is written through instead.
    pub async fn submit(&mut self, values: SectionValues) -> ServiceResult<WizardState> {
        self.begin();
        let result = self.try_submit(values).await;
        self.settle(result)
    }

    async fn try_submit(&mut self, values: SectionValues) -> WizardResult<WizardState> {
        let section = values.section();

        if let WizardState::Editing { user_id, .. } = self.state {
            if self.state.section() != Some(section) {
                return Err(WizardError::InvalidTransition(format!(
                    "editing {:?}, received {} values",
                    self.state.section(),
                    section
                )));
            }
            let user = EditUserService::new(&self.stores, &self.contracts, self.clock.as_ref())
                .call(user_id, values)
                .await?;
            self.load_record(&user);
            self.editing = Some(user);
            self.state = self.state.clone().apply(WizardEvent::SectionCommitted(section))?;
            return Ok(self.state.clone());
        }

        if self.state.section() != Some(section) {
            return Err(WizardError::InvalidTransition(format!(
                "{:?} cannot accept {} values",
                self.state, section
            )));
        }

        self.contracts
            .validate(&values, self.clock.utc().date_naive())?;
        if let SectionValues::Account(account) = &values {
            let users = self.stores.users.list().await?;
            ensure_unique_name(&users, &account.name, Some(self.user_id))?;
        }

        self.values.set(values.clone());
        self.stores
            .drafts
            .save(&DraftSection::new(self.user_id, values, self.clock.utc()))
            .await?;
        self.committed.insert(section);

        self.state = self.state.clone().apply(WizardEvent::SectionCommitted(section))?;
        debug!(%section, state = ?self.state, "Section committed");

        if section.is_last() {
            self.finalize().await?;
        } else {
            self.refresh_resume().await;
        }
        Ok(self.state.clone())
    }

    /// Commit a complete draft again after a failed finalization
    pub async fn retry_finalize(&mut self) -> ServiceResult<UserRecord> {
        self.begin();
        let result = if self.state == WizardState::Capabilities {
            self.finalize().await
        } else {
            Err(WizardError::InvalidTransition(format!(
                "nothing to finalize in {:?}",
                self.state
            )))
        };
        self.settle(result)
    }

    async fn finalize(&mut self) -> WizardResult<UserRecord> {
        let user = FinalizeService::new(&self.stores).call().await?;
        if user.id != self.user_id {
            warn!(expected = %self.user_id, stored = %user.id, "Draft identifier differs from the in-memory one");
        }
        self.state = self.state.clone().apply(WizardEvent::Finalized(user.id))?;
        self.values.clear();
        self.committed.clear();
        self.resume = ResumeDecision::NoDraft;
        info!(user_id = %user.id, "Wizard finalized");
        Ok(user)
    }

    /// Move to a step that has already been reached. The store is not touched.
    ///
    /// Only sections saved to the draft store unlock the step after them;
    /// values kept in memory after a failed save do not.
    pub fn navigate_to(&mut self, to: Section) -> ServiceResult<WizardState> {
        let reachable = Section::ALL
            .into_iter()
            .find(|s| !self.committed.contains(s))
            .unwrap_or(Section::Capabilities)
            .max(self.state.section().unwrap_or(Section::Account));

        let result = self
            .state
            .clone()
            .apply(WizardEvent::Navigate { to, reachable })
            .map(|state| {
                self.state = state;
                self.state.clone()
            });
        self.settle(result)
    }

    /// Throw the draft away and start over with a new identifier
    pub async fn discard_draft(&mut self) -> ServiceResult<()> {
        self.begin();
        let result = self.stores.drafts.clear().await.map_err(WizardError::from);
        if result.is_ok() {
            self.restart();
            info!(user_id = %self.user_id, "Draft discarded");
        }
        self.settle(result)
    }

    /// Leave the finalized or editing screen and go back to drafting
    pub async fn start_new(&mut self) -> ServiceResult<WizardState> {
        self.begin();
        self.editing = None;
        let result = self.load_draft().await.map(|_| self.state.clone());
        self.settle(result)
    }

    /// Open a finalized record for editing at `section`
    pub async fn begin_edit(&mut self, id: UserId, section: Section) -> ServiceResult<UserRecord> {
        self.begin();
        let result = self.try_begin_edit(id, section).await;
        self.settle(result)
    }

    async fn try_begin_edit(&mut self, id: UserId, section: Section) -> WizardResult<UserRecord> {
        let user = self.find_user(id).await?;
        self.stores.selected.set(&user).await?;
        self.state = self
            .state
            .clone()
            .apply(WizardEvent::BeginEdit { user_id: id, section })?;
        self.load_record(&user);
        self.editing = Some(user.clone());
        info!(user_id = %id, %section, "Editing user");
        Ok(user)
    }

    /// Stop editing; any unfinished draft is resumed from the store
    pub async fn finish_edit(&mut self) -> ServiceResult<WizardState> {
        self.start_new().await
    }

    pub async fn users(&mut self) -> ServiceResult<Vec<UserRecord>> {
        let result = self.stores.users.list().await.map_err(WizardError::from);
        self.settle(result)
    }

    /// Put a record in the selected-user slot
    pub async fn select_user(&mut self, id: UserId) -> ServiceResult<UserRecord> {
        self.begin();
        let result = match self.find_user(id).await {
            Ok(user) => self
                .stores
                .selected
                .set(&user)
                .await
                .map(|_| user)
                .map_err(WizardError::from),
            Err(e) => Err(e),
        };
        self.settle(result)
    }

    pub async fn selected_user(&mut self) -> ServiceResult<Option<UserRecord>> {
        let result = self.stores.selected.get().await.map_err(WizardError::from);
        self.settle(result)
    }

    /// Delete a finalized record, clearing the selected-user slot if it held it
    pub async fn delete_user(&mut self, id: UserId) -> ServiceResult<()> {
        self.begin();
        let result = self.try_delete_user(id).await;
        self.settle(result)
    }

    async fn try_delete_user(&mut self, id: UserId) -> WizardResult<()> {
        self.find_user(id).await?;
        self.stores.users.remove(id).await?;

        if let Some(selected) = self.stores.selected.get().await? {
            if selected.id == id {
                self.stores.selected.clear().await?;
            }
        }

        if matches!(self.state, WizardState::Editing { user_id, .. } if user_id == id) {
            self.editing = None;
            self.load_draft().await?;
        }

        info!(user_id = %id, "User deleted");
        Ok(())
    }

    async fn find_user(&self, id: UserId) -> WizardResult<UserRecord> {
        self.stores
            .users
            .find(id)
            .await?
            .ok_or_else(|| WizardError::not_found("user", id))
    }

    /// Rebuild the in-memory draft from the store and jump to the resume step.
    /// Nothing is replaced unless both reads succeed.
    async fn load_draft(&mut self) -> WizardResult<()> {
        let decision = ResumeDetector::inspect(&self.stores.drafts).await;
        let drafts = match decision {
            Ok(_) => self.stores.drafts.load_all().await,
            Err(_) => Ok(Vec::new()),
        };

        let (decision, drafts) = match (decision, drafts) {
            (Ok(decision), Ok(drafts)) => (decision, drafts),
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "Draft store unreadable, starting without a draft");
                self.restart();
                return Err(e.into());
            }
        };

        self.restart();
        if let Some(first) = drafts.first() {
            self.user_id = first.user_id;
        }
        for draft in drafts {
            if draft.user_id != self.user_id {
                warn!(section = %draft.section(), "Draft section carries a different identifier");
            }
            self.committed.insert(draft.section());
            self.values.set(draft.values);
        }

        self.state = match &decision {
            ResumeDecision::NoDraft => WizardState::Account,
            ResumeDecision::Resume { step, .. } => WizardState::at(*step),
            ResumeDecision::Complete => WizardState::Capabilities,
        };
        self.resume = decision;
        Ok(())
    }

    async fn refresh_resume(&mut self) {
        match ResumeDetector::inspect(&self.stores.drafts).await {
            Ok(decision) => self.resume = decision,
            Err(e) => warn!(error = %e, "Could not refresh resume hint"),
        }
    }

    fn load_record(&mut self, user: &UserRecord) {
        self.values.clear();
        for section in Section::ALL {
            self.values.set(user.section_values(section));
        }
    }

    fn restart(&mut self) {
        self.user_id = UserId::new();
        self.values.clear();
        self.committed.clear();
        self.editing = None;
        self.resume = ResumeDecision::NoDraft;
        self.state = WizardState::Account;
    }

    fn begin(&mut self) {
        self.status = FormStatus::Loading;
        self.publish();
    }

    fn settle<T>(&mut self, result: WizardResult<T>) -> ServiceResult<T> {
        self.status = match &result {
            Ok(_) => FormStatus::Idle,
            Err(e) => {
                if e.is_user_error() {
                    debug!(code = e.error_code(), "Rejected input");
                } else {
                    warn!(code = e.error_code(), error = %e, "Wizard operation failed");
                }
                FormStatus::Failed {
                    code: e.error_code(),
                    errors: e.to_validation_errors(),
                }
            }
        };
        self.publish();
        result.into()
    }

    fn publish(&self) {
        self.tx.send_replace(self.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use chrono::Duration;
    use pw_models::AccountSection;
    use std::collections::BTreeSet;

    async fn open(fx: &MemoryStores) -> (Wizard, Arc<FixtureClock>) {
        let clock = FixtureClock::new();
        let wizard = Wizard::open(fx.stores.clone(), SectionContracts::default(), clock.clone()).await;
        (wizard, clock)
    }

    async fn complete(wizard: &mut Wizard, name: &str) -> UserRecord {
        for values in [account(name, "secret1"), profile(), contacts(), capabilities()] {
            assert!(wizard.submit(values).await.is_success());
        }
        let WizardState::Finalized { user_id } = wizard.state().clone() else {
            panic!("wizard not finalized: {:?}", wizard.state());
        };
        wizard.stores.users.find(user_id).await.unwrap().unwrap()
    }

    #[test]
    fn test_transitions() {
        let id = UserId::new();
        let state = WizardState::Account
            .apply(WizardEvent::SectionCommitted(Section::Account))
            .unwrap();
        assert_eq!(state, WizardState::Profile);

        let state = WizardState::Capabilities
            .apply(WizardEvent::SectionCommitted(Section::Capabilities))
            .unwrap();
        assert_eq!(state, WizardState::Capabilities);
        assert_eq!(
            state.apply(WizardEvent::Finalized(id)).unwrap(),
            WizardState::Finalized { user_id: id }
        );

        assert!(WizardState::Profile
            .apply(WizardEvent::SectionCommitted(Section::Contacts))
            .is_err());
        assert!(WizardState::Contacts
            .apply(WizardEvent::Finalized(id))
            .is_err());
        assert!(WizardState::Finalized { user_id: id }
            .apply(WizardEvent::Navigate {
                to: Section::Account,
                reachable: Section::Capabilities,
            })
            .is_err());
        assert_eq!(
            WizardState::Finalized { user_id: id }
                .apply(WizardEvent::Restart)
                .unwrap(),
            WizardState::Account
        );
    }

    #[test]
    fn test_navigation_bounds() {
        let state = WizardState::Contacts;
        assert_eq!(
            state
                .clone()
                .apply(WizardEvent::Navigate {
                    to: Section::Account,
                    reachable: Section::Contacts,
                })
                .unwrap(),
            WizardState::Account
        );
        assert!(state
            .apply(WizardEvent::Navigate {
                to: Section::Capabilities,
                reachable: Section::Contacts,
            })
            .is_err());
    }

    #[tokio::test]
    async fn test_draft_resume_finalize_and_edit() {
        let fx = memory_stores();
        let (mut wizard, _) = open(&fx).await;
        assert_eq!(wizard.state(), &WizardState::Account);
        let id = wizard.user_id();

        let result = wizard.submit(account("alice", "secret1")).await;
        assert_eq!(result.into_inner(), Some(WizardState::Profile));
        assert_eq!(
            fx.stores.drafts.keys().await.unwrap(),
            BTreeSet::from(["account".to_string()])
        );

        // Reopening resumes at step 2 with the same identifier
        let (mut wizard, _) = open(&fx).await;
        assert_eq!(wizard.state(), &WizardState::Profile);
        assert_eq!(wizard.user_id(), id);
        assert_eq!(wizard.snapshot().resume.resume_step(), Some(Section::Profile));
        assert!(wizard.values().contains(Section::Account));

        for values in [profile(), contacts(), capabilities()] {
            assert!(wizard.submit(values).await.is_success());
        }
        assert_eq!(wizard.state(), &WizardState::Finalized { user_id: id });
        assert!(fx.stores.drafts.keys().await.unwrap().is_empty());

        let users = fx.stores.users.list().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, id);
        assert_eq!(users[0].name, "alice");

        // Bob exists alongside alice
        wizard.start_new().await;
        let bob = complete(&mut wizard, "bob").await;
        assert_ne!(bob.id, id);

        assert!(wizard.begin_edit(id, Section::Account).await.is_success());
        let renamed = wizard.submit(account("ALICE", "secret1")).await;
        assert!(renamed.is_success());
        assert_eq!(fx.stores.users.find(id).await.unwrap().unwrap().name, "ALICE");

        let clash = wizard.submit(account("bob", "secret1")).await;
        assert_eq!(clash.code(), Some("duplicate_name"));
        assert!(clash.errors().has_error("name"));
        assert_eq!(fx.stores.users.count().await.unwrap(), 2);
        assert!(fx.stores.drafts.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected_at_first_step() {
        let fx = memory_stores();
        let (mut wizard, _) = open(&fx).await;
        complete(&mut wizard, "bob").await;

        wizard.start_new().await;
        let result = wizard.submit(account("Bob", "secret1")).await;
        assert_eq!(result.code(), Some("duplicate_name"));
        assert_eq!(wizard.state(), &WizardState::Account);
        assert!(fx.stores.drafts.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_validation_failure_does_not_advance() {
        let fx = memory_stores();
        let (mut wizard, _) = open(&fx).await;
        let rx = wizard.subscribe();

        let result = wizard
            .submit(SectionValues::Account(AccountSection {
                avatar: None,
                name: "alice".into(),
                password: "abc".into(),
                repeat_password: "abd".into(),
            }))
            .await;

        assert_eq!(result.code(), Some("validation_failed"));
        assert!(result.errors().has_error("password"));
        assert_eq!(wizard.state(), &WizardState::Account);
        assert!(fx.stores.drafts.keys().await.unwrap().is_empty());

        let snapshot = rx.borrow().clone();
        assert!(matches!(
            snapshot.status,
            FormStatus::Failed { code: "validation_failed", .. }
        ));
    }

    #[tokio::test]
    async fn test_store_failure_keeps_values_but_not_step() {
        let fx = memory_stores();
        let (mut wizard, _) = open(&fx).await;

        fx.drafts.set_writes_failing(true);
        let result = wizard.submit(account("alice", "secret1")).await;
        assert_eq!(result.code(), Some("store_unavailable"));
        assert_eq!(wizard.state(), &WizardState::Account);
        assert!(wizard.values().contains(Section::Account));

        fx.drafts.set_writes_failing(false);
        let result = wizard.submit(account("alice", "secret1")).await;
        assert_eq!(result.into_inner(), Some(WizardState::Profile));
        assert_eq!(wizard.snapshot().status, FormStatus::Idle);
    }

    #[tokio::test]
    async fn test_open_with_unavailable_store_degrades() {
        let fx = memory_stores();
        fx.drafts.set_unavailable(true);

        let (wizard, _) = open(&fx).await;
        let snapshot = wizard.snapshot();
        assert_eq!(snapshot.state, WizardState::Account);
        assert_eq!(snapshot.resume, ResumeDecision::NoDraft);
        assert!(matches!(
            snapshot.status,
            FormStatus::Failed { code: "store_unavailable", .. }
        ));
    }

    #[tokio::test]
    async fn test_non_contiguous_draft_resumes_by_count() {
        let fx = memory_stores();
        let id = UserId::new();
        for values in [account("alice", "secret1"), contacts()] {
            fx.stores
                .drafts
                .save(&DraftSection::new(id, values, fixture_timestamp()))
                .await
                .unwrap();
        }

        let (wizard, _) = open(&fx).await;
        assert_eq!(wizard.state(), &WizardState::Contacts);
        assert_eq!(wizard.user_id(), id);
    }

    #[tokio::test]
    async fn test_complete_draft_can_be_retried() {
        let fx = memory_stores();
        let (mut wizard, _) = open(&fx).await;
        let id = wizard.user_id();

        for values in [account("alice", "secret1"), profile(), contacts()] {
            assert!(wizard.submit(values).await.is_success());
        }
        fx.users.set_writes_failing(true);
        let result = wizard.submit(capabilities()).await;
        assert_eq!(result.code(), Some("store_unavailable"));
        assert_eq!(wizard.state(), &WizardState::Capabilities);
        fx.users.set_writes_failing(false);

        let (mut wizard, _) = open(&fx).await;
        assert_eq!(wizard.snapshot().resume, ResumeDecision::Complete);
        assert!(!wizard.snapshot().resume.should_prompt());
        assert_eq!(wizard.state(), &WizardState::Capabilities);

        let user = wizard.retry_finalize().await.into_inner().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(fx.stores.users.count().await.unwrap(), 1);
        assert!(fx.stores.drafts.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_retry_finalize_outside_last_step() {
        let fx = memory_stores();
        let (mut wizard, _) = open(&fx).await;
        assert_eq!(
            wizard.retry_finalize().await.code(),
            Some("invalid_transition")
        );
    }

    #[tokio::test]
    async fn test_navigate_within_reached_steps() {
        let fx = memory_stores();
        let (mut wizard, _) = open(&fx).await;
        wizard.submit(account("alice", "secret1")).await;
        wizard.submit(profile()).await;
        assert_eq!(wizard.state(), &WizardState::Contacts);

        let keys = fx.stores.drafts.keys().await.unwrap();
        assert_eq!(
            wizard.navigate_to(Section::Account).into_inner(),
            Some(WizardState::Account)
        );
        assert_eq!(fx.stores.drafts.keys().await.unwrap(), keys);
        assert!(wizard.values().contains(Section::Profile));

        assert_eq!(
            wizard.navigate_to(Section::Contacts).into_inner(),
            Some(WizardState::Contacts)
        );
        assert_eq!(
            wizard.navigate_to(Section::Capabilities).code(),
            Some("invalid_transition")
        );
    }

    #[tokio::test]
    async fn test_failed_save_does_not_unlock_next_step() {
        let fx = memory_stores();
        let (mut wizard, _) = open(&fx).await;

        fx.drafts.set_writes_failing(true);
        let result = wizard.submit(account("alice", "secret1")).await;
        assert_eq!(result.code(), Some("store_unavailable"));

        let moved = wizard.navigate_to(Section::Profile);
        assert_eq!(moved.code(), Some("invalid_transition"));
        assert_eq!(wizard.state(), &WizardState::Account);

        fx.drafts.set_writes_failing(false);
        assert_eq!(
            wizard.submit(profile()).await.code(),
            Some("invalid_transition")
        );
        assert!(fx.stores.drafts.keys().await.unwrap().is_empty());

        let result = wizard.submit(account("alice", "secret1")).await;
        assert_eq!(result.into_inner(), Some(WizardState::Profile));
        assert_eq!(
            wizard.navigate_to(Section::Account).into_inner(),
            Some(WizardState::Account)
        );
        assert_eq!(
            wizard.navigate_to(Section::Profile).into_inner(),
            Some(WizardState::Profile)
        );
        assert_eq!(
            wizard.navigate_to(Section::Contacts).code(),
            Some("invalid_transition")
        );
    }

    #[tokio::test]
    async fn test_discard_draft() {
        let fx = memory_stores();
        let (mut wizard, _) = open(&fx).await;
        let id = wizard.user_id();
        wizard.submit(account("alice", "secret1")).await;

        assert!(wizard.discard_draft().await.is_success());
        assert_eq!(wizard.state(), &WizardState::Account);
        assert_ne!(wizard.user_id(), id);
        assert!(wizard.values().is_empty());
        assert!(fx.stores.drafts.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_edit_write_through_stamps_clock() {
        let fx = memory_stores();
        let (mut wizard, clock) = open(&fx).await;
        let alice = complete(&mut wizard, "alice").await;
        assert_eq!(alice.last_updated, None);

        let edited_at = fixture_timestamp() + Duration::days(2);
        clock.set(edited_at);
        wizard.begin_edit(alice.id, Section::Capabilities).await;
        assert!(wizard.submit(capabilities()).await.is_success());

        let stored = fx.stores.users.find(alice.id).await.unwrap().unwrap();
        assert_eq!(stored.last_updated, Some(edited_at));
        assert_eq!(
            wizard.selected_user().await.into_inner(),
            Some(Some(stored.clone()))
        );
        assert_eq!(wizard.snapshot().editing, Some(stored));

        assert!(wizard.finish_edit().await.is_success());
        assert_eq!(wizard.state(), &WizardState::Account);
        assert_eq!(wizard.snapshot().editing, None);
    }

    #[tokio::test]
    async fn test_delete_clears_selected_user() {
        let fx = memory_stores();
        let (mut wizard, _) = open(&fx).await;
        let alice = complete(&mut wizard, "alice").await;
        wizard.start_new().await;
        let bob = complete(&mut wizard, "bob").await;

        wizard.select_user(bob.id).await;
        assert!(wizard.delete_user(alice.id).await.is_success());
        assert_eq!(
            wizard.selected_user().await.into_inner(),
            Some(Some(bob.clone()))
        );

        assert!(wizard.delete_user(bob.id).await.is_success());
        assert_eq!(wizard.selected_user().await.into_inner(), Some(None));
        assert_eq!(wizard.users().await.into_inner(), Some(Vec::new()));

        assert_eq!(wizard.delete_user(bob.id).await.code(), Some("not_found"));
    }
}
