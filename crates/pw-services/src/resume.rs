//! Resume detection
//!
//! Decides from the draft store's key set alone whether an unfinished draft
//! exists and which step to present next. Re-run whenever the form becomes
//! visible; the answer is never cached.

use std::collections::BTreeSet;

use pw_models::Section;
use pw_store::{DraftStore, StoreResult};
use serde::Serialize;
use tracing::{debug, warn};

/// Outcome of inspecting the draft key set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResumeDecision {
    /// Nothing has been drafted
    NoDraft,
    /// Some sections are stored; continue at `step`
    Resume {
        step: Section,
        present: Vec<Section>,
        /// `false` when the stored sections are not the first N of the registry
        contiguous: bool,
    },
    /// Every section is stored: the draft is complete and waiting to be committed
    Complete,
}

impl ResumeDecision {
    /// Step to present when the user accepts the resume prompt
    pub fn resume_step(&self) -> Option<Section> {
        match self {
            ResumeDecision::Resume { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// Whether the UI should offer to continue an unsaved draft
    pub fn should_prompt(&self) -> bool {
        matches!(self, ResumeDecision::Resume { .. })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResumeDetector;

impl ResumeDetector {
    /// Decide from a key set.
    ///
    /// With N registry sections present and `0 < N < 4`, the next step is
    /// `N + 1` regardless of which N sections they are. Keys outside the
    /// registry are ignored.
    pub fn detect(keys: &BTreeSet<String>) -> ResumeDecision {
        let present: Vec<Section> = Section::ALL
            .into_iter()
            .filter(|section| keys.contains(section.key()))
            .collect();

        let unknown: Vec<&str> = keys
            .iter()
            .map(String::as_str)
            .filter(|key| Section::from_key(key).is_none())
            .collect();
        if !unknown.is_empty() {
            warn!(?unknown, "Inconsistent draft state: ignoring keys outside the step registry");
        }

        let count = present.len();
        if count == 0 {
            return ResumeDecision::NoDraft;
        }
        if count >= Section::COUNT {
            return ResumeDecision::Complete;
        }

        let contiguous = present
            .iter()
            .zip(Section::ALL.iter())
            .all(|(have, expected)| have == expected);
        if !contiguous {
            warn!(
                ?present,
                "Inconsistent draft state: sections are not contiguous, resuming by count"
            );
        }

        let step = Section::ALL[count];
        debug!(%step, count, "Unfinished draft found");
        ResumeDecision::Resume {
            step,
            present,
            contiguous,
        }
    }

    /// Read the current key set and decide
    pub async fn inspect(drafts: &DraftStore) -> StoreResult<ResumeDecision> {
        let keys = drafts.keys().await?;
        Ok(Self::detect(&keys))
    }
}
