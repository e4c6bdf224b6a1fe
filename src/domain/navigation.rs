//! Step guards for the wizard.
//!
//! The guard is a pure function of the draft, consulted on every step entry,
//! so a request for a later step (for instance via `--route /loan`) is
//! corrected to the earliest step whose prerequisites are missing.

use super::models::{ApplicationDraft, Step};

/// Returns the furthest step the draft currently allows.
///
/// # Examples
///
/// ```
/// use loan_wizard::domain::{required_step_for, ApplicationDraft, Step};
///
/// let draft = ApplicationDraft::default();
/// assert_eq!(required_step_for(&draft), Step::Personal);
/// ```
pub fn required_step_for(draft: &ApplicationDraft) -> Step {
    if !draft.personal_complete() {
        Step::Personal
    } else if !draft.address_complete() {
        Step::Address
    } else {
        Step::Loan
    }
}

/// Resolves a requested step to the one that may actually be shown.
pub fn guard_entry(requested: Step, draft: &ApplicationDraft) -> Step {
    requested.min(required_step_for(draft))
}

/// Maps a route path onto a step. Unknown paths fall back to the first step.
pub fn step_for_path(path: &str) -> Step {
    match path.trim().trim_start_matches('#').trim_end_matches('/') {
        "" => Step::Personal,
        "/address" | "address" => Step::Address,
        "/loan" | "loan" => Step::Loan,
        _ => Step::Personal,
    }
}

pub fn path_for_step(step: Step) -> &'static str {
    match step {
        Step::Personal => "/",
        Step::Address => "/address",
        Step::Loan => "/loan",
    }
}
