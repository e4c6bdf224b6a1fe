//! Wizard state for the loan application.
//!
//! [`App`] owns the draft store, the category cache and the edit buffers of
//! the three steps. Every step change goes through the navigation guard and
//! network work leaves as queued [`Job`]s.

use super::jobs::{Job, JobOutcome, Ticket};
use crate::domain::{
    AddressForm, ApplicationDraft, DraftPatch, Field, LoanForm, PersonalForm, Step,
    ValidationErrors, guard_entry,
};
use crate::infrastructure::{CategoryCatalog, Clock, DraftStore};

pub const SUBMISSION_FAILED_MESSAGE: &str = "something went wrong";

/// Workplace categories as seen by the address screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryState {
    Loading,
    Ready(Vec<String>),
    Failed(String),
}

impl CategoryState {
    pub fn names(&self) -> &[String] {
        match self {
            CategoryState::Ready(names) => names,
            _ => &[],
        }
    }
}

/// What the completion dialog shows: the submitted draft and the endpoint's reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub draft: ApplicationDraft,
    pub response: serde_json::Value,
}

impl Completion {
    pub fn message(&self) -> String {
        format!(
            "Congratulations, {} {}. You have been approved for {}$ for a period of {} days.",
            self.draft.last_name, self.draft.first_name, self.draft.amount, self.draft.term
        )
    }

    pub fn reference(&self) -> Option<String> {
        match self.response.get("id")? {
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Dialog {
    Hidden,
    Shown(Completion),
}

/// Main application state for the wizard.
#[derive(Debug)]
pub struct App {
    /// Step currently on screen
    pub step: Step,
    /// Index into `step.fields()` of the focused field
    pub focus: usize,
    pub personal: PersonalForm,
    pub address: AddressForm,
    pub loan: LoanForm,
    pub categories: CategoryState,
    /// Messages from the last failed submit of the current step
    pub errors: ValidationErrors,
    /// Form-level message on the loan step
    pub form_error: Option<String>,
    pub dialog: Dialog,
    /// Temporary status message to display
    pub status_message: Option<String>,
    store: DraftStore,
    catalog: CategoryCatalog,
    clock: Box<dyn Clock>,
    jobs: Vec<Job>,
    next_ticket: Ticket,
    pending_categories: Option<Ticket>,
    pending_submission: Option<Ticket>,
}

impl App {
    /// Builds the wizard on the first step. Call [`App::navigate`] to honour a
    /// requested starting route.
    pub fn new(store: DraftStore, catalog: CategoryCatalog, clock: Box<dyn Clock>) -> Self {
        let draft = store.get();
        let personal = PersonalForm::from_draft(draft);
        let address = AddressForm::from_draft(draft);
        let loan = LoanForm::from_draft(draft);
        Self {
            step: Step::Personal,
            focus: 0,
            personal,
            address,
            loan,
            categories: CategoryState::Loading,
            errors: ValidationErrors::new(),
            form_error: None,
            dialog: Dialog::Hidden,
            status_message: None,
            store,
            catalog,
            clock,
            jobs: Vec::new(),
            next_ticket: 1,
            pending_categories: None,
            pending_submission: None,
        }
    }

    pub fn draft(&self) -> &ApplicationDraft {
        self.store.get()
    }

    pub fn is_submitting(&self) -> bool {
        self.pending_submission.is_some()
    }

    pub fn focused_field(&self) -> Field {
        let fields = self.step.fields();
        fields[self.focus.min(fields.len() - 1)]
    }

    /// Requests a step. The guard redirects to the earliest step whose
    /// prerequisites are missing.
    pub fn navigate(&mut self, requested: Step) {
        let target = guard_entry(requested, self.store.get());
        if target != requested {
            tracing::warn!(?requested, ?target, "step prerequisites missing, redirecting");
            self.status_message = Some(format!(
                "Complete \"{}\" before continuing",
                target.title()
            ));
        }
        self.enter(target);
    }

    fn enter(&mut self, step: Step) {
        if self.step != step {
            tracing::info!(from = ?self.step, to = ?step, "changing step");
        }
        if step != Step::Loan && self.pending_submission.take().is_some() {
            tracing::info!("left the loan step with a submission in flight");
        }
        if step != Step::Address {
            self.pending_categories = None;
        }

        self.step = step;
        self.focus = 0;
        self.errors = ValidationErrors::new();
        self.form_error = None;

        let draft = self.store.get();
        match step {
            Step::Personal => self.personal = PersonalForm::from_draft(draft),
            Step::Address => {
                self.address = AddressForm::from_draft(draft);
                self.load_categories();
            }
            Step::Loan => self.loan = LoanForm::from_draft(draft),
        }
    }

    /// Serves categories from the cache, or queues a fetch on a miss.
    fn load_categories(&mut self) {
        let now = self.clock.now_ms();
        if let Some(names) = self.catalog.cached(now) {
            tracing::debug!(count = names.len(), "categories served from cache");
            self.categories = CategoryState::Ready(names);
            return;
        }
        if self.pending_categories.is_some() {
            return;
        }
        let ticket = self.issue_ticket();
        self.pending_categories = Some(ticket);
        self.categories = CategoryState::Loading;
        self.jobs.push(Job::FetchCategories { ticket });
    }

    pub fn retry_categories(&mut self) {
        if self.step == Step::Address && self.pending_categories.is_none() {
            self.load_categories();
        }
    }

    fn issue_ticket(&mut self) -> Ticket {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        ticket
    }

    fn save(&mut self, patch: DraftPatch) {
        if let Err(e) = self.store.merge(patch) {
            tracing::error!(error = %e, "could not persist draft");
            self.status_message = Some(format!("Could not save progress: {e}"));
        }
    }

    /// Validates the current step. On success the values are merged into the
    /// draft and the wizard moves on; on the last step a submission is queued.
    pub fn submit_step(&mut self) {
        if matches!(self.dialog, Dialog::Shown(_)) {
            return;
        }
        let result = match self.step {
            Step::Personal => self.personal.validate(),
            Step::Address => self.address.validate(self.categories.names()),
            Step::Loan => {
                if self.is_submitting() {
                    return;
                }
                self.loan.validate()
            }
        };

        let patch = match result {
            Ok(patch) => patch,
            Err(errors) => {
                tracing::debug!(step = ?self.step, failed = errors.len(), "step validation failed");
                if let Some(first) = errors.iter().next() {
                    let field = first.field;
                    self.focus = self
                        .step
                        .fields()
                        .iter()
                        .position(|f| *f == field)
                        .unwrap_or(0);
                }
                self.errors = errors;
                return;
            }
        };

        self.errors = ValidationErrors::new();
        self.save(patch);
        match self.step.next() {
            Some(next) => self.navigate(next),
            None => self.queue_submission(),
        }
    }

    fn queue_submission(&mut self) {
        let ticket = self.issue_ticket();
        self.pending_submission = Some(ticket);
        self.form_error = None;
        tracing::info!(ticket, "queueing loan application submission");
        self.jobs.push(Job::Submit {
            ticket,
            draft: self.store.get().clone(),
        });
    }

    /// Keeps the unvalidated edits of the current step and moves back one step.
    pub fn go_back(&mut self) {
        if matches!(self.dialog, Dialog::Shown(_)) {
            return;
        }
        let Some(previous) = self.step.previous() else {
            return;
        };
        let patch = match self.step {
            Step::Personal => self.personal.to_patch(),
            Step::Address => self.address.to_patch(),
            Step::Loan => self.loan.to_patch(),
        };
        self.save(patch);
        self.navigate(previous);
    }

    /// Hands queued network work to the caller.
    pub fn take_jobs(&mut self) -> Vec<Job> {
        std::mem::take(&mut self.jobs)
    }

    pub fn apply_outcome(&mut self, outcome: JobOutcome) {
        match outcome {
            JobOutcome::Categories { ticket, result } => {
                let current = self.pending_categories == Some(ticket);
                match result {
                    Ok(names) => {
                        if let Err(e) = self.catalog.record(&names, self.clock.now_ms()) {
                            tracing::warn!(error = %e, "could not cache categories");
                        }
                        if current {
                            tracing::info!(count = names.len(), "categories loaded");
                            self.categories = CategoryState::Ready(names);
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to fetch categories");
                        if current {
                            self.categories = CategoryState::Failed(e.to_string());
                        }
                    }
                }
                if current {
                    self.pending_categories = None;
                } else {
                    tracing::debug!(ticket, "dropping stale category result");
                }
            }
            JobOutcome::Submission { ticket, result } => {
                if self.pending_submission != Some(ticket) {
                    tracing::info!(ticket, "ignoring response for an abandoned submission");
                    return;
                }
                self.pending_submission = None;
                match result {
                    Ok(response) => {
                        tracing::info!(ticket, "loan application submitted");
                        self.dialog = Dialog::Shown(Completion {
                            draft: self.store.get().clone(),
                            response,
                        });
                    }
                    Err(e) => {
                        tracing::error!(ticket, error = %e, "error submitting application");
                        self.form_error = Some(SUBMISSION_FAILED_MESSAGE.to_string());
                    }
                }
            }
        }
    }

    /// Hides the completion dialog and keeps the draft.
    pub fn close_dialog(&mut self) {
        self.dialog = Dialog::Hidden;
    }

    /// Clears the draft and returns to the first step.
    pub fn start_new_application(&mut self) {
        if let Err(e) = self.store.reset() {
            tracing::error!(error = %e, "could not clear persisted draft");
            self.status_message = Some(format!("Could not clear saved data: {e}"));
        }
        self.dialog = Dialog::Hidden;
        self.personal = PersonalForm::default();
        self.address = AddressForm::default();
        self.loan = LoanForm::default();
        tracing::info!("starting a new application");
        self.enter(Step::Personal);
    }

    pub fn focus_next(&mut self) {
        let len = self.step.fields().len();
        self.focus = (self.focus + 1) % len;
    }

    pub fn focus_previous(&mut self) {
        let len = self.step.fields().len();
        self.focus = (self.focus + len - 1) % len;
    }

    fn focused_text_mut(&mut self) -> Option<&mut String> {
        let field = self.focused_field();
        match self.step {
            Step::Personal => self.personal.text_mut(field),
            Step::Address => self.address.text_mut(field),
            Step::Loan => self.loan.text_mut(field),
        }
    }

    /// Types a character into the focused text field. Numeric fields accept
    /// digits only and the phone field accepts dialling characters.
    pub fn insert_char(&mut self, c: char) {
        let field = self.focused_field();
        let accepted = match field {
            Field::Phone => c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')'),
            Field::Amount | Field::Term => c.is_ascii_digit(),
            Field::Gender | Field::Workplace => false,
            _ => !c.is_control(),
        };
        if !accepted {
            return;
        }
        if let Some(text) = self.focused_text_mut() {
            text.push(c);
            self.errors.clear(field);
        }
    }

    pub fn delete_char(&mut self) {
        let field = self.focused_field();
        if let Some(text) = self.focused_text_mut() {
            text.pop();
            self.errors.clear(field);
        }
    }

    /// Left/right on a choice or slider field.
    pub fn adjust(&mut self, forward: bool) {
        let field = self.focused_field();
        match field {
            Field::Gender => self.personal.cycle_gender(forward),
            Field::Workplace => {
                let names = self.categories.names().to_vec();
                self.address.cycle_workplace(&names, forward);
            }
            Field::Amount | Field::Term => self.loan.slide(field, if forward { 1 } else { -1 }),
            _ => return,
        }
        self.errors.clear(field);
    }
}
