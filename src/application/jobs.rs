//! Network work queued by the wizard and executed off the UI thread.
//!
//! The state machine never calls the gateway itself. It queues [`Job`]s,
//! the runner executes them on worker threads, and the results come back as
//! [`JobOutcome`]s tagged with the ticket they were issued under. A ticket the
//! wizard no longer waits for is stale and its outcome is dropped.

use crate::domain::ApplicationDraft;
use crate::infrastructure::{Gateway, GatewayError};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

pub type Ticket = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    FetchCategories { ticket: Ticket },
    Submit { ticket: Ticket, draft: ApplicationDraft },
}

#[derive(Debug)]
pub enum JobOutcome {
    Categories {
        ticket: Ticket,
        result: Result<Vec<String>, GatewayError>,
    },
    Submission {
        ticket: Ticket,
        result: Result<serde_json::Value, GatewayError>,
    },
}

impl Job {
    /// Performs the network call. Blocks until the gateway answers or times out.
    pub fn run(self, gateway: &dyn Gateway) -> JobOutcome {
        match self {
            Job::FetchCategories { ticket } => JobOutcome::Categories {
                ticket,
                result: gateway.fetch_categories(),
            },
            Job::Submit { ticket, draft } => JobOutcome::Submission {
                ticket,
                result: gateway.submit_application(&draft),
            },
        }
    }
}

/// Runs each job on its own thread and collects the outcomes.
pub struct JobRunner {
    gateway: Arc<dyn Gateway>,
    tx: Sender<JobOutcome>,
    rx: Receiver<JobOutcome>,
}

impl JobRunner {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { gateway, tx, rx }
    }

    pub fn spawn(&self, job: Job) {
        let gateway = Arc::clone(&self.gateway);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let outcome = job.run(gateway.as_ref());
            // The receiver only goes away when the app is shutting down.
            let _ = tx.send(outcome);
        });
    }

    /// Outcomes that have arrived since the last call, without blocking.
    pub fn poll(&self) -> Vec<JobOutcome> {
        self.rx.try_iter().collect()
    }
}
