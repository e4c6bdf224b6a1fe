use crate::domain::ApplicationDraft;
use crate::infrastructure::{Gateway, GatewayError, SubmissionPayload};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Scripted gateway that counts the calls it receives.
#[derive(Debug, Default)]
pub struct FakeGateway {
    categories: Mutex<Vec<String>>,
    categories_status: Mutex<Option<u16>>,
    submit_status: Mutex<Option<u16>>,
    submitted: Mutex<Vec<SubmissionPayload>>,
    fetches: AtomicUsize,
}

impl FakeGateway {
    pub fn with_categories(names: &[&str]) -> Self {
        let gateway = Self::default();
        *gateway.categories.lock().unwrap() = names.iter().map(|n| n.to_string()).collect();
        gateway
    }

    pub fn fail_categories(&self, status: u16) {
        *self.categories_status.lock().unwrap() = Some(status);
    }

    pub fn fail_submissions(&self, status: u16) {
        *self.submit_status.lock().unwrap() = Some(status);
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> Vec<SubmissionPayload> {
        self.submitted.lock().unwrap().clone()
    }
}

impl Gateway for FakeGateway {
    fn fetch_categories(&self) -> Result<Vec<String>, GatewayError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match *self.categories_status.lock().unwrap() {
            Some(status) => Err(GatewayError::Status(status)),
            None => Ok(self.categories.lock().unwrap().clone()),
        }
    }

    fn submit_application(
        &self,
        draft: &ApplicationDraft,
    ) -> Result<serde_json::Value, GatewayError> {
        let payload = SubmissionPayload::from(draft);
        self.submitted.lock().unwrap().push(payload.clone());
        match *self.submit_status.lock().unwrap() {
            Some(status) => Err(GatewayError::Status(status)),
            None => Ok(serde_json::json!({
                "id": 195,
                "title": payload.title,
                "price": payload.price,
                "category": payload.category,
            })),
        }
    }
}
