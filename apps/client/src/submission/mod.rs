//! Submission flow — sends the four form fields to start generation.
//!
//! The controller tracks the busy state a form would show: progress
//! indicator visible and submit disabled while the request is in flight.

use std::sync::Arc;

use tracing::{error, info};

use crate::api_client::GrantService;
use crate::errors::GENERIC_SUBMIT_ERROR;
use crate::models::{GenerationRequest, GenerationStatus};

pub const PROGRESS_MESSAGE: &str = "Generating your grant application. This may take a few minutes...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionView {
    pub progress_visible: bool,
    pub submit_enabled: bool,
    pub status_message: Option<String>,
}

impl Default for SubmissionView {
    fn default() -> Self {
        Self {
            progress_visible: false,
            submit_enabled: true,
            status_message: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Generation started; continue on the review screen.
    Redirect,
    /// Nothing started. Carries the message now on screen.
    Failed(String),
    /// A request was already in flight.
    Ignored,
}

pub struct SubmissionController {
    service: Arc<dyn GrantService>,
    view: SubmissionView,
    form: GenerationRequest,
}

impl SubmissionController {
    pub fn new(service: Arc<dyn GrantService>) -> Self {
        Self {
            service,
            view: SubmissionView::default(),
            form: GenerationRequest::default(),
        }
    }

    pub fn view(&self) -> &SubmissionView {
        &self.view
    }

    /// Values from the last submission, kept for a retry.
    pub fn form(&self) -> &GenerationRequest {
        &self.form
    }

    pub async fn submit(&mut self, request: GenerationRequest) -> SubmitOutcome {
        if !self.view.submit_enabled {
            return SubmitOutcome::Ignored;
        }
        self.form = request;

        if let Err(e) = self.form.validate() {
            let message = e.user_message(GENERIC_SUBMIT_ERROR);
            self.view.status_message = Some(message.clone());
            return SubmitOutcome::Failed(message);
        }

        self.view = SubmissionView {
            progress_visible: true,
            submit_enabled: false,
            status_message: Some(PROGRESS_MESSAGE.to_string()),
        };
        info!("Submitting grant request for {}", self.form.nonprofit_name);

        let message = match self.service.generate(&self.form).await {
            Ok(response) if response.status == GenerationStatus::Processing => {
                info!("Grant generation started");
                return SubmitOutcome::Redirect;
            }
            Ok(response) => {
                error!(
                    "Generation not started (status '{}'): {:?}",
                    response.status.as_str(),
                    response.message
                );
                response
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| GENERIC_SUBMIT_ERROR.to_string())
            }
            Err(e) => e.user_message(GENERIC_SUBMIT_ERROR),
        };

        self.view = SubmissionView {
            progress_visible: false,
            submit_enabled: true,
            status_message: Some(message.clone()),
        };
        SubmitOutcome::Failed(message)
    }
}
