//! Page controller
//!
//! Owns the state of one loaded page: the record list, the creation panel and
//! the pending notification. The list is filled once by [`PageController::load`]
//! and afterwards only grows by records the API confirmed.

pub mod panel;
pub mod view;

pub use panel::{PanelError, PanelState};

use crate::client::MemoirApi;
use crate::error::Result;
use crate::models::{Draft, FieldErrors, Record};

pub const CREATE_FAILED_MESSAGE: &str = "Could not register the new memoir";
pub const CREATE_FAILED_DESCRIPTION: &str = "An unexpected error occurred";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Error,
}

/// Transient, non-blocking message shown on the next render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub description: String,
}

impl Notification {
    pub fn create_failed() -> Self {
        Notification {
            level: NotificationLevel::Error,
            message: CREATE_FAILED_MESSAGE.to_string(),
            description: CREATE_FAILED_DESCRIPTION.to_string(),
        }
    }
}

/// How a finished create request changed the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Record appended, panel closed
    Created,
    /// Nothing appended, panel reopened with the draft, notification queued
    Failed,
}

#[derive(Debug, Clone, Default)]
pub struct PageController {
    records: Vec<Record>,
    panel: PanelState,
    notification: Option<Notification>,
}

impl PageController {
    pub fn new(records: Vec<Record>) -> Self {
        PageController {
            records,
            ..Default::default()
        }
    }

    /// Initial load. Errors are returned untouched for the page-level error handler.
    pub async fn load(api: &dyn MemoirApi) -> Result<Self> {
        let records = api.list_records().await?;
        tracing::info!("Loaded page with {} records", records.len());
        Ok(Self::new(records))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn panel(&self) -> &PanelState {
        &self.panel
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    /// Remove the pending notification so it is shown only once
    pub fn take_notification(&mut self) -> Option<Notification> {
        self.notification.take()
    }

    /// Show the creation panel with an empty draft. No-op when already visible.
    pub fn open(&mut self) {
        if matches!(self.panel, PanelState::Closed) {
            self.panel = PanelState::Open {
                draft: Draft::default(),
                errors: FieldErrors::default(),
            };
        }
    }

    /// Hide the creation panel, discarding the draft
    pub fn close(&mut self) -> std::result::Result<(), PanelError> {
        match self.panel {
            PanelState::Closed => Ok(()),
            PanelState::Open { .. } => {
                self.panel = PanelState::Closed;
                Ok(())
            }
            PanelState::Submitting { .. } => Err(PanelError::Busy),
        }
    }

    /// Replace the draft fields of the open panel
    pub fn update_draft(&mut self, draft: Draft) -> std::result::Result<(), PanelError> {
        match &mut self.panel {
            PanelState::Open { draft: current, .. } => {
                *current = draft;
                Ok(())
            }
            PanelState::Submitting { .. } => Err(PanelError::Busy),
            PanelState::Closed => Err(PanelError::NotOpen),
        }
    }

    /// Validate `draft` and move to `Submitting`, returning the payload to send.
    ///
    /// At most one submission is in flight: while `Submitting` this fails with
    /// [`PanelError::Busy`] and no request must be issued.
    pub fn begin_submit(&mut self, draft: Draft) -> std::result::Result<Draft, PanelError> {
        match self.panel {
            PanelState::Closed => return Err(PanelError::NotOpen),
            PanelState::Submitting { .. } => return Err(PanelError::Busy),
            PanelState::Open { .. } => {}
        }

        if let Err(errors) = draft.validate() {
            self.panel = PanelState::Open { draft, errors };
            return Err(PanelError::InvalidDraft(errors));
        }

        self.panel = PanelState::Submitting {
            draft: draft.clone(),
        };
        Ok(draft)
    }

    /// Apply the result of the create request started by [`begin_submit`](Self::begin_submit)
    pub fn complete_submit(
        &mut self,
        result: Result<Record>,
    ) -> std::result::Result<SubmitOutcome, PanelError> {
        let draft = match std::mem::take(&mut self.panel) {
            PanelState::Submitting { draft } => draft,
            other => {
                self.panel = other;
                return Err(PanelError::NothingInFlight);
            }
        };

        match result {
            Ok(record) => {
                tracing::info!("Registered memoir {:?}", record.label);
                self.records.push(record);
                self.panel = PanelState::Closed;
                Ok(SubmitOutcome::Created)
            }
            Err(e) => {
                tracing::error!("Failed to register memoir {:?}: {}", draft.label, e);
                self.notification = Some(Notification::create_failed());
                self.panel = PanelState::Open {
                    draft,
                    errors: FieldErrors::default(),
                };
                Ok(SubmitOutcome::Failed)
            }
        }
    }

    /// Submit `draft` and wait for the API. For callers that own the controller
    /// for the whole request; shared callers use the begin/complete pair.
    pub async fn submit(
        &mut self,
        api: &dyn MemoirApi,
        draft: Draft,
    ) -> std::result::Result<SubmitOutcome, PanelError> {
        let payload = self.begin_submit(draft)?;
        let result = api.create_record(&payload).await;
        self.complete_submit(result)
    }
}
