//! Creation panel state machine
//!
//! ```text
//! Closed --open--> Open --submit--> Submitting --success--> Closed
//!                   ^  \                 |
//!                   |   `--close--> Closed
//!                   `------failure-------'
//! ```

use crate::models::{Draft, FieldErrors};
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PanelState {
    #[default]
    Closed,
    /// Panel visible; `errors` holds field messages from the last rejected submit
    Open { draft: Draft, errors: FieldErrors },
    /// A create request for `draft` is in flight
    Submitting { draft: Draft },
}

impl PanelState {
    pub fn is_visible(&self) -> bool {
        !matches!(self, PanelState::Closed)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, PanelState::Submitting { .. })
    }

    pub fn draft(&self) -> Option<&Draft> {
        match self {
            PanelState::Closed => None,
            PanelState::Open { draft, .. } | PanelState::Submitting { draft } => Some(draft),
        }
    }

    pub fn field_errors(&self) -> FieldErrors {
        match self {
            PanelState::Open { errors, .. } => *errors,
            _ => FieldErrors::default(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PanelState::Closed => "closed",
            PanelState::Open { .. } => "open",
            PanelState::Submitting { .. } => "submitting",
        }
    }
}

/// Rejected panel transition. State is left untouched except where noted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PanelError {
    #[error("creation panel is not open")]
    NotOpen,

    #[error("a submission is already in flight")]
    Busy,

    #[error("no submission is in flight")]
    NothingInFlight,

    /// The draft is kept and the errors are recorded on the open panel
    #[error("draft is missing required fields")]
    InvalidDraft(FieldErrors),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let closed = PanelState::Closed;
        assert!(!closed.is_visible());
        assert!(closed.draft().is_none());

        let open = PanelState::Open {
            draft: Draft::new("a", ""),
            errors: FieldErrors {
                label: None,
                value: Some(crate::models::VALUE_REQUIRED),
            },
        };
        assert!(open.is_visible());
        assert!(!open.is_submitting());
        assert_eq!(open.draft().unwrap().label, "a");
        assert!(open.field_errors().value.is_some());

        let submitting = PanelState::Submitting {
            draft: Draft::new("a", "1"),
        };
        assert!(submitting.is_visible());
        assert!(submitting.is_submitting());
        assert!(submitting.field_errors().is_empty());
        assert_eq!(submitting.name(), "submitting");
    }
}
