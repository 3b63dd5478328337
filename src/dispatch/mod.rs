//! User-triggered backend actions: each one disables its control, performs a
//! single request, reports the outcome through the shared [`Notifier`] and
//! re-enables the control.

pub mod control;
pub mod controller;
pub mod navigate;
pub mod notify;
pub mod outcome;

pub use control::ControlHandle;
pub use controller::ActionController;
pub use navigate::{Location, Navigator};
pub use notify::{Notification, Notifier, Severity};
pub use outcome::Outcome;

use crate::api::ApiResponse;
use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Poll,
    GenerateBriefing,
    Reclassify,
}

impl ActionKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Poll => "poll",
            Self::GenerateBriefing => "generate-briefing",
            Self::Reclassify => "reclassify",
        }
    }

    /// Label shown while the control is idle. Reclassify keeps its label.
    pub fn idle_label(self) -> Option<&'static str> {
        match self {
            Self::Poll => Some("Poll Now"),
            Self::GenerateBriefing => Some("Generate Briefing"),
            Self::Reclassify => None,
        }
    }

    pub fn busy_label(self) -> Option<&'static str> {
        match self {
            Self::Poll => Some("Polling..."),
            Self::GenerateBriefing => Some("Generating..."),
            Self::Reclassify => None,
        }
    }

    pub fn failure_message(self) -> &'static str {
        match self {
            Self::Poll => "Poll failed",
            Self::GenerateBriefing => "Failed to generate briefing",
            Self::Reclassify => "Failed to reclassify",
        }
    }

    pub fn interpret(self, response: Result<ApiResponse, ClientError>) -> Outcome {
        match self {
            Self::Poll => outcome::interpret_poll(response),
            Self::GenerateBriefing => outcome::interpret_briefing(response),
            Self::Reclassify => outcome::interpret_reclassify(response),
        }
    }
}
