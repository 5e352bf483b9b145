use lawdesk_core::CoreError;
use thiserror::Error;

use crate::graph::Transition;
use crate::steps::WizardStep;
use crate::validation::ValidationErrors;

#[derive(Error, Debug)]
pub enum WizardError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("No '{transition}' transition from step {from}")]
    InvalidTransition {
        from: WizardStep,
        transition: Transition,
    },

    #[error("Unknown service: {0}")]
    UnknownService(String),

    #[error("Storage error: {0}")]
    Storage(#[from] CoreError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Submission rejected: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

pub type Result<T> = std::result::Result<T, WizardError>;
