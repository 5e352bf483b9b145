//! lawdesk-intake - multi-step lead intake wizard
//!
//! One current step, a declarative step graph with named transitions, a
//! validator per step, autosave to a persistent key-value store, and webhook
//! submission.

pub mod error;
pub mod form;
pub mod graph;
pub mod steps;
pub mod submit;
pub mod validation;
pub mod wizard;

pub use error::{Result, WizardError};
pub use form::{
    AddOns, ConsultationSummary, ConsultationType, ContactInfo, IntakeForm, NextSteps,
    SchedulingPreference, DOCUMENT_REVIEW_PRICE, OTHER_REFERRAL, SERVICE_CATALOGUE,
};
pub use graph::{Edge, Guard, StepGraph, Transition};
pub use steps::WizardStep;
pub use submit::{IntakeSubmitter, SubmissionPayload, WebhookSubmitter};
pub use validation::{validate_step, FieldError, ValidationErrors};
pub use wizard::{IntakeWizard, StepTransition, SubmissionOutcome};
