//! Per-step validation.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::fmt;

use crate::form::IntakeForm;
use crate::steps::WizardStep;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern");
}

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_EMAIL: &str = "Email seems invalid.";
pub const MISSING_CASE_DETAILS: &str = "Provide case details.";
pub const MISSING_PREFERRED_TIME: &str = "Pick a preferred date/time.";
pub const MISSING_SELECTION: &str = "Please choose an option.";
pub const DISCLAIMER_REQUIRED: &str = "Please accept the disclaimer to continue.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Field-level failures for one step, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    fn push(&mut self, field: &'static str, message: &'static str) {
        self.errors.push(FieldError { field, message });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn message_for(&self, field: &str) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message)
    }

    /// The field that should receive focus.
    pub fn first_field(&self) -> Option<&'static str> {
        self.errors.first().map(|e| e.field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn validate_step(step: WizardStep, form: &IntakeForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    match step {
        WizardStep::ContactInfo => {
            let contact = &form.contact_info;
            let fields = [
                ("fullName", &contact.full_name),
                ("email", &contact.email),
                ("phone", &contact.phone),
                ("location", &contact.location),
            ];
            for (field, value) in fields {
                if value.trim().is_empty() {
                    errors.push(field, REQUIRED);
                } else if field == "email" && !is_valid_email(value) {
                    errors.push(field, INVALID_EMAIL);
                }
            }
        }
        WizardStep::ReferralSource => {
            if form.referral_source.is_empty() {
                errors.push("referralSource", MISSING_SELECTION);
            }
        }
        WizardStep::ServiceType => {
            if form.service_type.is_empty() {
                errors.push("serviceType", MISSING_SELECTION);
            }
        }
        WizardStep::CaseDetails => {
            if form.case_details.trim().is_empty() {
                errors.push("caseDetails", MISSING_CASE_DETAILS);
            }
        }
        WizardStep::ConsultationType => {
            if form.consultation_type.is_none() {
                errors.push("consultationType", MISSING_SELECTION);
            }
        }
        WizardStep::Scheduling => {
            if form.scheduling.preferred_date_time.trim().is_empty() {
                errors.push("preferredDateTime", MISSING_PREFERRED_TIME);
            }
        }
        WizardStep::Disclaimer => {
            if !form.disclaimer_accepted {
                errors.push("disclaimerAccepted", DISCLAIMER_REQUIRED);
            }
        }
        WizardStep::AddOns | WizardStep::Success => {}
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
