//! Wizard steps
//!
//! Steps are numbered 1..=9 in the order they are shown. The number is what
//! gets persisted, so the order must not change.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    ContactInfo,
    ReferralSource,
    ServiceType,
    CaseDetails,
    ConsultationType,
    AddOns,
    Scheduling,
    Disclaimer,
    /// Terminal step shown after a successful submission.
    Success,
}

impl WizardStep {
    pub const ALL: [WizardStep; 9] = [
        WizardStep::ContactInfo,
        WizardStep::ReferralSource,
        WizardStep::ServiceType,
        WizardStep::CaseDetails,
        WizardStep::ConsultationType,
        WizardStep::AddOns,
        WizardStep::Scheduling,
        WizardStep::Disclaimer,
        WizardStep::Success,
    ];

    pub fn number(self) -> u8 {
        match self {
            WizardStep::ContactInfo => 1,
            WizardStep::ReferralSource => 2,
            WizardStep::ServiceType => 3,
            WizardStep::CaseDetails => 4,
            WizardStep::ConsultationType => 5,
            WizardStep::AddOns => 6,
            WizardStep::Scheduling => 7,
            WizardStep::Disclaimer => 8,
            WizardStep::Success => 9,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.number() == number)
    }

    pub fn is_terminal(self) -> bool {
        self == WizardStep::Success
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::ContactInfo => "Contact Information",
            WizardStep::ReferralSource => "How Did You Hear About Us?",
            WizardStep::ServiceType => "Service Needed",
            WizardStep::CaseDetails => "Case Details",
            WizardStep::ConsultationType => "Consultation Type",
            WizardStep::AddOns => "Optional Add-ons",
            WizardStep::Scheduling => "Scheduling",
            WizardStep::Disclaimer => "Disclaimer",
            WizardStep::Success => "Submitted",
        }
    }

    /// Progress bar width. The success step is excluded from the count, so
    /// the disclaimer already reads 100.
    pub fn progress_percent(self) -> u8 {
        let total = (Self::ALL.len() - 1) as f64;
        let ratio = ((self.number() - 1) as f64 / (total - 1.0)).min(1.0);
        (ratio * 100.0).round() as u8
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.number(), self.title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_round_trip() {
        for step in WizardStep::ALL {
            assert_eq!(WizardStep::from_number(step.number()), Some(step));
        }
        assert_eq!(WizardStep::from_number(0), None);
        assert_eq!(WizardStep::from_number(10), None);
    }

    #[test]
    fn progress_runs_from_zero_to_full() {
        assert_eq!(WizardStep::ContactInfo.progress_percent(), 0);
        assert_eq!(WizardStep::Disclaimer.progress_percent(), 100);
        assert_eq!(WizardStep::Success.progress_percent(), 100);
        assert!(WizardStep::CaseDetails.progress_percent() > WizardStep::ServiceType.progress_percent());
    }
}
