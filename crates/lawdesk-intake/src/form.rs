//! Intake form model
//!
//! Field names serialize in camelCase; the same document is autosaved,
//! restored, and posted to the submission webhook.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Services offered on the service-type step.
pub const SERVICE_CATALOGUE: [&str; 5] = [
    "Real Estate Litigation",
    "Boundary Disputes",
    "Quiet Title Actions",
    "Contract Review",
    "Closings",
];

pub const DOCUMENT_REVIEW_PRICE: u32 = 150;

/// Referral value that unlocks the free-text details field.
pub const OTHER_REFERRAL: &str = "other";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsultationType {
    Free,
    Paid,
}

impl ConsultationType {
    pub fn description(self) -> &'static str {
        match self {
            ConsultationType::Paid => "Full 60-Minute Consultation",
            ConsultationType::Free => "Brief 15-Minute Call",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddOns {
    pub document_review: bool,
    pub consultation_transcript: bool,
}

impl Default for AddOns {
    fn default() -> Self {
        Self {
            document_review: false,
            consultation_transcript: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulingPreference {
    pub preferred_date_time: String,
    pub alternative_date_time: String,
    pub zoom_preference: bool,
    pub additional_notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntakeForm {
    /// Number of the step the user was on when the form was last saved.
    pub step: u8,
    pub contact_info: ContactInfo,
    pub referral_source: String,
    pub other_referral_details: String,
    pub service_type: String,
    pub case_details: String,
    pub consultation_type: Option<ConsultationType>,
    pub consultation_price: u32,
    pub addons: AddOns,
    pub scheduling: SchedulingPreference,
    pub disclaimer_accepted: bool,
    pub total_amount: u32,
}

impl Default for IntakeForm {
    fn default() -> Self {
        Self {
            step: 1,
            contact_info: ContactInfo::default(),
            referral_source: String::new(),
            other_referral_details: String::new(),
            service_type: String::new(),
            case_details: String::new(),
            consultation_type: None,
            consultation_price: 0,
            addons: AddOns::default(),
            scheduling: SchedulingPreference::default(),
            disclaimer_accepted: false,
            total_amount: 0,
        }
    }
}

impl IntakeForm {
    pub fn is_paid(&self) -> bool {
        self.consultation_type == Some(ConsultationType::Paid)
    }

    /// Recompute `total_amount` from the consultation price and add-ons.
    /// Add-ons only apply to paid consultations.
    pub fn recalculate_total(&mut self) {
        let mut total = self.consultation_price;
        if self.is_paid() && self.addons.document_review {
            total += DOCUMENT_REVIEW_PRICE;
        }
        self.total_amount = total;
    }

    pub fn summary(&self) -> ConsultationSummary {
        let mut addons = Vec::new();
        if self.is_paid() {
            if self.addons.document_review {
                addons.push(format!("Document Review Service (+${DOCUMENT_REVIEW_PRICE})"));
            }
            if self.addons.consultation_transcript {
                addons.push("Consultation Transcript (free)".to_string());
            }
        }

        ConsultationSummary {
            service: self.service_type.clone(),
            consultation: self
                .consultation_type
                .unwrap_or(ConsultationType::Free)
                .description()
                .to_string(),
            addons,
            total_cost: if self.is_paid() {
                format!("${}", self.total_amount)
            } else {
                "FREE".to_string()
            },
            preferred: format_preferred(&self.scheduling.preferred_date_time),
            zoom: self.scheduling.zoom_preference,
        }
    }

    pub fn next_steps(&self) -> NextSteps {
        if self.is_paid() {
            NextSteps {
                message: "Your paid consultation request has been submitted successfully.",
                items: vec![
                    "Payment link will be emailed within 10 minutes.",
                    "Confirm payment to lock in the appointment.",
                    "Calendar invite with Zoom details will follow.",
                    "Prepare materials ahead of the consultation.",
                ],
            }
        } else {
            NextSteps {
                message: "Your free consultation request has been submitted successfully.",
                items: vec![
                    "Calendar invite will be emailed shortly.",
                    "Initial 15-minute call to assess need.",
                    "We may recommend a full consultation afterward.",
                ],
            }
        }
    }
}

fn format_preferred(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return "Not selected".to_string();
    }
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.format("%b %-d, %Y %-I:%M %p").to_string())
        .unwrap_or_else(|| raw.to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConsultationSummary {
    pub service: String,
    pub consultation: String,
    pub addons: Vec<String>,
    pub total_cost: String,
    pub preferred: String,
    pub zoom: bool,
}

impl fmt::Display for ConsultationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Service: {}", self.service)?;
        writeln!(f, "Consultation Type: {}", self.consultation)?;
        if !self.addons.is_empty() {
            writeln!(f, "Add-ons: {}", self.addons.join(", "))?;
        }
        writeln!(f, "Total Cost: {}", self.total_cost)?;
        writeln!(f, "Preferred: {}", self.preferred)?;
        write!(f, "Zoom Preference: {}", if self.zoom { "Yes" } else { "No" })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NextSteps {
    pub message: &'static str,
    pub items: Vec<&'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_match_fresh_form() {
        let form = IntakeForm::default();
        assert_eq!(form.step, 1);
        assert!(!form.addons.document_review);
        assert!(form.addons.consultation_transcript);
        assert_eq!(form.total_amount, 0);
    }

    #[test]
    fn serializes_camel_case() {
        let value = serde_json::to_value(IntakeForm::default()).unwrap();
        assert_eq!(value["contactInfo"]["fullName"], "");
        assert_eq!(value["addons"]["consultationTranscript"], true);
        assert_eq!(value["disclaimerAccepted"], false);
        assert!(value["consultationType"].is_null());
    }

    #[test]
    fn partial_saved_document_merges_over_defaults() {
        let form: IntakeForm = serde_json::from_value(json!({
            "step": 4,
            "contactInfo": { "fullName": "Ana" },
            "consultationType": "paid"
        }))
        .unwrap();

        assert_eq!(form.step, 4);
        assert_eq!(form.contact_info.full_name, "Ana");
        assert_eq!(form.consultation_type, Some(ConsultationType::Paid));
        assert!(form.addons.consultation_transcript);
    }

    #[test]
    fn document_review_adds_to_paid_total_only() {
        let mut form = IntakeForm {
            consultation_type: Some(ConsultationType::Paid),
            consultation_price: 250,
            ..IntakeForm::default()
        };
        form.addons.document_review = true;
        form.recalculate_total();
        assert_eq!(form.total_amount, 400);

        form.consultation_type = Some(ConsultationType::Free);
        form.consultation_price = 0;
        form.recalculate_total();
        assert_eq!(form.total_amount, 0);
    }

    #[test]
    fn summary_differs_for_free_and_paid() {
        let mut form = IntakeForm {
            service_type: "Boundary Disputes".to_string(),
            consultation_type: Some(ConsultationType::Paid),
            consultation_price: 250,
            ..IntakeForm::default()
        };
        form.addons.document_review = true;
        form.scheduling.preferred_date_time = "2026-11-02T09:30".to_string();
        form.recalculate_total();

        let paid = form.summary();
        assert_eq!(paid.consultation, "Full 60-Minute Consultation");
        assert_eq!(paid.total_cost, "$400");
        assert_eq!(paid.addons.len(), 2);
        assert_eq!(paid.preferred, "Nov 2, 2026 9:30 AM");

        form.consultation_type = Some(ConsultationType::Free);
        let free = form.summary();
        assert_eq!(free.consultation, "Brief 15-Minute Call");
        assert_eq!(free.total_cost, "FREE");
        assert!(free.addons.is_empty());
        assert!(free.to_string().contains("Zoom Preference: No"));
    }

    #[test]
    fn next_steps_follow_consultation_type() {
        let mut form = IntakeForm::default();
        assert_eq!(form.next_steps().items.len(), 3);

        form.consultation_type = Some(ConsultationType::Paid);
        let steps = form.next_steps();
        assert!(steps.message.contains("paid consultation"));
        assert_eq!(steps.items.len(), 4);
    }

    #[test]
    fn unparseable_preferred_time_is_shown_verbatim() {
        assert_eq!(format_preferred(""), "Not selected");
        assert_eq!(format_preferred("next Tuesday"), "next Tuesday");
    }
}
