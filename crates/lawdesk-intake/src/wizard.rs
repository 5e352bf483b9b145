//! Intake wizard
//!
//! Holds the form, the current step and the step graph. Every change is
//! autosaved to the persistent store under [`INTAKE_FORM_KEY`] so an
//! interrupted intake resumes where it stopped.

use std::sync::Arc;

use lawdesk_core::{load_json, save_json, KeyValueStore, INTAKE_FORM_KEY};

use crate::error::{Result, WizardError};
use crate::form::{
    ConsultationSummary, ConsultationType, ContactInfo, IntakeForm, NextSteps,
    SchedulingPreference, OTHER_REFERRAL, SERVICE_CATALOGUE,
};
use crate::graph::{StepGraph, Transition};
use crate::steps::WizardStep;
use crate::submit::{IntakeSubmitter, SubmissionPayload};
use crate::validation::{validate_step, ValidationErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepTransition {
    pub from: WizardStep,
    pub to: WizardStep,
    pub transition: Transition,
}

/// What the success screen shows.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionOutcome {
    pub summary: ConsultationSummary,
    pub next_steps: NextSteps,
}

pub struct IntakeWizard {
    form: IntakeForm,
    current: WizardStep,
    graph: StepGraph,
    store: Arc<dyn KeyValueStore>,
}

impl IntakeWizard {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            form: IntakeForm::default(),
            current: WizardStep::ContactInfo,
            graph: StepGraph::standard(),
            store,
        }
    }

    pub fn with_graph(mut self, graph: StepGraph) -> Self {
        self.graph = graph;
        self
    }

    /// Resume from the saved form, or start fresh if nothing usable is saved.
    pub async fn restore(store: Arc<dyn KeyValueStore>) -> Self {
        let mut wizard = Self::new(store);
        match load_json::<IntakeForm>(wizard.store.as_ref(), INTAKE_FORM_KEY).await {
            Ok(Some(form)) => {
                wizard.current = WizardStep::from_number(form.step)
                    .filter(|s| !s.is_terminal())
                    .unwrap_or(WizardStep::ContactInfo);
                wizard.form = form;
                wizard.form.step = wizard.current.number();
                log::info!("Restored intake form at step {}", wizard.current);
            }
            Ok(None) => {}
            Err(e) => log::warn!("Failed restoring saved intake form: {}", e),
        }
        wizard
    }

    pub fn step(&self) -> WizardStep {
        self.current
    }

    pub fn form(&self) -> &IntakeForm {
        &self.form
    }

    pub fn progress_percent(&self) -> u8 {
        self.current.progress_percent()
    }

    pub fn validate_current(&self) -> std::result::Result<(), ValidationErrors> {
        validate_step(self.current, &self.form)
    }

    pub async fn save(&self) -> Result<()> {
        save_json(self.store.as_ref(), INTAKE_FORM_KEY, &self.form).await?;
        Ok(())
    }

    // ===== Field updates =====

    pub async fn set_contact(&mut self, contact: ContactInfo) -> Result<()> {
        self.form.contact_info = contact;
        self.save().await
    }

    /// `details` is kept only for the "other" referral source.
    pub async fn select_referral(&mut self, source: &str, details: Option<&str>) -> Result<()> {
        self.form.referral_source = source.to_string();
        self.form.other_referral_details = if source == OTHER_REFERRAL {
            details.unwrap_or_default().to_string()
        } else {
            String::new()
        };
        self.save().await
    }

    pub async fn select_service(&mut self, service: &str) -> Result<()> {
        let Some(known) = SERVICE_CATALOGUE.iter().find(|s| s.eq_ignore_ascii_case(service)) else {
            return Err(WizardError::UnknownService(service.to_string()));
        };
        self.form.service_type = known.to_string();
        self.save().await
    }

    pub async fn set_case_details(&mut self, details: &str) -> Result<()> {
        self.form.case_details = details.to_string();
        self.save().await
    }

    pub async fn select_consultation(&mut self, kind: ConsultationType, price: u32) -> Result<()> {
        self.form.consultation_type = Some(kind);
        self.form.consultation_price = match kind {
            ConsultationType::Free => 0,
            ConsultationType::Paid => price,
        };
        self.form.recalculate_total();
        self.save().await
    }

    pub async fn set_document_review(&mut self, enabled: bool) -> Result<()> {
        self.form.addons.document_review = enabled;
        self.form.recalculate_total();
        self.save().await
    }

    pub async fn set_transcript(&mut self, enabled: bool) -> Result<()> {
        self.form.addons.consultation_transcript = enabled;
        self.save().await
    }

    pub async fn set_scheduling(&mut self, scheduling: SchedulingPreference) -> Result<()> {
        self.form.scheduling = scheduling;
        self.save().await
    }

    pub async fn set_disclaimer(&mut self, accepted: bool) -> Result<()> {
        self.form.disclaimer_accepted = accepted;
        self.save().await
    }

    // ===== Navigation =====

    /// Validate the current step, then follow its `next` edge.
    pub async fn next(&mut self) -> Result<StepTransition> {
        self.validate_current()?;
        self.follow(Transition::Next).await
    }

    pub async fn prev(&mut self) -> Result<StepTransition> {
        self.follow(Transition::Prev).await
    }

    /// Contact step: post the contact details to the form service, then
    /// advance. A failed post is logged and does not block the wizard.
    pub async fn submit_contact(
        &mut self,
        submitter: &dyn IntakeSubmitter,
    ) -> Result<StepTransition> {
        self.expect_step(WizardStep::ContactInfo, Transition::Next)?;
        self.validate_current()?;

        if let Err(e) = submitter.submit_contact(&self.form.contact_info).await {
            log::warn!("Contact submission failed: {}", e);
        }
        self.follow(Transition::Next).await
    }

    /// Final submission from the disclaimer step. On success the saved form
    /// is cleared; on failure the wizard stays where it is.
    pub async fn submit(&mut self, submitter: &dyn IntakeSubmitter) -> Result<SubmissionOutcome> {
        self.expect_step(WizardStep::Disclaimer, Transition::Submit)?;
        self.validate_current()?;
        let target = self.target(Transition::Submit)?;

        let outcome = SubmissionOutcome {
            summary: self.form.summary(),
            next_steps: self.form.next_steps(),
        };

        submitter
            .submit_final(&SubmissionPayload::now(&self.form))
            .await
            .map_err(|e| {
                log::error!("Intake submission failed: {}", e);
                e
            })?;

        self.move_to(target);
        self.store.remove(INTAKE_FORM_KEY).await?;
        log::info!("Intake form submitted");
        Ok(outcome)
    }

    fn expect_step(&self, step: WizardStep, transition: Transition) -> Result<()> {
        if self.current == step {
            Ok(())
        } else {
            Err(WizardError::InvalidTransition {
                from: self.current,
                transition,
            })
        }
    }

    fn target(&self, transition: Transition) -> Result<WizardStep> {
        self.graph
            .resolve(self.current, transition, &self.form)
            .ok_or(WizardError::InvalidTransition {
                from: self.current,
                transition,
            })
    }

    async fn follow(&mut self, transition: Transition) -> Result<StepTransition> {
        let to = self.target(transition)?;
        let from = self.move_to(to);
        self.save().await?;

        log::debug!("Intake wizard {} -> {} ({})", from, to, transition);
        Ok(StepTransition {
            from,
            to,
            transition,
        })
    }

    fn move_to(&mut self, to: WizardStep) -> WizardStep {
        let from = self.current;
        self.current = to;
        self.form.step = to.number();
        from
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lawdesk_core::MemoryStore;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSubmitter {
        contacts: Mutex<Vec<ContactInfo>>,
        payloads: Mutex<Vec<serde_json::Value>>,
        fail_contact: bool,
        fail_final: bool,
    }

    #[async_trait]
    impl IntakeSubmitter for RecordingSubmitter {
        async fn submit_contact(&self, contact: &ContactInfo) -> Result<()> {
            self.contacts.lock().unwrap().push(contact.clone());
            if self.fail_contact {
                return Err(WizardError::Rejected {
                    status: 503,
                    body: String::new(),
                });
            }
            Ok(())
        }

        async fn submit_final(&self, payload: &SubmissionPayload<'_>) -> Result<()> {
            if self.fail_final {
                return Err(WizardError::Rejected {
                    status: 500,
                    body: "down".to_string(),
                });
            }
            self.payloads
                .lock()
                .unwrap()
                .push(serde_json::to_value(payload).unwrap());
            Ok(())
        }
    }

    fn contact() -> ContactInfo {
        ContactInfo {
            full_name: "Ana Ruiz".to_string(),
            email: "ana@example.com".to_string(),
            phone: "510-555-0100".to_string(),
            location: "Oakland".to_string(),
        }
    }

    async fn wizard_at_consultation(store: Arc<dyn KeyValueStore>) -> IntakeWizard {
        let submitter = RecordingSubmitter::default();
        let mut wizard = IntakeWizard::new(store);
        wizard.set_contact(contact()).await.unwrap();
        wizard.submit_contact(&submitter).await.unwrap();
        wizard.select_referral("google", None).await.unwrap();
        wizard.next().await.unwrap();
        wizard.select_service("Boundary Disputes").await.unwrap();
        wizard.next().await.unwrap();
        wizard.set_case_details("Fence moved two feet").await.unwrap();
        wizard.next().await.unwrap();
        assert_eq!(wizard.step(), WizardStep::ConsultationType);
        wizard
    }

    #[tokio::test]
    async fn next_is_blocked_by_validation() {
        let mut wizard = IntakeWizard::new(Arc::new(MemoryStore::new()));

        let err = wizard.next().await.unwrap_err();
        match err {
            WizardError::Validation(errors) => assert_eq!(errors.errors.len(), 4),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(wizard.step(), WizardStep::ContactInfo);
    }

    #[tokio::test]
    async fn free_path_skips_add_ons_and_comes_back() {
        let mut wizard = wizard_at_consultation(Arc::new(MemoryStore::new())).await;

        wizard.select_consultation(ConsultationType::Free, 250).await.unwrap();
        assert_eq!(wizard.form().consultation_price, 0);
        let moved = wizard.next().await.unwrap();
        assert_eq!(moved.to, WizardStep::Scheduling);

        let back = wizard.prev().await.unwrap();
        assert_eq!(back.to, WizardStep::ConsultationType);
    }

    #[tokio::test]
    async fn paid_path_totals_add_ons() {
        let mut wizard = wizard_at_consultation(Arc::new(MemoryStore::new())).await;

        wizard.select_consultation(ConsultationType::Paid, 250).await.unwrap();
        assert_eq!(wizard.next().await.unwrap().to, WizardStep::AddOns);

        wizard.set_document_review(true).await.unwrap();
        assert_eq!(wizard.form().total_amount, 400);
        wizard.set_document_review(false).await.unwrap();
        assert_eq!(wizard.form().total_amount, 250);
    }

    #[tokio::test]
    async fn contact_submission_failure_does_not_block() {
        let submitter = RecordingSubmitter {
            fail_contact: true,
            ..RecordingSubmitter::default()
        };
        let mut wizard = IntakeWizard::new(Arc::new(MemoryStore::new()));
        wizard.set_contact(contact()).await.unwrap();

        let moved = wizard.submit_contact(&submitter).await.unwrap();
        assert_eq!(moved.to, WizardStep::ReferralSource);
        assert_eq!(submitter.contacts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_service_is_rejected() {
        let mut wizard = IntakeWizard::new(Arc::new(MemoryStore::new()));
        assert!(matches!(
            wizard.select_service("Tax Law").await,
            Err(WizardError::UnknownService(_))
        ));
        wizard.select_service("quiet title actions").await.unwrap();
        assert_eq!(wizard.form().service_type, "Quiet Title Actions");
    }

    #[tokio::test]
    async fn other_referral_keeps_details() {
        let mut wizard = IntakeWizard::new(Arc::new(MemoryStore::new()));
        wizard.select_referral("other", Some("Neighbor")).await.unwrap();
        assert_eq!(wizard.form().other_referral_details, "Neighbor");
        wizard.select_referral("yelp", Some("ignored")).await.unwrap();
        assert_eq!(wizard.form().other_referral_details, "");
    }

    #[tokio::test]
    async fn restore_resumes_at_saved_step() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let wizard = wizard_at_consultation(store.clone()).await;
        drop(wizard);

        let restored = IntakeWizard::restore(store).await;
        assert_eq!(restored.step(), WizardStep::ConsultationType);
        assert_eq!(restored.form().case_details, "Fence moved two feet");
    }

    #[tokio::test]
    async fn restore_ignores_corrupt_state() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store
            .set(INTAKE_FORM_KEY, "{not json".to_string())
            .await
            .unwrap();

        let restored = IntakeWizard::restore(store).await;
        assert_eq!(restored.step(), WizardStep::ContactInfo);
        assert_eq!(restored.form(), &IntakeForm::default());
    }

    #[tokio::test]
    async fn submit_requires_disclaimer_step() {
        let submitter = RecordingSubmitter::default();
        let mut wizard = IntakeWizard::new(Arc::new(MemoryStore::new()));
        assert!(matches!(
            wizard.submit(&submitter).await,
            Err(WizardError::InvalidTransition {
                from: WizardStep::ContactInfo,
                transition: Transition::Submit
            })
        ));
    }

    async fn wizard_at_disclaimer(store: Arc<dyn KeyValueStore>) -> IntakeWizard {
        let mut wizard = wizard_at_consultation(store).await;
        wizard.select_consultation(ConsultationType::Free, 0).await.unwrap();
        wizard.next().await.unwrap();
        wizard
            .set_scheduling(SchedulingPreference {
                preferred_date_time: "2026-11-02T09:30".to_string(),
                zoom_preference: true,
                ..SchedulingPreference::default()
            })
            .await
            .unwrap();
        wizard.next().await.unwrap();
        assert_eq!(wizard.step(), WizardStep::Disclaimer);
        wizard
    }

    #[tokio::test]
    async fn successful_submit_clears_saved_form() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let submitter = RecordingSubmitter::default();
        let mut wizard = wizard_at_disclaimer(store.clone()).await;

        assert!(wizard.submit(&submitter).await.is_err());
        wizard.set_disclaimer(true).await.unwrap();

        let outcome = wizard.submit(&submitter).await.unwrap();
        assert_eq!(outcome.summary.total_cost, "FREE");
        assert!(outcome.next_steps.message.contains("free consultation"));
        assert_eq!(wizard.step(), WizardStep::Success);
        assert_eq!(store.get(INTAKE_FORM_KEY).await.unwrap(), None);

        let payloads = submitter.payloads.lock().unwrap();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0]["contactInfo"]["email"], "ana@example.com");
        assert!(payloads[0]["submittedAt"].is_string());
    }

    #[tokio::test]
    async fn failed_submit_keeps_form_and_step() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let submitter = RecordingSubmitter {
            fail_final: true,
            ..RecordingSubmitter::default()
        };
        let mut wizard = wizard_at_disclaimer(store.clone()).await;
        wizard.set_disclaimer(true).await.unwrap();

        assert!(matches!(
            wizard.submit(&submitter).await,
            Err(WizardError::Rejected { status: 500, .. })
        ));
        assert_eq!(wizard.step(), WizardStep::Disclaimer);
        assert!(store.get(INTAKE_FORM_KEY).await.unwrap().is_some());
    }
}
