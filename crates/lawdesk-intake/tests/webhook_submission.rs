use std::sync::Arc;

use lawdesk_core::{FileStore, KeyValueStore, INTAKE_FORM_KEY};
use lawdesk_intake::{
    ConsultationType, ContactInfo, IntakeWizard, SchedulingPreference, WebhookSubmitter,
    WizardError, WizardStep,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn contact() -> ContactInfo {
    ContactInfo {
        full_name: "Ana Ruiz".to_string(),
        email: "ana@example.com".to_string(),
        phone: "510-555-0100".to_string(),
        location: "Oakland".to_string(),
    }
}

async fn walk_to_disclaimer(wizard: &mut IntakeWizard, submitter: &WebhookSubmitter) {
    wizard.set_contact(contact()).await.unwrap();
    wizard.submit_contact(submitter).await.unwrap();
    wizard.select_referral("other", Some("Neighbor")).await.unwrap();
    wizard.next().await.unwrap();
    wizard.select_service("Quiet Title Actions").await.unwrap();
    wizard.next().await.unwrap();
    wizard.set_case_details("Title cloud from an old lien").await.unwrap();
    wizard.next().await.unwrap();
    wizard
        .select_consultation(ConsultationType::Paid, 250)
        .await
        .unwrap();
    wizard.next().await.unwrap();
    wizard.set_document_review(true).await.unwrap();
    wizard.next().await.unwrap();
    wizard
        .set_scheduling(SchedulingPreference {
            preferred_date_time: "2026-11-02T09:30".to_string(),
            ..SchedulingPreference::default()
        })
        .await
        .unwrap();
    wizard.next().await.unwrap();
    wizard.set_disclaimer(true).await.unwrap();
}

#[tokio::test]
async fn paid_intake_posts_contact_and_final_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/contact"))
        .and(header("accept", "application/json"))
        .and(body_string_contains("fullName=Ana+Ruiz"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/intake"))
        .and(body_partial_json(json!({
            "step": 8,
            "referralSource": "other",
            "otherReferralDetails": "Neighbor",
            "serviceType": "Quiet Title Actions",
            "consultationType": "paid",
            "consultationPrice": 250,
            "addons": { "documentReview": true, "consultationTranscript": true },
            "totalAmount": 400,
            "disclaimerAccepted": true
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(dir.path()));
    let submitter = WebhookSubmitter::new(reqwest::Client::new(), format!("{}/intake", server.uri()))
        .with_contact_endpoint(format!("{}/contact", server.uri()));

    let mut wizard = IntakeWizard::restore(store.clone()).await;
    walk_to_disclaimer(&mut wizard, &submitter).await;
    assert!(store.get(INTAKE_FORM_KEY).await.unwrap().is_some());

    let outcome = wizard.submit(&submitter).await.unwrap();

    assert_eq!(wizard.step(), WizardStep::Success);
    assert_eq!(outcome.summary.total_cost, "$400");
    assert_eq!(outcome.next_steps.items.len(), 4);
    assert_eq!(store.get(INTAKE_FORM_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn rejected_final_submission_keeps_progress_on_disk() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/intake"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(dir.path()));
    let submitter = WebhookSubmitter::new(reqwest::Client::new(), format!("{}/intake", server.uri()));

    let mut wizard = IntakeWizard::new(store.clone());
    walk_to_disclaimer(&mut wizard, &submitter).await;

    match wizard.submit(&submitter).await {
        Err(WizardError::Rejected { status, body }) => {
            assert_eq!(status, 502);
            assert_eq!(body, "bad gateway");
        }
        other => panic!("expected rejection, got {other:?}"),
    }

    let resumed = IntakeWizard::restore(store).await;
    assert_eq!(resumed.step(), WizardStep::Disclaimer);
    assert_eq!(resumed.form().total_amount, 400);
}
