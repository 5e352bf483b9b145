use actix_web::{web, HttpResponse};
use lawdesk_core::{IntakeWebhookRequest, WebhookAck};

use crate::state::AppState;

/// `POST /api/intake-webhook`: forward to the outbound webhook when one is
/// configured. The submitter always gets the same acknowledgement.
pub async fn handler(
    state: web::Data<AppState>,
    body: web::Json<IntakeWebhookRequest>,
) -> HttpResponse {
    let request = body.into_inner();
    log::info!(
        "Intake received ({} transcript message(s))",
        request.transcript.len()
    );

    if state.webhook.is_configured() && !state.webhook.forward(&request).await {
        log::warn!("Intake was acknowledged but not delivered");
    }

    HttpResponse::Ok().json(WebhookAck::received())
}
