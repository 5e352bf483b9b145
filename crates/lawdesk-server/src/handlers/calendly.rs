use actix_web::{web, HttpResponse};
use lawdesk_core::{SlotsResponse, UnavailableReason};
use serde_json::json;

use crate::services::BookingRequest;
use crate::state::AppState;

/// `GET /api/calendly-slots`: consultation event metadata and booking links,
/// or a phone-number fallback. Always answers 200.
pub async fn slots(state: web::Data<AppState>) -> HttpResponse {
    let firm = &state.config.firm;

    if !state.calendly.is_configured() {
        return HttpResponse::Ok().json(SlotsResponse::unavailable(
            UnavailableReason::NotConfigured,
            firm,
        ));
    }

    let response = match state.calendly.event_summaries().await {
        Ok(events) => {
            log::debug!("Calendly returned {} active event type(s)", events.len());
            SlotsResponse::from_events(&events, firm)
        }
        Err(e) => {
            log::error!("Calendly API error: {}", e);
            SlotsResponse::unavailable(UnavailableReason::UpstreamError, firm)
        }
    };

    HttpResponse::Ok().json(response)
}

/// `POST /api/calendly-booking`: create a scheduled event for an invitee.
pub async fn booking(
    state: web::Data<AppState>,
    body: web::Json<BookingRequest>,
) -> HttpResponse {
    let phone = &state.config.firm.phone;

    if !state.calendly.is_configured() {
        return HttpResponse::BadRequest().json(json!({
            "success": false,
            "message": format!("Booking system not configured. Please call {phone}"),
        }));
    }

    match state.calendly.create_booking(&body).await {
        Ok(confirmation) => {
            log::info!("Calendly booking created: {}", confirmation.event_uri);
            HttpResponse::Ok().json(json!({
                "success": true,
                "message": "Consultation booked successfully!",
                "eventUri": confirmation.event_uri,
                "joinUrl": confirmation.join_url,
            }))
        }
        Err(e) => {
            log::error!("Calendly booking error: {}", e);
            HttpResponse::InternalServerError().json(json!({
                "success": false,
                "message": format!("Unable to complete booking. Please call {phone}"),
            }))
        }
    }
}
