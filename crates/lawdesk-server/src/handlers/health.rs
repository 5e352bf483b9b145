use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::state::AppState;

pub async fn handler(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "chat": state.upstream.is_some(),
        "scheduling": state.calendly.is_configured(),
        "webhook": state.webhook.is_configured(),
    }))
}
