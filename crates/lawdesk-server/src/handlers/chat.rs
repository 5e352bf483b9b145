use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use bytes::Bytes;
use futures_util::StreamExt;
use lawdesk_core::{ToolDefinition, WireMessage};
use lawdesk_llm::{build_chat_request, CompletionOptions, RelayFrame};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::middleware::extract_trace_id;
use crate::prompt::load_system_prompt;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<WireMessage>,
    #[serde(default)]
    pub tools: Option<Vec<ToolDefinition>>,
}

/// `POST /api/chat`: relay one streaming completion as SSE.
///
/// The key check happens before any header is written. Once the event
/// stream has started, upstream failures become a single `{"error": ...}`
/// event and the stream ends.
pub async fn handler(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<ChatRequest>,
) -> Result<HttpResponse> {
    let trace_id = extract_trace_id(&req).unwrap_or_else(|| "-".to_string());
    let upstream = state.upstream.clone().ok_or(AppError::ChatNotConfigured)?;
    let ChatRequest { messages, tools } = body.into_inner();

    let system_prompt = load_system_prompt(&state.config.prompt_dir, &state.config.firm).await;
    let outbound = build_chat_request(
        upstream.model(),
        &system_prompt,
        &messages,
        tools,
        CompletionOptions::default(),
    );
    log::info!(
        "[{}] Relaying {} message(s) to {}",
        trace_id,
        messages.len(),
        upstream.model()
    );

    let stream = async_stream::stream! {
        let mut frames = match upstream.stream_chat(&outbound).await {
            Ok(frames) => frames,
            Err(e) => {
                log::error!("[{}] Chat error: {}", trace_id, e);
                yield Ok::<Bytes, actix_web::Error>(RelayFrame::error(e.to_string()).to_sse_bytes());
                return;
            }
        };

        let mut relayed = 0usize;
        while let Some(frame) = frames.next().await {
            match frame {
                Ok(frame) => {
                    relayed += 1;
                    yield Ok(frame.to_sse_bytes());
                }
                Err(e) => {
                    log::error!("[{}] Chat stream error: {}", trace_id, e);
                    yield Ok(RelayFrame::error(e.to_string()).to_sse_bytes());
                    return;
                }
            }
        }
        log::debug!("[{}] Relay finished after {} frame(s)", trace_id, relayed);
    };

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/event-stream"))
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .insert_header((header::CONNECTION, "keep-alive"))
        .insert_header(("X-Accel-Buffering", "no"))
        .streaming(stream))
}
