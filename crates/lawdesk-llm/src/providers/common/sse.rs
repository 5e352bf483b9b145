//! Shared SSE -> typed stream adapter.

use eventsource_stream::Eventsource;
use futures::Stream;
use futures_util::{stream, StreamExt};
use reqwest::Response;
use std::pin::Pin;

use crate::provider::{LLMError, Result};

pub type SseStream<T> = Pin<Box<dyn Stream<Item = Result<T>> + Send>>;

fn to_stream_error(err: LLMError) -> LLMError {
    match err {
        LLMError::Stream(msg) => LLMError::Stream(msg),
        other => LLMError::Stream(other.to_string()),
    }
}

/// Convert an SSE HTTP [`Response`] into a stream of handler outputs.
///
/// `handler` is called once per `data:` line (an event carrying several data
/// lines is split back into lines) and can either:
/// - return `Ok(Some(item))` to emit an item
/// - return `Ok(None)` to skip the line
/// - return `Err(_)` to emit a stream error (mapped to `LLMError::Stream`)
pub fn stream_from_sse<T, H>(response: Response, mut handler: H) -> SseStream<T>
where
    T: Send + 'static,
    H: FnMut(&str) -> Result<Option<T>> + Send + 'static,
{
    let items = response.bytes_stream().eventsource().flat_map(move |event| {
        let batch: Vec<Result<T>> = match event {
            Ok(event) => event
                .data
                .split('\n')
                .filter_map(|line| match handler(line) {
                    Ok(Some(item)) => Some(Ok(item)),
                    Ok(None) => None,
                    Err(err) => Some(Err(to_stream_error(err))),
                })
                .collect(),
            Err(e) => vec![Err(LLMError::Stream(e.to_string()))],
        };
        stream::iter(batch)
    });

    Box::pin(items)
}
