pub mod tracing_middleware;

pub use tracing_middleware::{extract_trace_id, TraceId, TracingMiddleware};
