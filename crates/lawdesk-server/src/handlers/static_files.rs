//! Static site pages.
//!
//! Resolution order for a request path:
//! 1. the literal file under `public/`, then under the site root (a
//!    directory resolves to its `index.html`)
//! 2. `/` -> `index.html`
//! 3. `/{page}` -> `{page}.html`
//! 4. `/{dir}/{page}` -> `{dir}/{page}.html`
//!
//! Anything else, and any path with a segment starting with `.` (dotfiles,
//! `..`), is a 404.

use actix_web::http::header;
use actix_web::{web, HttpResponse};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{AppError, Result};
use crate::state::AppState;

pub const NOT_FOUND_BODY: &str = "Page not found";

pub async fn handler(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let Some(file) = resolve(&state.config.public_dir, &path).await else {
        return Ok(not_found_response());
    };

    match fs::read(&file).await {
        Ok(bytes) => Ok(HttpResponse::Ok()
            .insert_header((header::CONTENT_TYPE, content_type(&file)))
            .body(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(not_found_response()),
        Err(e) => Err(AppError::InternalError(anyhow::anyhow!(
            "Failed to read {}: {}",
            file.display(),
            e
        ))),
    }
}

pub async fn not_found() -> HttpResponse {
    not_found_response()
}

fn not_found_response() -> HttpResponse {
    HttpResponse::NotFound()
        .content_type("text/plain; charset=utf-8")
        .body(NOT_FOUND_BODY)
}

/// Map a request path to a file under `root`, or `None`.
pub async fn resolve(root: &Path, request_path: &str) -> Option<PathBuf> {
    let segments: Vec<&str> = request_path.split('/').filter(|s| !s.is_empty()).collect();
    if segments
        .iter()
        .any(|s| s.starts_with('.') || s.contains('\\'))
    {
        return None;
    }

    let relative: PathBuf = segments.iter().collect();

    for base in [root.join("public"), root.to_path_buf()] {
        let candidate = base.join(&relative);
        if is_file(&candidate).await {
            return Some(candidate);
        }
        let index = candidate.join("index.html");
        if is_file(&index).await {
            return Some(index);
        }
    }

    let page = match segments.as_slice() {
        [page] if !page.starts_with("api") => root.join(format!("{page}.html")),
        [dir, page] => root.join(dir).join(format!("{page}.html")),
        _ => return None,
    };

    if is_file(&page).await {
        Some(page)
    } else {
        None
    }
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "application/javascript; charset=utf-8",
        "json" => "application/json",
        "webmanifest" => "application/manifest+json",
        "txt" | "md" => "text/plain; charset=utf-8",
        "xml" => "application/xml",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}
