//! Builds the static knowledge document from the firm's public pages.

use std::path::Path;
use std::time::Duration;

use lawdesk_core::{extract_page, KnowledgeBase, KnowledgePage};
use reqwest::Client;

use crate::error::Result;

const FETCH_TIMEOUT: Duration = Duration::from_secs(20);

pub const DEFAULT_SITE: &str = "https://pritsinghlaw.com";

const DEFAULT_PAGES: [&str; 11] = [
    "",
    "/services",
    "/about",
    "/services/real-estate-litigation",
    "/services/Landlord-Tenant-Matter",
    "/services/Premises-Liability",
    "/services/Boundary-Disputes",
    "/services/Quiet-Title",
    "/services/Contract-Drafting-Review",
    "/services/Purchase-Agreements",
    "/services/Adverse-Possession",
];

/// The pages crawled when no URL list is given.
pub fn default_urls() -> Vec<String> {
    DEFAULT_PAGES
        .iter()
        .map(|path| format!("{DEFAULT_SITE}{path}"))
        .collect()
}

async fn fetch_page(client: &Client, url: &str) -> Result<Option<KnowledgePage>> {
    let html = client
        .get(url)
        .timeout(FETCH_TIMEOUT)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(extract_page(url, &html))
}

/// Fetch and extract every URL in order. Pages that fail to load or carry
/// no text are skipped with a warning.
pub async fn build_knowledge(client: &Client, urls: &[String]) -> KnowledgeBase {
    let mut pages = Vec::with_capacity(urls.len());

    for url in urls {
        match fetch_page(client, url).await {
            Ok(Some(page)) => {
                log::info!("Extracted {} ({} chars)", url, page.text.len());
                pages.push(page);
            }
            Ok(None) => log::warn!("No text extracted from {}", url),
            Err(e) => log::warn!("Skipping {}: {}", url, e),
        }
    }

    KnowledgeBase::new(pages)
}

/// Write the document as pretty JSON, creating parent directories.
pub async fn write_knowledge(knowledge: &KnowledgeBase, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let json = serde_json::to_string_pretty(knowledge)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn default_urls_start_at_home() {
        let urls = default_urls();
        assert_eq!(urls[0], "https://pritsinghlaw.com");
        assert!(urls.contains(&"https://pritsinghlaw.com/services/Quiet-Title".to_string()));
        assert_eq!(urls.len(), 11);
    }

    #[tokio::test]
    async fn failed_pages_are_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/services"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<html><head><title>Services</title><script>x()</script></head>\
                 <body><nav>Menu</nav><p>Quiet title and boundary work.</p></body></html>",
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let urls = vec![
            format!("{}/services", server.uri()),
            format!("{}/missing", server.uri()),
        ];
        let knowledge = build_knowledge(&Client::new(), &urls).await;

        assert_eq!(knowledge.version, "1.0");
        assert_eq!(knowledge.pages.len(), 1);
        assert_eq!(knowledge.pages[0].title, "Services");
        assert_eq!(knowledge.pages[0].text, "Quiet title and boundary work.");
    }

    #[tokio::test]
    async fn writes_json_with_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("public/data/knowledge.json");
        let knowledge = KnowledgeBase::new(vec![KnowledgePage {
            url: "https://pritsinghlaw.com/about".to_string(),
            title: "About".to_string(),
            text: "Fremont office.".to_string(),
        }]);

        write_knowledge(&knowledge, &path).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let parsed: KnowledgeBase = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.pages, knowledge.pages);
    }
}
