//! Static knowledge document used for keyword context retrieval.
//!
//! Retrieval is purely textual: every whitespace-separated, lowercased query
//! term that occurs in a page's title or text adds one to that page's score.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONTEXT_MATCHES: usize = 3;
const EXCERPT_CHARS: usize = 200;
const PAGE_TEXT_LIMIT: usize = 3000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgePage {
    #[serde(default)]
    pub url: String,
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeBase {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub generated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pages: Vec<KnowledgePage>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl KnowledgeBase {
    pub fn new(pages: Vec<KnowledgePage>) -> Self {
        Self {
            version: default_version(),
            generated: Some(Utc::now()),
            pages,
        }
    }

    /// Score every page against `query`, highest first. Zero scores are dropped
    /// and ties keep document order.
    pub fn rank(&self, query: &str) -> Vec<(&KnowledgePage, usize)> {
        let keywords: Vec<String> = query
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();
        if keywords.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(&KnowledgePage, usize)> = self
            .pages
            .iter()
            .map(|page| {
                let haystack = format!("{} {}", page.title, page.text).to_lowercase();
                let score = keywords
                    .iter()
                    .filter(|keyword| haystack.contains(keyword.as_str()))
                    .count();
                (page, score)
            })
            .filter(|(_, score)| *score > 0)
            .collect();

        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored
    }

    /// Context block for the synthetic system message, or `None` when nothing
    /// matches.
    pub fn relevant_context(&self, query: &str, limit: usize) -> Option<String> {
        let excerpts: Vec<String> = self
            .rank(query)
            .into_iter()
            .take(limit)
            .map(|(page, _)| {
                let excerpt: String = page.text.chars().take(EXCERPT_CHARS).collect();
                format!("{}: {}...", page.title, excerpt)
            })
            .collect();

        if excerpts.is_empty() {
            None
        } else {
            Some(excerpts.join("\n\n"))
        }
    }
}

lazy_static! {
    static ref TITLE: Regex = Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("title pattern");
    static ref MAIN: Regex = Regex::new(r"(?is)<main[^>]*>(.*?)</main>").expect("main pattern");
    static ref BODY: Regex = Regex::new(r"(?is)<body[^>]*>(.*)</body>").expect("body pattern");
    static ref DROPPED_BLOCKS: Vec<Regex> = ["script", "style", "noscript", "nav", "footer"]
        .iter()
        .map(|tag| Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}>")).expect("block pattern"))
        .collect();
    static ref TAG: Regex = Regex::new(r"(?s)<[^>]+>").expect("tag pattern");
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("whitespace pattern");
}

/// Reduce an HTML page to a knowledge entry. Returns `None` when no text
/// survives extraction.
pub fn extract_page(url: &str, html: &str) -> Option<KnowledgePage> {
    let title = TITLE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| collapse(&decode_entities(m.as_str())))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| url.to_string());

    let mut cleaned = html.to_string();
    for block in DROPPED_BLOCKS.iter() {
        cleaned = block.replace_all(&cleaned, " ").into_owned();
    }

    let region = MAIN
        .captures(&cleaned)
        .or_else(|| BODY.captures(&cleaned))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or(cleaned);

    let text = TAG.replace_all(&region, " ");
    let text = collapse(&decode_entities(&text));
    let text: String = text.chars().take(PAGE_TEXT_LIMIT).collect();

    if text.is_empty() {
        return None;
    }

    Some(KnowledgePage {
        url: url.to_string(),
        title,
        text,
    })
}

fn collapse(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(title: &str, text: &str) -> KnowledgePage {
        KnowledgePage {
            url: String::new(),
            title: title.to_string(),
            text: text.to_string(),
        }
    }

    fn sample() -> KnowledgeBase {
        KnowledgeBase::new(vec![
            page("Quiet Title", "Quiet title actions settle ownership disputes."),
            page("Boundary Disputes", "Fence and boundary line disputes between neighbors."),
            page("Contact", "Call our office in Fremont."),
            page("Landlord Tenant", "Eviction and lease disputes."),
        ])
    }

    #[test]
    fn ranks_by_keyword_hits() {
        let kb = sample();
        let ranked = kb.rank("Boundary fence disputes");
        assert_eq!(ranked[0].0.title, "Boundary Disputes");
        assert_eq!(ranked[0].1, 3);
        assert!(ranked.iter().all(|(p, _)| p.title != "Contact"));
    }

    #[test]
    fn context_takes_top_three() {
        let kb = sample();
        let context = kb.relevant_context("disputes", DEFAULT_CONTEXT_MATCHES).unwrap();
        assert_eq!(context.split("\n\n").count(), 3);
        assert!(context.starts_with("Quiet Title: "));
        assert!(context.ends_with("..."));
    }

    #[test]
    fn no_match_yields_none() {
        let kb = sample();
        assert!(kb.relevant_context("bankruptcy", 3).is_none());
        assert!(kb.relevant_context("   ", 3).is_none());
    }

    #[test]
    fn excerpt_is_capped() {
        let kb = KnowledgeBase::new(vec![page("Long", &"word ".repeat(100))]);
        let context = kb.relevant_context("word", 3).unwrap();
        assert_eq!(context.len(), "Long: ".len() + EXCERPT_CHARS + 3);
    }

    #[test]
    fn parses_document_without_generated_field() {
        let kb: KnowledgeBase =
            serde_json::from_str(r#"{"pages":[{"title":"A","text":"b"}]}"#).unwrap();
        assert_eq!(kb.version, "1.0");
        assert_eq!(kb.pages.len(), 1);
    }

    #[test]
    fn extract_page_drops_scripts_and_navigation() {
        let html = r#"<html><head><title> Services &amp; Fees </title>
            <style>.x{}</style></head>
            <body><nav><a>Home</a></nav>
            <main><h1>Real estate</h1><script>track()</script><p>We   handle
            quiet title.</p></main><footer>Copyright</footer></body></html>"#;

        let page = extract_page("https://example.com/services", html).unwrap();
        assert_eq!(page.title, "Services & Fees");
        assert_eq!(page.text, "Real estate We handle quiet title.");
    }

    #[test]
    fn extract_page_falls_back_to_url_title() {
        let page = extract_page("https://example.com", "<body><p>Hello</p></body>").unwrap();
        assert_eq!(page.title, "https://example.com");
        assert!(extract_page("https://example.com", "<body></body>").is_none());
    }
}
