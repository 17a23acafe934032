//! Policy-page fetching and paragraph extraction.
//!
//! The scraper is best-effort by contract: every failure mode (network,
//! blocked request, unparseable markup, empty page) surfaces as an empty
//! paragraph list, never as an error into the pipeline. Downstream stages
//! are empty-safe.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::time::Duration;

use crate::config::ScraperConfig;

const DESKTOP_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const MOBILE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) \
     AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";

/// URL path fragments that mark a likely policy page.
static POLICY_PATTERNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)terms|condition|privacy|policy|legal").expect("valid regex"));

/// Content-container class names worth extracting from directly.
static CONTENT_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)privacy|policy|terms|legal|content|article|main").expect("valid regex")
});

/// Markup whose text content is never policy prose. Stripped before
/// parsing since element text extraction would otherwise include it.
static NON_CONTENT_BLOCKS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)<script[^>]*>.*?</script>|<style[^>]*>.*?</style>|<noscript[^>]*>.*?</noscript>",
    )
    .expect("valid regex")
});

/// Supplies ordered raw paragraphs for a document source. Implementations
/// must return an empty sequence on any failure rather than erroring.
#[async_trait]
pub trait ParagraphSource: Send + Sync {
    /// Fetch and extract paragraph-like text blocks for `url`.
    async fn fetch(&self, url: &str) -> Vec<String>;
}

/// HTML scraper that locates a policy page and extracts its paragraphs.
pub struct PolicyScraper {
    client: Client,
    config: ScraperConfig,
}

impl PolicyScraper {
    pub fn new(config: ScraperConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    /// Fetch a page body, retrying once with a mobile User-Agent when the
    /// desktop one gets blocked.
    async fn fetch_html(&self, url: &str) -> Option<String> {
        for (attempt, ua) in [DESKTOP_UA, MOBILE_UA].iter().enumerate() {
            let response = match self
                .client
                .get(url)
                .header(reqwest::header::USER_AGENT, *ua)
                .header(
                    reqwest::header::ACCEPT,
                    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
                )
                .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!(url, error = %e, "fetch failed");
                    return None;
                }
            };

            let status = response.status();
            if status.as_u16() == 403 || status.as_u16() == 401 {
                tracing::warn!(url, %status, attempt, "access denied, site may block scrapers");
                continue;
            }
            if !status.is_success() {
                tracing::warn!(url, %status, "non-success status");
                return None;
            }
            return response.text().await.ok();
        }
        None
    }

    /// Find a likely Terms & Conditions or Privacy Policy link on a page.
    async fn find_policy_link(&self, base_url: &str) -> Option<String> {
        let base_url = normalize_url(base_url);
        let html = self.fetch_html(&base_url).await?;
        extract_policy_link(&html, &base_url)
    }

    /// Extract paragraph-like text blocks from one page.
    async fn extract_paragraphs_from(&self, url: &str) -> Vec<String> {
        tracing::debug!(url, "fetching policy page");
        match self.fetch_html(url).await {
            Some(html) => extract_paragraphs(&html, self.config.min_paragraph_chars),
            None => Vec::new(),
        }
    }
}

#[async_trait]
impl ParagraphSource for PolicyScraper {
    async fn fetch(&self, url: &str) -> Vec<String> {
        let direct_candidate = POLICY_PATTERNS.is_match(url);
        let target = normalize_url(url);

        // A URL that already looks like a policy page is scraped directly.
        if direct_candidate {
            let paragraphs = self.extract_paragraphs_from(&target).await;
            if paragraphs.len() > 2 {
                tracing::info!(url = %target, count = paragraphs.len(), "scraped direct policy link");
                return paragraphs;
            }
            tracing::debug!(url = %target, "direct link yielded little, searching sub-links");
        }

        // Otherwise discover a policy link from the base page.
        if let Some(link) = self.find_policy_link(&target).await {
            tracing::info!(link, "found policy link");
            let paragraphs = self.extract_paragraphs_from(&link).await;
            if !paragraphs.is_empty() {
                return paragraphs;
            }
        }

        // Last resort: the base URL itself may hold the content.
        if !direct_candidate {
            let paragraphs = self.extract_paragraphs_from(&target).await;
            if !paragraphs.is_empty() {
                tracing::info!(url = %target, "scraped content from base URL");
                return paragraphs;
            }
        }

        tracing::warn!(url, "no policy content found");
        Vec::new()
    }
}

fn normalize_url(url: &str) -> String {
    if url.starts_with("http") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// Scan anchors for the first policy-looking link. Relative hrefs are
/// resolved against the page URL.
fn extract_policy_link(html: &str, base_url: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let anchors = Selector::parse("a[href]").ok()?;

    for element in document.select(&anchors) {
        let href = element.value().attr("href")?;
        let absolute = resolve_href(base_url, href);
        if POLICY_PATTERNS.is_match(&absolute) {
            return Some(absolute);
        }
    }
    None
}

/// Minimal href resolution: absolute URLs pass through, everything else is
/// joined onto the origin or path of the base URL.
fn resolve_href(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    if let Some(rest) = href.strip_prefix("//") {
        return format!("https://{}", rest);
    }
    let trimmed_base = base_url.trim_end_matches('/');
    if href.starts_with('/') {
        // Join onto the origin
        let origin = trimmed_base
            .find("://")
            .and_then(|i| {
                trimmed_base[i + 3..]
                    .find('/')
                    .map(|j| &trimmed_base[..i + 3 + j])
            })
            .unwrap_or(trimmed_base);
        format!("{}{}", origin, href)
    } else {
        format!("{}/{}", trimmed_base, href)
    }
}

/// Extract paragraph-like blocks from markup, trying progressively looser
/// strategies until something sticks. Order follows document order; exact
/// duplicates are removed.
fn extract_paragraphs(html: &str, min_chars: usize) -> Vec<String> {
    let html = NON_CONTENT_BLOCKS.replace_all(html, " ");
    let document = Html::parse_document(&html);
    let mut paragraphs: Vec<String> = Vec::new();

    // Strategy 1: dedicated policy/content containers
    if let Ok(divs) = Selector::parse("div[class]") {
        for div in document.select(&divs) {
            let class = div.value().attr("class").unwrap_or_default();
            if !CONTENT_CLASS.is_match(class) {
                continue;
            }
            for text in div.text() {
                let text = text.trim();
                if text.len() > min_chars {
                    paragraphs.push(text.to_string());
                }
            }
        }
    }

    // Strategy 2: standard <p> tags when containers yielded little
    if paragraphs.len() < 5 {
        if let Ok(p) = Selector::parse("p") {
            for element in document.select(&p) {
                let text = element
                    .text()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
                if text.len() > min_chars {
                    paragraphs.push(text);
                }
            }
        }
    }

    // Strategy 3: generic block elements
    if paragraphs.is_empty() {
        for tag in ["div", "section", "article", "li"] {
            if let Ok(selector) = Selector::parse(tag) {
                for element in document.select(&selector) {
                    let text = element
                        .text()
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .collect::<Vec<_>>()
                        .join(" ");
                    if text.split_whitespace().count() > 15 {
                        paragraphs.push(text);
                    }
                }
            }
        }
    }

    // Strategy 4: all visible text split on blank runs
    if paragraphs.is_empty() {
        tracing::debug!("parsing fallback: extracting all visible text");
        let visible = document
            .root_element()
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        paragraphs = visible
            .split('\n')
            .map(str::trim)
            .filter(|p| p.len() > 40)
            .map(str::to_string)
            .collect();
    }

    dedupe_preserving_order(paragraphs)
}

fn dedupe_preserving_order(paragraphs: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    paragraphs
        .into_iter()
        .filter(|p| seen.insert(p.clone()))
        .collect()
}
