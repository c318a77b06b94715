// src/sources/discovery.rs
//! Finds the newest published report number on the landing page.

use regex::Regex;
use scraper::{Html, Selector};

use crate::poll::{FetchError, Fetcher};

pub const DEFAULT_HREF_PATTERN: &str = "/hodo/saishin/corona";
/// Four-digit token right before the page extension, e.g. `corona1234.html`.
pub const DEFAULT_TOKEN_PATTERN: &str = r"(\d{4})\.html?$";

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("no links matching `{pattern}` on the landing page")]
    NoMatch { pattern: String },
    #[error("landing page returned HTTP {status}")]
    Status { status: u16 },
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("invalid token pattern: {0}")]
    Pattern(#[from] regex::Error),
}

#[derive(Debug, Clone)]
pub struct LinkRule {
    pub href_contains: String,
    pub token: Regex,
}

impl LinkRule {
    pub fn new(href_contains: impl Into<String>, token_pattern: &str) -> Result<Self, DiscoveryError> {
        Ok(Self {
            href_contains: href_contains.into(),
            token: Regex::new(token_pattern)?,
        })
    }

    fn report_number(&self, href: &str) -> Option<u32> {
        if !href.contains(&self.href_contains) {
            return None;
        }
        self.token
            .captures(href)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }
}

impl Default for LinkRule {
    fn default() -> Self {
        Self {
            href_contains: DEFAULT_HREF_PATTERN.to_string(),
            token: Regex::new(DEFAULT_TOKEN_PATTERN).expect("static token pattern"),
        }
    }
}

/// Highest report number among all matching `<a href>` links.
pub fn latest_report_number(html: &str, rule: &LinkRule) -> Result<u32, DiscoveryError> {
    let doc = Html::parse_document(html);
    let anchors = Selector::parse("a[href]").expect("static selector");

    doc.select(&anchors)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| rule.report_number(href))
        .max()
        .ok_or_else(|| DiscoveryError::NoMatch {
            pattern: rule.href_contains.clone(),
        })
}

/// Fetch the landing page once and read the newest report number from it.
pub async fn discover_latest(
    fetcher: &dyn Fetcher,
    landing_url: &str,
    rule: &LinkRule,
) -> Result<u32, DiscoveryError> {
    let page = fetcher.fetch(landing_url).await?;
    if !page.is_success() {
        return Err(DiscoveryError::Status {
            status: page.status,
        });
    }
    let latest = latest_report_number(&page.text(), rule)?;
    tracing::info!(target: "discovery", latest, "latest published report");
    Ok(latest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(hrefs: &[&str]) -> String {
        let links: String = hrefs
            .iter()
            .map(|h| format!(r#"<li><a href="{h}">report</a></li>"#))
            .collect();
        format!("<html><body><ul>{links}</ul></body></html>")
    }

    #[test]
    fn picks_maximum_token() {
        let html = page(&[
            "/hodo/saishin/corona0101.html",
            "/hodo/saishin/corona0099.html",
            "https://example.test/hodo/saishin/corona0102.html",
        ]);
        assert_eq!(latest_report_number(&html, &LinkRule::default()).unwrap(), 102);
    }

    #[test]
    fn ignores_unrelated_links() {
        let html = page(&[
            "/hodo/saishin/corona1500.html",
            "/hodo/other/press9999.html",
            "/hodo/saishin/corona.html",
        ]);
        assert_eq!(latest_report_number(&html, &LinkRule::default()).unwrap(), 1500);
    }

    #[test]
    fn no_matching_link_is_an_error() {
        let html = page(&["/index.html"]);
        let err = latest_report_number(&html, &LinkRule::default()).unwrap_err();
        assert!(matches!(err, DiscoveryError::NoMatch { .. }));
    }

    #[test]
    fn custom_rule() {
        let rule = LinkRule::new("/press/", r"no(\d+)\.htm$").unwrap();
        let html = page(&["/press/no7.htm", "/press/no12.htm"]);
        assert_eq!(latest_report_number(&html, &rule).unwrap(), 12);
    }
}
