// src/extract.rs
//! Headline and case-count figures from a release PDF.
//!
//! Two independent readings are produced: one from the page-text block
//! layout and one from the summary table. Both go into the mail so a human
//! can spot a mismatch; nothing here reconciles them.

use anyhow::{anyhow, Result};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::Serialize;

/// Block index of the release headline in the first page text.
pub const HEADLINE_BLOCK: usize = 1;
/// Block index of the day's case count in the first page text.
pub const COUNT_BLOCK: usize = 8;
pub const DEFAULT_TABLE_HEADER: &str = "総数";

pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, pdf: &[u8]) -> Result<String>;
}

/// First-page text extraction backed by `pdf-extract`. The figures and the
/// summary table both sit on page 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract_text(&self, pdf: &[u8]) -> Result<String> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(pdf)
            .map_err(|e| anyhow!("pdf text extraction: {e:?}"))?;
        first_page(pages)
    }
}

fn first_page(pages: Vec<String>) -> Result<String> {
    pages
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("pdf has no pages"))
}

/// Split on blank lines, trim, and drop ASCII and full-width spaces.
pub fn text_blocks(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .split("\n\n")
        .map(|b| {
            b.trim()
                .chars()
                .filter(|c| *c != ' ' && *c != '\u{3000}')
                .collect::<String>()
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextFigures {
    pub headline: Option<String>,
    pub count: Option<String>,
}

impl TextFigures {
    pub fn from_blocks(blocks: &[String]) -> Self {
        Self {
            headline: blocks.get(HEADLINE_BLOCK).cloned(),
            count: blocks.get(COUNT_BLOCK).cloned(),
        }
    }
}

fn integer_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\d{1,3}(?:,\d{3})+|\d+").unwrap())
}

/// First integer printed after the table's `header` cell.
pub fn table_total(text: &str, header: &str) -> Option<i64> {
    let start = text.find(header)? + header.len();
    integer_re()
        .find(&text[start..])
        .and_then(|m| m.as_str().replace(',', "").parse().ok())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FigureReport {
    pub text: TextFigures,
    pub table: Option<i64>,
}

impl FigureReport {
    pub fn from_text(text: &str, table_header: &str) -> Self {
        let report = Self {
            text: TextFigures::from_blocks(&text_blocks(text)),
            table: table_total(text, table_header),
        };
        tracing::info!(
            target: "extract",
            headline = report.text.headline.as_deref().unwrap_or("-"),
            from_text = report.text.count.as_deref().unwrap_or("-"),
            from_table = ?report.table,
            "extracted figures"
        );
        report
    }

    /// Whether the text reading parses to the table reading. Reported only.
    pub fn agrees(&self) -> Option<bool> {
        let table = self.table?;
        let digits: String = self
            .text
            .count
            .as_deref()?
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        Some(digits.parse::<i64>().ok()? == table)
    }
}
