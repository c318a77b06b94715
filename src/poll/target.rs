// src/poll/target.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// What a poll loop is waiting for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollTarget {
    /// A dated row inside a tabular feed.
    DateRow {
        source_url: String,
        target_date: NaiveDate,
    },
    /// A numbered document probed at `report_number + offset`.
    NumberedDocument {
        base_url: String,
        report_number: u32,
        offset: u32,
    },
}

impl PollTarget {
    pub fn date_row(source_url: impl Into<String>, target_date: NaiveDate) -> Self {
        Self::DateRow {
            source_url: source_url.into(),
            target_date,
        }
    }

    /// Starts probing one past the discovered report number.
    pub fn numbered_document(base_url: impl Into<String>, report_number: u32) -> Self {
        Self::NumberedDocument {
            base_url: base_url.into(),
            report_number,
            offset: 1,
        }
    }

    pub fn probe_address(&self) -> String {
        match self {
            Self::DateRow { source_url, .. } => source_url.clone(),
            Self::NumberedDocument {
                base_url,
                report_number,
                offset,
            } => crate::sources::release_pdf::document_address(base_url, report_number + offset),
        }
    }

    /// Report number currently under probe (`base + offset`).
    pub fn probe_number(&self) -> Option<u32> {
        match self {
            Self::NumberedDocument {
                report_number,
                offset,
                ..
            } => Some(report_number + offset),
            Self::DateRow { .. } => None,
        }
    }

    pub fn offset(&self) -> Option<u32> {
        match self {
            Self::NumberedDocument { offset, .. } => Some(*offset),
            Self::DateRow { .. } => None,
        }
    }

    pub fn target_date(&self) -> Option<NaiveDate> {
        match self {
            Self::DateRow { target_date, .. } => Some(*target_date),
            Self::NumberedDocument { .. } => None,
        }
    }

    /// Move to the next probe after a NotReady result.
    pub fn advance(&mut self, bound: u32) {
        if let Self::NumberedDocument { offset, .. } = self {
            *offset = if *offset >= bound.max(1) { 1 } else { *offset + 1 };
        }
    }
}
