// src/sources/release_pdf.rs
use serde::Serialize;

use crate::poll::{FetchResult, FreshnessPredicate, PollTarget, Verdict};

pub const DEFAULT_LANDING_URL: &str = "https://www.fukushihoken.metro.tokyo.lg.jp/";
pub const DEFAULT_DOCUMENT_BASE: &str =
    "https://www.fukushihoken.metro.tokyo.lg.jp/hodo/saishin/corona";

/// Size floor for the link-only job.
pub const LINK_JOB_MIN_BYTES: u64 = 1_000_000;
/// Size floor for the jobs that attach the PDF.
pub const ATTACH_JOB_MIN_BYTES: u64 = 800_000;

/// `{base}{n}.files/{n}.pdf`
pub fn document_address(base_url: &str, number: u32) -> String {
    format!("{base_url}{number}.files/{number}.pdf")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseDocument {
    pub address: String,
    pub report_number: u32,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// A probe is the real release only when it is a 200 bigger than `min_bytes`;
/// placeholders and redirect pages come in far smaller.
#[derive(Debug, Clone, Copy)]
pub struct ReleasePdfPredicate {
    pub min_bytes: u64,
}

impl ReleasePdfPredicate {
    pub fn new(min_bytes: u64) -> Self {
        Self { min_bytes }
    }

    pub fn accepts(&self, status: u16, content_length: u64) -> bool {
        status == 200 && content_length > self.min_bytes
    }
}

impl FreshnessPredicate for ReleasePdfPredicate {
    type Payload = ReleaseDocument;

    fn evaluate(&self, target: &PollTarget, fetched: &FetchResult) -> Verdict<ReleaseDocument> {
        let Some(report_number) = target.probe_number() else {
            return Verdict::NotReady;
        };
        if !self.accepts(fetched.status, fetched.effective_length()) {
            return Verdict::NotReady;
        }
        Verdict::Ready(ReleaseDocument {
            address: fetched.address.clone(),
            report_number,
            bytes: fetched.body.clone(),
        })
    }
}
