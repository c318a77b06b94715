// src/lib.rs
//! Daily health-data release notifier.
//!
//! Each job polls a public source until the day's data is published, then
//! mails it. The poll loop lives in [`poll`]; per-source freshness checks in
//! [`sources`]; the four end-to-end jobs in [`jobs`].

pub mod bootstrap;
pub mod config;
pub mod delta;
pub mod extract;
pub mod jobs;
pub mod notify;
pub mod poll;
pub mod sources;
pub mod storage;
pub mod telemetry;

// ---- Re-exports for bins/tests ----
pub use crate::notify::{Notification, Notifier};
pub use crate::poll::{PollOutcome, PollTarget, Poller, Verdict};
