// src/config/mod.rs
pub mod notifier;

pub use notifier::{MailConfig, NotifierConfig, PollConfig, SourcesConfig, StorageConfig};
