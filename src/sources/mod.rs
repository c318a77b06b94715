// src/sources/mod.rs
//! Data sources and their freshness predicates.

pub mod discovery;
pub mod release_pdf;
pub mod severe_cases;
