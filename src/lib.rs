//! newsledger - A CLI tool that collects topic coverage into a local ledger
//!
//! This crate provides:
//! - Source adapters for news and video search APIs
//! - A SQLite topic store, deduplicated by URL within each topic
//! - Per-topic, per-source aggregation with CSV and chart output

pub mod aggregate;
pub mod commands;
pub mod config;
pub mod error;
pub mod ingest;
pub mod model;
pub mod normalize;
pub mod progress;
pub mod report;
pub mod sources;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
