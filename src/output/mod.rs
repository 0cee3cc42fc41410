//! Output module for persisting records and reporting crawl results
//!
//! This module handles:
//! - Appending deduplicated records to a JSON Lines file
//! - Reading records back from such a file
//! - Summarizing a finished run and why it stopped

mod jsonl;
pub mod summary;
mod traits;

pub use jsonl::{read_records, JsonlSink};
pub use summary::{print_summary, CrawlSummary, StopReason};
pub use traits::{OutputError, OutputResult, RecordSink};
