//! Crawler module for recursive site mirroring
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind a transport trait, with retry and backoff
//! - Content sniffing and link extraction (HTML structure and raw text)
//! - Bounding the number of in-flight requests
//! - Per-resource tasks and overall run coordination

mod coordinator;
mod fetcher;
mod links;
mod parser;
mod retry;
mod scheduler;
mod sniff;
mod task;
mod tasks;
mod text;

pub use coordinator::{Crawler, StartParams, REPORT_TARGET};
pub use fetcher::{
    build_http_client, status_line, FetchError, HttpTransport, Transport, TransportResponse,
};
pub use links::LinkSet;
pub use parser::extract_html_links;
pub use retry::{backoff_delay, FailureClass, RetryDecision, RetryPolicy, BACKOFF_SCHEDULE_MS};
pub use scheduler::{RequestSlot, Scheduler};
pub use sniff::{sniff, ContentType};
pub use tasks::{TaskCounter, TaskGuard};
pub use text::extract_text_links;
