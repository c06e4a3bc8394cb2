//! URL classification for Site-Mirror
//!
//! This module turns user input into a seed URL, decides which URLs may be
//! fetched at all, tells same-site URLs from foreign ones, and resolves the
//! relative references found by the link extractors.

mod domain;
mod resolve;
mod seed;

pub use domain::{hostname, is_foreign, is_processable_scheme};
pub use resolve::{resolve_relative, root_file, site_root};
pub use seed::{parse_seed, MIN_SEED_LENGTH};
