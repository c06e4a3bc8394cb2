//! Storage module for mirrored files
//!
//! This module owns everything that touches the local filesystem:
//! - Locating the output root and the per-site output directory
//! - Preparing (or replacing) that directory at the start of a run
//! - Mapping resource URLs to local paths that cannot escape the output root

mod output_dir;
mod writer;

pub use output_dir::{output_dir_for, prepare_output_dir, resolve_output_root, run_log_path};
pub use writer::{PathSafeWriter, SaveError};
