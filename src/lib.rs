//! Site-Mirror: a recursive website mirroring engine
//!
//! This crate starts from a seed URL, discovers every same-domain resource
//! reachable through hyperlinks, embedded assets and textual URL references,
//! fetches each one exactly once and writes it beneath a per-site output
//! directory.

pub mod config;
pub mod crawler;
pub mod logging;
pub mod output;
pub mod registry;
pub mod state;
pub mod storage;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Site-Mirror run-level operations
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Cannot start a crawler that is currently in state: \"{state}\"")]
    AlreadyRunning { state: state::RunState },

    #[error("Failed to parse the site URL: {0}")]
    IncorrectUrl(#[from] UrlError),

    #[error("Failed to locate the running executable: {0}")]
    ExecutableLocation(#[source] std::io::Error),

    #[error("Output directory already exists, remove it first: \"{}\"", path.display())]
    OutputDirExists { path: PathBuf },

    #[error("Output path is occupied by a file: \"{}\"", path.display())]
    OutputDirOccupied { path: PathBuf },

    #[error("Output directory error at \"{}\": {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open run log \"{}\": {source}", path.display())]
    RunLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Site address is too short")]
    TooShort,

    #[error("Could not determine the host of the URL")]
    EmptyHost,

    #[error("Host \"{0}\" cannot name a site directory")]
    InvalidHost(String),

    #[error("Failed to parse URL: {0}")]
    Parse(#[from] ::url::ParseError),
}

/// Result type alias for Site-Mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Crawler, StartParams};
pub use output::Report;
pub use registry::{Registry, Resource};
pub use state::{ResourceState, RunState};
pub use crate::url::{is_foreign, is_processable_scheme, parse_seed, resolve_relative};
