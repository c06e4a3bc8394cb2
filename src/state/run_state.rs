/// Run-level states of the crawl orchestrator
use serde::Serialize;
use std::fmt;

/// Represents the state of a whole crawl run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum RunState {
    /// No run has been started yet
    #[default]
    Ready,

    /// Parsing the seed and preparing the output directory
    Preparing,

    /// The seed URL could not be parsed
    IncorrectUrl,

    /// The output directory exists and overwriting was not requested
    OutputDirExist,

    /// The output directory could not be created, cleared or accessed
    OutputDirError,

    /// Crawl tasks are running
    Scanning,

    /// Every crawl task has finished
    Complete,
}

impl RunState {
    /// Returns true while a run is in progress and `start` must be refused
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Preparing | Self::Scanning)
    }

    /// Returns true if a new run may be started from this state
    pub fn can_start(&self) -> bool {
        !self.is_busy()
    }

    /// Returns true for states that ended a run before scanning began
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::IncorrectUrl | Self::OutputDirExist | Self::OutputDirError
        )
    }

    /// Human-readable description used in reports and errors
    pub fn description(&self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::Preparing => "Preparing",
            Self::IncorrectUrl => "Error: incorrect URL",
            Self::OutputDirExist => "Error: output directory for this site already exists",
            Self::OutputDirError => "Error: failed to create output directory",
            Self::Scanning => "Scanning",
            Self::Complete => "Scan complete",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
