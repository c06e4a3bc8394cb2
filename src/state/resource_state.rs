/// Resource state definitions for tracking crawl progress
///
/// Every resource starts in `Wait`, moves through the request/download/read/
/// save phases and ends in exactly one terminal state.
use serde::Serialize;
use std::fmt;

/// Represents the current state of a resource in the crawl process
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum ResourceState {
    // ===== Active States =====
    /// Registered, waiting for a request slot
    #[default]
    Wait,

    /// Request in flight
    Request,

    /// Waiting before the next request attempt
    RequestWaitRepeat,

    /// Reading the response body
    Download,

    /// Sniffing the content type and extracting links
    Read,

    /// Writing the body to disk
    Save,

    // ===== Terminal Success States =====
    /// Body written to the output directory
    Complete,

    // ===== Terminal Skip States =====
    /// Not fetched: foreign, unprocessable scheme or oversized URL
    Skip,

    // ===== Terminal Error States =====
    /// Request failed permanently or retries were exhausted
    RequestError,

    /// Body could not be read and retries were exhausted
    DownloadError,

    /// Body could not be written to disk
    SaveError,
}

impl ResourceState {
    /// Returns true if this is a terminal state (no further processing)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Complete | Self::Skip | Self::RequestError | Self::DownloadError | Self::SaveError
        )
    }

    /// Returns true while the resource is in a processing phase
    ///
    /// `Wait` is not active: the task has not claimed a request slot yet.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::Request | Self::RequestWaitRepeat | Self::Download | Self::Read | Self::Save
        )
    }

    /// Returns true for terminal error states
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::RequestError | Self::DownloadError | Self::SaveError
        )
    }

    /// Short machine-friendly name of the state
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wait => "wait",
            Self::Request => "request",
            Self::RequestWaitRepeat => "request_wait_repeat",
            Self::Download => "download",
            Self::Read => "read",
            Self::Save => "save",
            Self::Complete => "complete",
            Self::Skip => "skip",
            Self::RequestError => "request_error",
            Self::DownloadError => "download_error",
            Self::SaveError => "save_error",
        }
    }

    /// Human-readable description used in reports
    pub fn description(&self) -> &'static str {
        match self {
            Self::Wait => "Waiting",
            Self::Request => "Requesting",
            Self::RequestWaitRepeat => "Waiting to repeat request",
            Self::Download => "Downloading",
            Self::Read => "Reading",
            Self::Save => "Saving",
            Self::Complete => "Saved",
            Self::Skip => "Skipped",
            Self::RequestError => "Request error",
            Self::DownloadError => "Download error",
            Self::SaveError => "Save error",
        }
    }

    /// Returns all possible resource states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Wait,
            Self::Request,
            Self::RequestWaitRepeat,
            Self::Download,
            Self::Read,
            Self::Save,
            Self::Complete,
            Self::Skip,
            Self::RequestError,
            Self::DownloadError,
            Self::SaveError,
        ]
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
