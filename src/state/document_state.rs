use std::fmt;

/// Lifecycle of a URL classified as a target document
///
/// `Detected` is entered at most once per URL, which is what keeps a
/// document from being downloaded twice. From there exactly one of the two
/// terminal states follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentState {
    /// Classified as a document, download pending
    Detected,

    /// Body saved to the output directory
    Downloaded,

    /// Download attempted and failed; not retried
    DownloadFailed,
}

impl DocumentState {
    /// Checks whether moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: DocumentState) -> bool {
        matches!(
            (self, next),
            (Self::Detected, Self::Downloaded) | (Self::Detected, Self::DownloadFailed)
        )
    }

    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Downloaded | Self::DownloadFailed)
    }

    /// Short lowercase name used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Detected => "detected",
            Self::Downloaded => "downloaded",
            Self::DownloadFailed => "download_failed",
        }
    }
}

impl fmt::Display for DocumentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
