/// Page state definitions for tracking traversal progress
use std::fmt;

/// Represents where a page URL is in the breadth-first traversal
///
/// A URL only ever moves forward: `Unseen -> Queued -> Visited`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    /// Never seen by the scheduler
    Unseen,

    /// Waiting in the frontier
    Queued,

    /// Dequeued once; never dequeued again
    Visited,
}

impl PageState {
    /// Returns true if the URL can still be added to the frontier
    pub fn can_enqueue(&self) -> bool {
        matches!(self, Self::Unseen)
    }

    /// Short lowercase name used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unseen => "unseen",
            Self::Queued => "queued",
            Self::Visited => "visited",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
