//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageState`: where a page URL is in the traversal (unseen, queued, visited)
//! - `DocumentState`: what happened to a detected document (detected, downloaded, failed)

mod document_state;
mod page_state;

pub use document_state::DocumentState;
pub use page_state::PageState;
