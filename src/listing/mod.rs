//! Listing engine: pure filter and ordering functions behind the public
//! pages. Nothing here touches the store; callers pass the decoded records
//! and, where time matters, the current instant.

mod events;
mod gallery;
mod graduates;

pub use events::*;
pub use gallery::*;
pub use graduates::*;

/// Error returned when a filter selection cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {what} filter {value:?}")]
pub struct UnknownFilter {
    pub what: &'static str,
    pub value: String,
}
