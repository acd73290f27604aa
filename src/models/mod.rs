//! Data models for the site.
//!
//! The content store hands back loosely typed [`Document`]s; every entity is
//! produced through an explicit decode step so malformed records are dropped
//! (and logged) instead of being trusted.

mod document;
mod event;
mod gallery;
mod graduate;
mod home;

pub use document::*;
pub use event::*;
pub use gallery::*;
pub use graduate::*;
pub use home::*;

use crate::errors::DecodeError;

/// Placeholder asset served when a record has no usable image.
pub const PLACEHOLDER_IMAGE: &str = "/assets/placeholder.svg";

/// An entity stored as documents in a named collection.
pub trait FromDocument: Sized {
    const COLLECTION: &'static str;

    fn from_document(doc: &Document) -> Result<Self, DecodeError>;
}

/// Decode a fetched collection, dropping malformed records.
pub fn decode_all<T: FromDocument>(docs: Vec<Document>) -> Vec<T> {
    let total = docs.len();
    let decoded: Vec<T> = docs
        .iter()
        .filter_map(|doc| match T::from_document(doc) {
            Ok(entity) => Some(entity),
            Err(e) => {
                tracing::warn!(
                    collection = T::COLLECTION,
                    id = %doc.id,
                    "Skipping malformed document: {}",
                    e
                );
                None
            }
        })
        .collect();

    if decoded.len() < total {
        tracing::warn!(
            collection = T::COLLECTION,
            "Dropped {} of {} documents during decode",
            total - decoded.len(),
            total
        );
    }
    decoded
}
