//! Home page content singleton.

use serde::{Deserialize, Serialize};

use super::event::non_empty;
use super::{Document, FromDocument};
use crate::errors::{DecodeError, ValidationError};

/// Fixed document id of the singleton inside the `home` collection.
pub const HOME_DOCUMENT_ID: &str = "content";

/// Hero image used when none has been uploaded.
pub const DEFAULT_HERO_IMAGE: &str = "/assets/hero-default.jpg";

/// Editable home page copy. Exactly one instance exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeContent {
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_image_url: Option<String>,
}

impl Default for HomeContent {
    fn default() -> Self {
        Self {
            title: "Tradition in Education".to_string(),
            body: "Over forty years shaping citizens through transformative education".to_string(),
            hero_image_url: None,
        }
    }
}

impl HomeContent {
    pub fn display_image(&self) -> &str {
        self.hero_image_url.as_deref().unwrap_or(DEFAULT_HERO_IMAGE)
    }

    /// Check an edited copy before it replaces the stored one.
    pub fn validate(self) -> Result<Self, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::Required("title"));
        }
        let body = self.body.trim();
        if body.is_empty() {
            return Err(ValidationError::Required("body"));
        }
        Ok(Self {
            title: title.to_string(),
            body: body.to_string(),
            hero_image_url: non_empty(self.hero_image_url),
        })
    }
}

impl FromDocument for HomeContent {
    const COLLECTION: &'static str = "home";

    fn from_document(doc: &Document) -> Result<Self, DecodeError> {
        Ok(Self {
            title: doc.required_str("title")?,
            body: doc.required_str("body")?,
            hero_image_url: doc.optional_str("heroImageUrl")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_trims_and_requires_title() {
        let edited = HomeContent {
            title: "  Welcome ".to_string(),
            body: "Hello".to_string(),
            hero_image_url: Some(" ".to_string()),
        }
        .validate()
        .unwrap();
        assert_eq!(edited.title, "Welcome");
        assert_eq!(edited.hero_image_url, None);
        assert_eq!(edited.display_image(), DEFAULT_HERO_IMAGE);

        let missing = HomeContent {
            title: String::new(),
            ..HomeContent::default()
        };
        assert_eq!(missing.validate(), Err(ValidationError::Required("title")));
    }
}
