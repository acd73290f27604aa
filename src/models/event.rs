//! Event model.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{parse_calendar_date, Document, FromDocument, PLACEHOLDER_IMAGE};
use crate::errors::{DecodeError, ValidationError};

/// A school event shown on the events page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Stored calendar date, as entered by the admin
    pub event_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Parsed event date.
    pub fn date(&self) -> Result<NaiveDateTime, DecodeError> {
        parse_calendar_date(&self.event_date)
    }

    pub fn display_image(&self) -> &str {
        self.image_url.as_deref().unwrap_or(PLACEHOLDER_IMAGE)
    }
}

impl FromDocument for Event {
    const COLLECTION: &'static str = "events";

    fn from_document(doc: &Document) -> Result<Self, DecodeError> {
        let event_date = doc.required_str("eventDate")?;
        parse_calendar_date(&event_date)?;

        Ok(Self {
            id: doc.id.clone(),
            title: doc.required_str("title")?,
            description: doc.required_str("description")?,
            event_date,
            location: doc.optional_str("location")?,
            image_url: doc.optional_str("imageUrl")?,
            created_at: doc.created_at,
        })
    }
}

/// Admin form input for a new event.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub event_date: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Validated event fields, ready to be written.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub event_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl EventDraft {
    pub fn validate(self) -> Result<NewEvent, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::Required("title"));
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(ValidationError::Required("description"));
        }
        let event_date = self.event_date.trim();
        if event_date.is_empty() {
            return Err(ValidationError::Required("eventDate"));
        }
        parse_calendar_date(event_date).map_err(|e| ValidationError::Invalid {
            field: "eventDate",
            reason: e.to_string(),
        })?;

        Ok(NewEvent {
            title: title.to_string(),
            description: description.to_string(),
            event_date: event_date.to_string(),
            location: non_empty(self.location),
            image_url: non_empty(self.image_url),
        })
    }
}

impl NewEvent {
    pub fn into_event(self, id: String, created_at: DateTime<Utc>) -> Event {
        Event {
            id,
            title: self.title,
            description: self.description,
            event_date: self.event_date,
            location: self.location,
            image_url: self.image_url,
            created_at,
        }
    }
}

/// Trim an optional form field, treating blank input as absent.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_event() {
        let doc = Document {
            id: "e1".to_string(),
            fields: json!({
                "title": "Science fair",
                "description": "Annual fair",
                "eventDate": "2025-03-01",
                "location": ""
            })
            .as_object()
            .cloned()
            .unwrap(),
            created_at: Utc::now(),
        };

        let event = Event::from_document(&doc).unwrap();
        assert_eq!(event.id, "e1");
        assert_eq!(event.location, None);
        assert_eq!(event.display_image(), PLACEHOLDER_IMAGE);
    }

    #[test]
    fn test_decode_rejects_malformed_date() {
        let doc = Document {
            id: "e2".to_string(),
            fields: json!({
                "title": "Broken",
                "description": "x",
                "eventDate": "soon"
            })
            .as_object()
            .cloned()
            .unwrap(),
            created_at: Utc::now(),
        };

        assert_eq!(
            Event::from_document(&doc),
            Err(DecodeError::InvalidDate("soon".to_string()))
        );
    }

    #[test]
    fn test_draft_requires_title_description_and_date() {
        let draft = EventDraft {
            title: "  ".to_string(),
            description: "d".to_string(),
            event_date: "2025-01-01".to_string(),
            ..Default::default()
        };
        assert_eq!(draft.validate(), Err(ValidationError::Required("title")));

        let draft = EventDraft {
            title: "t".to_string(),
            event_date: "2025-01-01".to_string(),
            ..Default::default()
        };
        assert_eq!(
            draft.validate(),
            Err(ValidationError::Required("description"))
        );

        let draft = EventDraft {
            title: "t".to_string(),
            description: "d".to_string(),
            ..Default::default()
        };
        assert_eq!(draft.validate(), Err(ValidationError::Required("eventDate")));
    }

    #[test]
    fn test_draft_blank_optionals_are_dropped() {
        let new = EventDraft {
            title: "Graduation".to_string(),
            description: "Ceremony".to_string(),
            event_date: "2025-12-10T19:00".to_string(),
            location: Some("   ".to_string()),
            image_url: Some("https://example.org/a.jpg".to_string()),
        }
        .validate()
        .unwrap();

        assert_eq!(new.location, None);
        assert_eq!(new.image_url.as_deref(), Some("https://example.org/a.jpg"));
    }
}
