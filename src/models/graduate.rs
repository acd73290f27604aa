//! Graduate model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::event::non_empty;
use super::{Document, FromDocument, PLACEHOLDER_IMAGE};
use crate::errors::{DecodeError, ValidationError};

/// Earliest graduation year accepted.
pub const MIN_YEAR: i32 = 1980;
/// Latest graduation year accepted.
pub const MAX_YEAR: i32 = 2100;

/// A former student featured on the graduates page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Graduate {
    pub id: String,
    pub name: String,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profession: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub university: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Graduate {
    pub fn display_image(&self) -> &str {
        self.photo_url.as_deref().unwrap_or(PLACEHOLDER_IMAGE)
    }
}

fn year_in_range(year: i64) -> Option<i32> {
    i32::try_from(year)
        .ok()
        .filter(|y| (MIN_YEAR..=MAX_YEAR).contains(y))
}

impl FromDocument for Graduate {
    const COLLECTION: &'static str = "graduates";

    fn from_document(doc: &Document) -> Result<Self, DecodeError> {
        let raw_year = doc.required_i64("year")?;
        let year = year_in_range(raw_year).ok_or_else(|| DecodeError::InvalidField {
            field: "year",
            reason: format!("{} is outside {}-{}", raw_year, MIN_YEAR, MAX_YEAR),
        })?;

        Ok(Self {
            id: doc.id.clone(),
            name: doc.required_str("name")?,
            year,
            course: doc.optional_str("course")?,
            profession: doc.optional_str("profession")?,
            university: doc.optional_str("university")?,
            photo_url: doc.optional_str("photoUrl")?,
            created_at: doc.created_at,
        })
    }
}

/// Year as submitted by a form: either a JSON number or the text of a
/// number input.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum YearInput {
    Number(i64),
    Text(String),
}

/// Admin form input for a new graduate.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraduateDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub year: Option<YearInput>,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub profession: Option<String>,
    #[serde(default)]
    pub university: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

/// Validated graduate fields, ready to be written.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGraduate {
    pub name: String,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profession: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub university: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl GraduateDraft {
    pub fn validate(self) -> Result<NewGraduate, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::Required("name"));
        }

        let raw = match self.year {
            None => return Err(ValidationError::Required("year")),
            Some(YearInput::Text(ref s)) if s.trim().is_empty() => {
                return Err(ValidationError::Required("year"))
            }
            Some(YearInput::Number(n)) => n,
            Some(YearInput::Text(s)) => {
                s.trim()
                    .parse::<i64>()
                    .map_err(|_| ValidationError::Invalid {
                        field: "year",
                        reason: format!("{:?} is not a number", s),
                    })?
            }
        };
        let year = year_in_range(raw).ok_or_else(|| ValidationError::Invalid {
            field: "year",
            reason: format!("must be between {} and {}", MIN_YEAR, MAX_YEAR),
        })?;

        Ok(NewGraduate {
            name: name.to_string(),
            year,
            course: non_empty(self.course),
            profession: non_empty(self.profession),
            university: non_empty(self.university),
            photo_url: non_empty(self.photo_url),
        })
    }
}

impl NewGraduate {
    pub fn into_graduate(self, id: String, created_at: DateTime<Utc>) -> Graduate {
        Graduate {
            id,
            name: self.name,
            year: self.year,
            course: self.course,
            profession: self.profession,
            university: self.university,
            photo_url: self.photo_url,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft(name: &str, year: Option<YearInput>) -> GraduateDraft {
        GraduateDraft {
            name: name.to_string(),
            year,
            ..Default::default()
        }
    }

    #[test]
    fn test_year_accepts_number_or_text() {
        let a = draft("Ana", Some(YearInput::Number(2021))).validate().unwrap();
        let b = draft("Ana", Some(YearInput::Text(" 2021 ".to_string())))
            .validate()
            .unwrap();
        assert_eq!(a.year, 2021);
        assert_eq!(b.year, 2021);
    }

    #[test]
    fn test_year_range_is_enforced() {
        for year in [1979, 2101, 24] {
            let err = draft("Ana", Some(YearInput::Number(year)))
                .validate()
                .unwrap_err();
            assert_eq!(err.field(), "year");
        }
        assert!(draft("Ana", Some(YearInput::Number(1980))).validate().is_ok());
        assert!(draft("Ana", Some(YearInput::Number(2100))).validate().is_ok());
    }

    #[test]
    fn test_required_fields() {
        assert_eq!(
            draft("", Some(YearInput::Number(2020))).validate(),
            Err(ValidationError::Required("name"))
        );
        assert_eq!(
            draft("Ana", None).validate(),
            Err(ValidationError::Required("year"))
        );
        assert!(matches!(
            draft("Ana", Some(YearInput::Text("twenty".to_string()))).validate(),
            Err(ValidationError::Invalid { field: "year", .. })
        ));
    }

    #[test]
    fn test_draft_deserializes_string_year() {
        let draft: GraduateDraft =
            serde_json::from_value(json!({ "name": "Bia", "year": "2019" })).unwrap();
        assert_eq!(draft.year, Some(YearInput::Text("2019".to_string())));
    }

    #[test]
    fn test_decode_rejects_out_of_range_year() {
        let doc = Document {
            id: "g1".to_string(),
            fields: json!({ "name": "Caio", "year": 1850 })
                .as_object()
                .cloned()
                .unwrap(),
            created_at: Utc::now(),
        };
        assert!(matches!(
            Graduate::from_document(&doc),
            Err(DecodeError::InvalidField { field: "year", .. })
        ));
    }
}
