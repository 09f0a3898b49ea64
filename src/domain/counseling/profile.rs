//! User profile collected at intake.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::foundation::ValidationError;

pub const FIELD_DURATION: &str = "Marriage Duration";
pub const FIELD_MAIN_CONFLICT: &str = "Main Conflict Source";
pub const FIELD_TENDENCY: &str = "User's Tendency";
pub const FIELD_EMOTIONAL_RATIONAL_INDEX: &str =
    "Emotional-Rational Index (1:Very Emotional, 10:Very Rational)";

pub const EMOTIONAL_RATIONAL_MIN: u8 = 1;
pub const EMOTIONAL_RATIONAL_MAX: u8 = 10;

/// Free-form intake fields, in the order they were collected.
///
/// Set once on the first turn and never re-derived afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile(Map<String, Value>);

impl UserProfile {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Adds or replaces a field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Renders the profile as `key: value` lines for prompts.
    pub fn render(&self) -> String {
        if self.0.is_empty() {
            return "(no profile information provided)".to_string();
        }
        self.0
            .iter()
            .map(|(key, value)| match value {
                Value::String(text) => format!("{}: {}", key, text),
                other => format!("{}: {}", key, other),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<Map<String, Value>> for UserProfile {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// The four intake answers gathered before the first message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeForm {
    pub relationship_duration: String,
    pub main_conflict: String,
    pub tendency: String,
    pub emotional_rational_index: u8,
}

impl IntakeForm {
    /// Parses a raw emotional-rational index answer.
    ///
    /// # Errors
    ///
    /// `InvalidFormat` if the answer is not a whole number, `OutOfRange` if
    /// it falls outside `[1, 10]`.
    pub fn parse_index(raw: &str) -> Result<u8, ValidationError> {
        let value: i64 = raw.trim().parse().map_err(|_| {
            ValidationError::invalid_format("emotional_rational_index", "expected a whole number")
        })?;
        let (min, max) = (
            i64::from(EMOTIONAL_RATIONAL_MIN),
            i64::from(EMOTIONAL_RATIONAL_MAX),
        );
        if !(min..=max).contains(&value) {
            return Err(ValidationError::out_of_range(
                "emotional_rational_index",
                min,
                max,
                value,
            ));
        }
        Ok(value as u8)
    }

    /// Converts the form into a profile.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` if the index is outside `[1, 10]`.
    pub fn into_profile(self) -> Result<UserProfile, ValidationError> {
        let index = self.emotional_rational_index;
        if !(EMOTIONAL_RATIONAL_MIN..=EMOTIONAL_RATIONAL_MAX).contains(&index) {
            return Err(ValidationError::out_of_range(
                "emotional_rational_index",
                i64::from(EMOTIONAL_RATIONAL_MIN),
                i64::from(EMOTIONAL_RATIONAL_MAX),
                i64::from(index),
            ));
        }

        Ok(UserProfile::new()
            .with_field(FIELD_DURATION, self.relationship_duration)
            .with_field(FIELD_MAIN_CONFLICT, self.main_conflict)
            .with_field(FIELD_TENDENCY, self.tendency)
            .with_field(FIELD_EMOTIONAL_RATIONAL_INDEX, index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(index: u8) -> IntakeForm {
        IntakeForm {
            relationship_duration: "2 years".to_string(),
            main_conflict: "money".to_string(),
            tendency: "I need some space".to_string(),
            emotional_rational_index: index,
        }
    }

    #[test]
    fn intake_builds_profile_in_collection_order() {
        let profile = form(4).into_profile().unwrap();
        let keys: Vec<_> = profile.fields().map(|(k, _)| k.as_str()).collect();

        assert_eq!(
            keys,
            vec![
                FIELD_DURATION,
                FIELD_MAIN_CONFLICT,
                FIELD_TENDENCY,
                FIELD_EMOTIONAL_RATIONAL_INDEX
            ]
        );
        assert_eq!(
            profile.get(FIELD_EMOTIONAL_RATIONAL_INDEX),
            Some(&Value::from(4))
        );
    }

    #[test]
    fn intake_rejects_index_out_of_range() {
        assert!(matches!(
            form(0).into_profile(),
            Err(ValidationError::OutOfRange { actual: 0, .. })
        ));
        assert!(form(11).into_profile().is_err());
    }

    #[test]
    fn parse_index_validates_input() {
        assert_eq!(IntakeForm::parse_index(" 7 ").unwrap(), 7);
        assert!(matches!(
            IntakeForm::parse_index("seven"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            IntakeForm::parse_index("42"),
            Err(ValidationError::OutOfRange { actual: 42, .. })
        ));
    }

    #[test]
    fn render_lists_fields_as_lines() {
        let profile = UserProfile::new()
            .with_field("duration", "2 years")
            .with_field("index", 3);
        assert_eq!(profile.render(), "duration: 2 years\nindex: 3");
    }

    #[test]
    fn render_of_empty_profile_is_placeholder() {
        assert!(UserProfile::new().render().contains("no profile"));
    }

    #[test]
    fn round_trips_through_json_preserving_order() {
        let profile = UserProfile::new()
            .with_field("zeta", "last alphabetically")
            .with_field("alpha", "first alphabetically");
        let json = serde_json::to_string(&profile).unwrap();
        assert_eq!(
            json,
            r#"{"zeta":"last alphabetically","alpha":"first alphabetically"}"#
        );
    }
}
