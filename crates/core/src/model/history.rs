use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::model::ids::QuizId;

/// One row of the quiz history list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryEntry {
    pub id: QuizId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Accepts RFC 3339 timestamps as well as the naive ISO form the backend
/// emits for its UTC `created_at` column.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("invalid created_at timestamp: {raw}"))
    })
}

#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_naive_and_offset_timestamps() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2025-03-01T12:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-01T12:30:00.000000"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-01T14:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-01 12:30:00"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn deserializes_history_row() {
        let entry: HistoryEntry = serde_json::from_str(
            r#"{"id":9,"title":"Rust","url":"https://en.wikipedia.org/wiki/Rust","created_at":"2025-03-01T12:30:00.123456"}"#,
        )
        .unwrap();
        assert_eq!(entry.id, QuizId::new(9));
        assert_eq!(entry.title, "Rust");
    }
}
