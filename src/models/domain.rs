use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Canonical application identifier, e.g. `com.whatsapp`
///
/// Only produced by the extractor. Passed verbatim to the review source and
/// into output filenames and rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AppIdentifier(String);

impl AppIdentifier {
    pub(crate) fn new_unchecked(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for AppIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AppIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors raised while decoding a single review record
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecordError {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("field '{0}' has an unsupported type")]
    InvalidField(&'static str),

    #[error("unparseable timestamp: {0}")]
    InvalidTimestamp(String),
}

/// One user review as delivered by the review source
///
/// Every field is optional; the sanitizer supplies defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewRecord {
    pub user_name: Option<String>,
    /// Publication instant, normalized to naive UTC
    pub at: Option<NaiveDateTime>,
    pub score: Option<i64>,
    pub title: Option<String>,
    pub content: Option<String>,
}

impl ReviewRecord {
    /// Decode a raw feed entry.
    ///
    /// Field names follow the google-play-scraper convention (`userName`,
    /// `score`, `content`, `at`) with a few common aliases.
    pub fn from_value(value: &Value) -> Result<Self, RecordError> {
        let obj = value.as_object().ok_or(RecordError::NotAnObject)?;

        let field = |names: &[&str]| names.iter().find_map(|n| obj.get(*n)).filter(|v| !v.is_null());

        let at = match field(&["at", "date", "timestamp"]) {
            Some(raw) => Some(parse_timestamp(raw)?),
            None => None,
        };

        let score = match field(&["score", "rating"]) {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Some(Value::String(s)) => s.trim().parse().ok(),
            Some(_) => return Err(RecordError::InvalidField("score")),
            None => None,
        };

        Ok(Self {
            user_name: text_field(field(&["userName", "user_name", "author"]), "userName")?,
            at,
            score,
            title: text_field(field(&["title"]), "title")?,
            content: text_field(field(&["content", "text", "body"]), "content")?,
        })
    }
}

fn text_field(value: Option<&Value>, name: &'static str) -> Result<Option<String>, RecordError> {
    match value {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(_) => Err(RecordError::InvalidField(name)),
    }
}

/// Parse a feed timestamp into a naive UTC instant.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` and Unix
/// epoch numbers (seconds, or milliseconds when larger than 10^11).
pub fn parse_timestamp(raw: &Value) -> Result<NaiveDateTime, RecordError> {
    match raw {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Ok(dt.with_timezone(&Utc).naive_utc());
            }
            for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
                if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
                    return Ok(dt);
                }
            }
            Err(RecordError::InvalidTimestamp(s.to_string()))
        }
        Value::Number(n) => {
            let epoch = n
                .as_i64()
                .ok_or_else(|| RecordError::InvalidTimestamp(n.to_string()))?;
            let parsed = if epoch.abs() > 100_000_000_000 {
                DateTime::from_timestamp_millis(epoch)
            } else {
                DateTime::from_timestamp(epoch, 0)
            };
            parsed
                .map(|dt| dt.naive_utc())
                .ok_or_else(|| RecordError::InvalidTimestamp(n.to_string()))
        }
        other => Err(RecordError::InvalidTimestamp(other.to_string())),
    }
}

/// Recency window and result cap applied to the review stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterWindow {
    pub max_age_days: u32,
    pub max_count: usize,
}

impl FilterWindow {
    pub fn new(max_age_days: u32, max_count: usize) -> Self {
        Self {
            max_age_days,
            max_count,
        }
    }

    /// Oldest accepted publication instant relative to `now`
    ///
    /// Saturates at the earliest representable instant for very long windows.
    pub fn cutoff(&self, now: NaiveDateTime) -> NaiveDateTime {
        Duration::try_days(i64::from(self.max_age_days))
            .and_then(|age| now.checked_sub_signed(age))
            .unwrap_or(NaiveDateTime::MIN)
    }
}

impl Default for FilterWindow {
    fn default() -> Self {
        Self {
            max_age_days: 365,
            max_count: 100,
        }
    }
}

/// Per-field length bounds used by the sanitizer (in characters)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLimits {
    pub author: usize,
    pub title: usize,
    pub body: usize,
    pub missing_author: String,
}

impl Default for FieldLimits {
    fn default() -> Self {
        Self {
            author: 100,
            title: 200,
            body: 2000,
            missing_author: "N/A".to_string(),
        }
    }
}

/// Sanitized projection of a review into the six export columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub app_id: String,
    pub user: String,
    pub rating: u32,
    /// `YYYY-MM-DD HH:MM:SS`
    pub date: String,
    pub title: String,
    pub review: String,
}

impl ExportRow {
    pub const HEADER: [&'static str; 6] = ["App ID", "User", "Rating", "Date", "Title", "Review"];

    /// Column values in header order
    pub fn fields(&self) -> [String; 6] {
        [
            self.app_id.clone(),
            self.user.clone(),
            self.rating.to_string(),
            self.date.clone(),
            self.title.clone(),
            self.review.clone(),
        ]
    }
}

/// Encoded CSV file ready to be returned to the caller
#[derive(Debug, Clone)]
pub struct ExportDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub rows: usize,
}

impl ExportDocument {
    pub const CONTENT_TYPE: &'static str = "text/csv; charset=utf-8";
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_decode_full_record() {
        let record = ReviewRecord::from_value(&json!({
            "userName": "Анна",
            "score": 5,
            "title": "Great",
            "content": "Works well",
            "at": "2024-03-01T10:20:30Z",
            "country": "RU",
            "lang": "ru"
        }))
        .unwrap();

        assert_eq!(record.user_name.as_deref(), Some("Анна"));
        assert_eq!(record.score, Some(5));
        assert_eq!(
            record.at,
            Some(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(10, 20, 30).unwrap())
        );
    }

    #[test]
    fn test_decode_missing_fields() {
        let record = ReviewRecord::from_value(&json!({ "title": null })).unwrap();
        assert_eq!(record, ReviewRecord::default());
    }

    #[test]
    fn test_timestamp_normalized_to_utc() {
        let at = parse_timestamp(&json!("2024-03-01T12:00:00+03:00")).unwrap();
        assert_eq!(at.to_string(), "2024-03-01 09:00:00");
    }

    #[test]
    fn test_epoch_seconds_and_millis() {
        let secs = parse_timestamp(&json!(1_700_000_000)).unwrap();
        let millis = parse_timestamp(&json!(1_700_000_000_000i64)).unwrap();
        assert_eq!(secs, millis);
    }

    #[test]
    fn test_malformed_records() {
        assert_eq!(ReviewRecord::from_value(&json!("text")), Err(RecordError::NotAnObject));
        assert_eq!(
            ReviewRecord::from_value(&json!({ "title": ["a"] })),
            Err(RecordError::InvalidField("title"))
        );
        assert!(matches!(
            ReviewRecord::from_value(&json!({ "at": "yesterday" })),
            Err(RecordError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_window_cutoff() {
        let now = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let window = FilterWindow::new(30, 10);
        assert_eq!(window.cutoff(now).to_string(), "2024-12-01 00:00:00");
    }

    #[test]
    fn test_window_cutoff_saturates() {
        let now = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let window = FilterWindow::new(u32::MAX, 10);
        assert_eq!(window.cutoff(now), NaiveDateTime::MIN);
    }
}
