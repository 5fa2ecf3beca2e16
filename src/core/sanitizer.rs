use crate::models::{AppIdentifier, ExportRow, FieldLimits, ReviewRecord};

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Normalize one text field.
///
/// `\n`, `\r` and other whitespace controls become a space, remaining
/// control characters are dropped, surrounding whitespace is trimmed and the
/// result is cut to `max_chars` characters. Applying it twice is a no-op.
pub fn clean_field(raw: &str, max_chars: usize) -> String {
    let flattened: String = raw
        .chars()
        .filter_map(|c| match c {
            '\n' | '\r' | '\t' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect();

    let trimmed = flattened.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((end, _)) => trimmed[..end].trim_end().to_string(),
        None => trimmed.to_string(),
    }
}

/// Builds export rows from review records
#[derive(Debug, Clone, Default)]
pub struct Sanitizer {
    limits: FieldLimits,
}

impl Sanitizer {
    pub fn new(limits: FieldLimits) -> Self {
        Self { limits }
    }

    pub fn sanitize(&self, app_id: &AppIdentifier, record: &ReviewRecord) -> ExportRow {
        let user = clean_field(record.user_name.as_deref().unwrap_or_default(), self.limits.author);
        let user = if user.is_empty() {
            self.limits.missing_author.clone()
        } else {
            user
        };

        ExportRow {
            app_id: app_id.to_string(),
            user,
            rating: record
                .score
                .and_then(|s| u32::try_from(s).ok())
                .unwrap_or(0),
            date: record
                .at
                .map(|at| at.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
            title: clean_field(record.title.as_deref().unwrap_or_default(), self.limits.title),
            review: clean_field(record.content.as_deref().unwrap_or_default(), self.limits.body),
        }
    }

    /// Re-apply the field rules to an existing row
    pub fn resanitize(&self, row: &ExportRow) -> ExportRow {
        let user = clean_field(&row.user, self.limits.author);
        ExportRow {
            app_id: row.app_id.clone(),
            user: if user.is_empty() {
                self.limits.missing_author.clone()
            } else {
                user
            },
            rating: row.rating,
            date: row.date.clone(),
            title: clean_field(&row.title, self.limits.title),
            review: clean_field(&row.review, self.limits.body),
        }
    }

    pub fn sanitize_all(&self, app_id: &AppIdentifier, records: &[ReviewRecord]) -> Vec<ExportRow> {
        records.iter().map(|r| self.sanitize(app_id, r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn app() -> AppIdentifier {
        AppIdentifier::new_unchecked("com.whatsapp")
    }

    #[test]
    fn test_newlines_become_spaces() {
        assert_eq!(clean_field("  line one\nline two\r\n ", 100), "line one line two");
    }

    #[test]
    fn test_control_bytes_removed() {
        assert_eq!(clean_field("bell\u{7}ed\u{0}", 100), "belled");
    }

    #[test]
    fn test_truncates_by_chars() {
        assert_eq!(clean_field("Привет мир", 6), "Привет");
        assert_eq!(clean_field("abc def", 4), "abc");
    }

    #[test]
    fn test_clean_field_idempotent() {
        for raw in ["abc def ghi", " \n x\ty \r", "Очень удобно, все функции", "\"quoted\", text"] {
            for max in [0, 3, 4, 10, 100] {
                let once = clean_field(raw, max);
                assert_eq!(clean_field(&once, max), once);
            }
        }
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let row = Sanitizer::default().sanitize(&app(), &ReviewRecord::default());
        assert_eq!(row.user, "N/A");
        assert_eq!(row.rating, 0);
        assert_eq!(row.title, "");
        assert_eq!(row.review, "");
        assert_eq!(row.app_id, "com.whatsapp");
    }

    #[test]
    fn test_negative_rating_defaults_to_zero() {
        let record = ReviewRecord {
            score: Some(-3),
            ..Default::default()
        };
        assert_eq!(Sanitizer::default().sanitize(&app(), &record).rating, 0);
    }

    #[test]
    fn test_date_format() {
        let record = ReviewRecord {
            at: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(3, 4, 5),
            score: Some(4),
            ..Default::default()
        };
        let row = Sanitizer::default().sanitize(&app(), &record);
        assert_eq!(row.date, "2024-01-02 03:04:05");
        assert_eq!(row.rating, 4);
    }

    #[test]
    fn test_sanitize_idempotent() {
        let sanitizer = Sanitizer::new(FieldLimits {
            author: 5,
            title: 8,
            body: 12,
            missing_author: "N/A".to_string(),
        });
        let record = ReviewRecord {
            user_name: Some(" \r\n ".to_string()),
            title: Some("A long\ntitle here".to_string()),
            content: Some("Body with\u{1b} escape and more words".to_string()),
            score: Some(3),
            ..Default::default()
        };
        let once = sanitizer.sanitize(&app(), &record);
        assert_eq!(sanitizer.resanitize(&once), once);
    }
}
