use crate::models::{FilterWindow, RecordError, ReviewRecord};
use chrono::NaiveDateTime;

/// Whether the collector wants more records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Full,
}

/// Counters describing one filter pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectStats {
    pub seen: usize,
    pub accepted: usize,
    pub missing_timestamp: usize,
    pub out_of_window: usize,
    pub malformed: usize,
}

/// Single forward pass applying the recency cutoff and the result cap
///
/// Records are accepted in arrival order. Out-of-window records are skipped
/// rather than treated as an end-of-stream signal, since the source's
/// newest-first ordering is advisory.
#[derive(Debug)]
pub struct FilterCap {
    cutoff: NaiveDateTime,
    max_count: usize,
    accepted: Vec<ReviewRecord>,
    stats: CollectStats,
}

impl FilterCap {
    pub fn new(window: FilterWindow, now: NaiveDateTime) -> Self {
        Self {
            cutoff: window.cutoff(now),
            max_count: window.max_count,
            accepted: Vec::with_capacity(window.max_count.min(1024)),
            stats: CollectStats::default(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.accepted.len() >= self.max_count
    }

    /// Offer one decoded record
    pub fn push(&mut self, record: ReviewRecord) -> Flow {
        if self.is_full() {
            return Flow::Full;
        }
        self.stats.seen += 1;

        let Some(at) = record.at else {
            self.stats.missing_timestamp += 1;
            tracing::debug!("Skipping review without timestamp");
            return Flow::Continue;
        };

        if at < self.cutoff {
            self.stats.out_of_window += 1;
            return Flow::Continue;
        }

        self.accepted.push(record);
        self.stats.accepted += 1;

        if self.is_full() {
            Flow::Full
        } else {
            Flow::Continue
        }
    }

    /// Offer one record that may have failed to decode
    pub fn offer(&mut self, record: Result<ReviewRecord, RecordError>) -> Flow {
        match record {
            Ok(record) => self.push(record),
            Err(e) => {
                if self.is_full() {
                    return Flow::Full;
                }
                self.stats.seen += 1;
                self.stats.malformed += 1;
                tracing::warn!("Skipping malformed review: {}", e);
                Flow::Continue
            }
        }
    }

    pub fn finish(self) -> (Vec<ReviewRecord>, CollectStats) {
        (self.accepted, self.stats)
    }
}

/// Collect the records within `window`, pulling from `records` only until the
/// cap is reached.
pub fn collect<I>(records: I, window: FilterWindow, now: NaiveDateTime) -> Vec<ReviewRecord>
where
    I: IntoIterator<Item = Result<ReviewRecord, RecordError>>,
{
    let mut collector = FilterCap::new(window, now);
    if collector.is_full() {
        return Vec::new();
    }

    for record in records {
        if collector.offer(record) == Flow::Full {
            break;
        }
    }

    collector.finish().0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    fn review(days_ago: i64) -> Result<ReviewRecord, RecordError> {
        Ok(ReviewRecord {
            user_name: Some(format!("user {}", days_ago)),
            at: Some(now() - Duration::days(days_ago)),
            score: Some(5),
            ..Default::default()
        })
    }

    #[test]
    fn test_empty_input() {
        let out = collect(Vec::new(), FilterWindow::new(30, 10), now());
        assert!(out.is_empty());
    }

    #[test]
    fn test_zero_cap_pulls_nothing() {
        let mut pulled = 0;
        let records = (0..5).map(|d| {
            pulled += 1;
            review(d)
        });
        let out = collect(records, FilterWindow::new(30, 0), now());
        assert!(out.is_empty());
        assert_eq!(pulled, 0);
    }

    #[test]
    fn test_stops_pulling_at_cap() {
        let mut pulled = 0;
        let records = (0..50).map(|d| {
            pulled += 1;
            review(d)
        });
        let out = collect(records, FilterWindow::new(365, 3), now());
        assert_eq!(out.len(), 3);
        assert_eq!(pulled, 3);
    }

    #[test]
    fn test_out_of_window_does_not_stop_the_pass() {
        let records = vec![review(1), review(400), review(2), review(500), review(3)];
        let out = collect(records, FilterWindow::new(365, 10), now());
        let users: Vec<_> = out.iter().map(|r| r.user_name.clone().unwrap()).collect();
        assert_eq!(users, vec!["user 1", "user 2", "user 3"]);
    }

    #[test]
    fn test_missing_timestamp_not_counted() {
        let no_date = Ok(ReviewRecord {
            user_name: Some("ghost".to_string()),
            ..Default::default()
        });
        let records = vec![no_date, review(1), review(2)];
        let mut collector = FilterCap::new(FilterWindow::new(30, 2), now());
        for r in records {
            collector.offer(r);
        }
        let (out, stats) = collector.finish();
        assert_eq!(out.len(), 2);
        assert_eq!(stats.missing_timestamp, 1);
    }

    #[test]
    fn test_malformed_record_is_skipped() {
        let records = vec![review(1), Err(RecordError::NotAnObject), review(2)];
        let mut collector = FilterCap::new(FilterWindow::new(30, 10), now());
        for r in records {
            collector.offer(r);
        }
        let (out, stats) = collector.finish();
        assert_eq!(out.len(), 2);
        assert_eq!(stats.malformed, 1);
        assert_eq!(stats.seen, 3);
    }

    #[test]
    fn test_unbounded_age_keeps_every_dated_record() {
        let out = collect(vec![review(1), review(40_000)], FilterWindow::new(u32::MAX, 10), now());
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_cutoff_boundary_is_inclusive() {
        let out = collect(vec![review(30), review(31)], FilterWindow::new(30, 10), now());
        assert_eq!(out.len(), 1);
    }
}
