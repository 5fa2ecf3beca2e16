use crate::core::{encoder, extractor, pipeline::{FilterCap, Flow}, sanitizer::Sanitizer, ExportError};
use crate::models::{AppIdentifier, ExportDocument, FilterWindow, ReviewRecord};
use crate::services::{ReviewQuery, ReviewSource, SortOrder};
use chrono::{DateTime, Utc};

/// Locale and paging parameters used when querying the review source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceParams {
    pub language: String,
    pub region: String,
    pub page_size: u32,
    pub max_pages: u32,
}

impl Default for SourceParams {
    fn default() -> Self {
        Self {
            language: "ru".to_string(),
            region: "ru".to_string(),
            page_size: 100,
            max_pages: 10,
        }
    }
}

/// Export pipeline orchestrator
///
/// # Stages
/// 1. Identifier extraction
/// 2. Paged pull from the review source
/// 3. Recency filter and result cap
/// 4. Field sanitization
/// 5. CSV encoding
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    params: SourceParams,
    sanitizer: Sanitizer,
}

impl Exporter {
    pub fn new(params: SourceParams, sanitizer: Sanitizer) -> Self {
        Self { params, sanitizer }
    }

    /// Run one export against `source`
    pub async fn run(
        &self,
        source: &dyn ReviewSource,
        raw_url: &str,
        window: FilterWindow,
    ) -> Result<ExportDocument, ExportError> {
        self.run_at(source, raw_url, window, Utc::now()).await
    }

    /// Same as [`Exporter::run`] with an explicit capture time
    pub async fn run_at(
        &self,
        source: &dyn ReviewSource,
        raw_url: &str,
        window: FilterWindow,
        now: DateTime<Utc>,
    ) -> Result<ExportDocument, ExportError> {
        let app_id = extractor::extract(raw_url)?;

        tracing::info!(
            "Exporting reviews for {} via {} source (days: {}, limit: {})",
            app_id,
            source.name(),
            window.max_age_days,
            window.max_count
        );

        let records = self.collect(source, &app_id, window, now).await?;

        let rows = self.sanitizer.sanitize_all(&app_id, &records);
        let bytes = encoder::encode(&rows);
        if bytes.is_empty() {
            return Err(ExportError::NoMatchingRecords {
                app_id: app_id.into_inner(),
                days: window.max_age_days,
                limit: window.max_count,
            });
        }

        let filename = format!("reviews_{}_{}.csv", app_id, now.format("%Y%m%d_%H%M%S"));

        tracing::info!("Exported {} reviews for {} into {}", rows.len(), app_id, filename);

        Ok(ExportDocument {
            filename,
            bytes,
            rows: rows.len(),
        })
    }

    /// Pull pages until the window is full or the feed runs out
    pub async fn collect(
        &self,
        source: &dyn ReviewSource,
        app_id: &AppIdentifier,
        window: FilterWindow,
        now: DateTime<Utc>,
    ) -> Result<Vec<ReviewRecord>, ExportError> {
        let mut collector = FilterCap::new(window, now.naive_utc());
        if collector.is_full() {
            return Ok(Vec::new());
        }

        let query = ReviewQuery {
            app_id: app_id.clone(),
            language: self.params.language.clone(),
            region: self.params.region.clone(),
            sort: SortOrder::Newest,
            page_size: self.params.page_size,
        };

        let mut token: Option<String> = None;
        let mut pages = 0;

        'pages: while pages < self.params.max_pages {
            let page = source.fetch_page(&query, token.as_deref()).await?;
            pages += 1;

            for raw in &page.records {
                if collector.offer(ReviewRecord::from_value(raw)) == Flow::Full {
                    break 'pages;
                }
            }

            match page.next_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        let (records, stats) = collector.finish();

        tracing::debug!(
            "Collected {} of {} reviews for {} over {} pages ({} too old, {} undated, {} malformed)",
            stats.accepted,
            stats.seen,
            app_id,
            pages,
            stats.out_of_window,
            stats.missing_timestamp,
            stats.malformed
        );

        Ok(records)
    }
}
