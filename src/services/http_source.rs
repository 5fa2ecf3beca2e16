use crate::services::review_source::{ReviewPage, ReviewQuery, ReviewSource, SourceError};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;

/// Review feed client
///
/// Talks to a review-feed service exposing
/// `GET {endpoint}/reviews?id=&lang=&country=&sort=&count=&token=` and
/// answering `{ "data": [...], "nextPaginationToken": "..." }`.
pub struct HttpReviewSource {
    base_url: String,
    client: Client,
}

impl HttpReviewSource {
    /// Create a new feed client
    pub fn new(endpoint: &str, timeout_secs: u64) -> Result<Self, SourceError> {
        let parsed = Url::parse(endpoint)
            .map_err(|e| SourceError::Unavailable(format!("invalid endpoint '{}': {}", endpoint, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SourceError::Unavailable(format!(
                "unsupported endpoint scheme '{}'",
                parsed.scheme()
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SourceError::Unavailable(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn page_url(&self, query: &ReviewQuery, token: Option<&str>) -> String {
        let mut url = format!(
            "{}/reviews?id={}&lang={}&country={}&sort={}&count={}",
            self.base_url,
            urlencoding::encode(query.app_id.as_str()),
            urlencoding::encode(&query.language),
            urlencoding::encode(&query.region),
            query.sort.as_str(),
            query.page_size,
        );
        if let Some(token) = token {
            url.push_str("&token=");
            url.push_str(&urlencoding::encode(token));
        }
        url
    }
}

/// Pull a human-readable message out of an error body
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            ["message", "error", "detail"]
                .iter()
                .find_map(|k| json.get(*k).and_then(|v| v.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string())
}

fn parse_page(json: Value) -> Result<ReviewPage, SourceError> {
    if let Some(message) = json.get("error").and_then(|e| e.as_str()) {
        return Err(SourceError::classify_message(message));
    }

    let next_token = ["nextPaginationToken", "next_token", "nextToken"]
        .iter()
        .find_map(|k| json.get(*k).and_then(|v| v.as_str()))
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    let records = match json {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("data").or_else(|| obj.remove("reviews")) {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => Vec::new(),
            Some(_) => {
                return Err(SourceError::Other("review list is not an array".to_string()));
            }
        },
        _ => return Err(SourceError::Other("unexpected response shape".to_string())),
    };

    Ok(ReviewPage { records, next_token })
}

#[async_trait]
impl ReviewSource for HttpReviewSource {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch_page(
        &self,
        query: &ReviewQuery,
        token: Option<&str>,
    ) -> Result<ReviewPage, SourceError> {
        let url = self.page_url(query, token);

        tracing::debug!("Fetching reviews page from: {}", url);

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            let message = error_message(&body);
            tracing::warn!("Review feed returned {} for {}: {}", status, query.app_id, message);
            return Err(SourceError::from_status(status.as_u16(), &message));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| SourceError::Other(format!("invalid response body: {}", e)))?;

        let page = parse_page(json)?;

        tracing::debug!(
            "Received {} reviews for {} (more: {})",
            page.records.len(),
            query.app_id,
            page.next_token.is_some()
        );

        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejects_invalid_endpoint() {
        assert!(matches!(
            HttpReviewSource::new("not a url", 5),
            Err(SourceError::Unavailable(_))
        ));
        assert!(matches!(
            HttpReviewSource::new("ftp://feed.test", 5),
            Err(SourceError::Unavailable(_))
        ));
    }

    #[test]
    fn test_client_creation() {
        let source = HttpReviewSource::new("https://feed.test/v1/", 5).unwrap();
        assert_eq!(source.base_url(), "https://feed.test/v1");
    }

    #[test]
    fn test_parse_page_shapes() {
        let page = parse_page(json!({ "data": [{ "userName": "a" }], "nextPaginationToken": "t1" })).unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.next_token.as_deref(), Some("t1"));

        let page = parse_page(json!([{ "userName": "a" }, { "userName": "b" }])).unwrap();
        assert_eq!(page.records.len(), 2);
        assert!(page.next_token.is_none());

        let page = parse_page(json!({ "data": null, "nextPaginationToken": "" })).unwrap();
        assert!(page.records.is_empty());
        assert!(page.next_token.is_none());
    }

    #[test]
    fn test_parse_page_error_field() {
        assert!(matches!(
            parse_page(json!({ "error": "App not found" })),
            Err(SourceError::NotFound(_))
        ));
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(r#"{"message":"denied"}"#), "denied");
        assert_eq!(error_message("  plain text "), "plain text");
    }
}
