use crate::services::review_source::{ReviewPage, ReviewQuery, ReviewSource, SourceError};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::json;

const SAMPLES: [(&str, i64, &str, &str); 5] = [
    (
        "Анна Петрова",
        5,
        "Отличное приложение!",
        "Очень удобно, все функции работают прекрасно. Пользуюсь каждый день.",
    ),
    (
        "Иван Сидоров",
        4,
        "Хорошо, но есть недостатки",
        "В целом нравится, но иногда приложение зависает. Добавьте темную тему.",
    ),
    (
        "Мария Иванова",
        5,
        "Лучшее в своем роде",
        "Пользуюсь уже год, никаких нареканий. Разработчики молодцы!",
    ),
    (
        "Алексей Козлов",
        3,
        "Средненько",
        "Есть более удобные аналоги. Интерфейс немного устаревший.",
    ),
    (
        "Ольга Смирнова",
        5,
        "Супер!",
        "Всё работает отлично, обновления регулярные. Рекомендую!",
    ),
];

/// Offline source returning a fixed set of sample reviews, two days apart
#[derive(Debug, Clone, Default)]
pub struct DemoReviewSource;

impl DemoReviewSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ReviewSource for DemoReviewSource {
    fn name(&self) -> &'static str {
        "demo"
    }

    async fn fetch_page(
        &self,
        query: &ReviewQuery,
        _token: Option<&str>,
    ) -> Result<ReviewPage, SourceError> {
        let now = Utc::now();
        let records = SAMPLES
            .iter()
            .enumerate()
            .map(|(i, (user, score, title, content))| {
                json!({
                    "userName": user,
                    "score": score,
                    "title": title,
                    "content": content,
                    "at": (now - Duration::days(i as i64 * 2)).to_rfc3339(),
                    "country": query.region.to_uppercase(),
                    "lang": query.language,
                })
            })
            .collect();

        Ok(ReviewPage {
            records,
            next_token: None,
        })
    }
}
