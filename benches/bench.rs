// Criterion benchmarks for the review export pipeline

use chrono::{Duration, NaiveDate, NaiveDateTime};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use review_export::core::{collect, encode, extract, Sanitizer};
use review_export::models::{FilterWindow, RecordError, ReviewRecord};

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 15).unwrap().and_hms_opt(0, 0, 0).unwrap()
}

fn create_record(i: usize) -> Result<ReviewRecord, RecordError> {
    Ok(ReviewRecord {
        user_name: Some(format!("User {}", i)),
        at: Some(now() - Duration::hours(i as i64 * 7)),
        score: Some((i % 5) as i64 + 1),
        title: Some("Хорошо, но есть недостатки".to_string()),
        content: Some("В целом нравится,\nно иногда приложение \"зависает\". ".repeat(8)),
    })
}

fn bench_extract(c: &mut Criterion) {
    c.bench_function("extract_listing_url", |b| {
        b.iter(|| extract(black_box("https://play.google.com/store/apps/details?id=com.whatsapp&hl=ru")));
    });

    c.bench_function("extract_path_fallback", |b| {
        b.iter(|| extract(black_box("https://apps.example.com/android/com.spotify.music?ref=home")));
    });
}

fn bench_collect(c: &mut Criterion) {
    let mut group = c.benchmark_group("collect");

    for record_count in [100, 1000, 5000].iter() {
        let records: Vec<_> = (0..*record_count).map(create_record).collect();

        group.bench_with_input(
            BenchmarkId::new("filter_cap", record_count),
            record_count,
            |b, _| {
                b.iter(|| collect(black_box(records.clone()), FilterWindow::new(365, 1000), now()));
            },
        );
    }

    group.finish();
}

fn bench_export(c: &mut Criterion) {
    let app_id = extract("com.whatsapp").unwrap();
    let sanitizer = Sanitizer::default();
    let records: Vec<ReviewRecord> = (0..500).filter_map(|i| create_record(i).ok()).collect();

    c.bench_function("sanitize_and_encode_500_reviews", |b| {
        b.iter(|| {
            let rows = sanitizer.sanitize_all(&app_id, black_box(&records));
            black_box(encode(&rows))
        });
    });
}

criterion_group!(benches, bench_extract, bench_collect, bench_export);

criterion_main!(benches);
