//! Benchmarks for enjambre core operations.
//!
//! Run with: cargo bench
//!
//! Results include 95% confidence intervals via Criterion.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use enjambre::core::call::request_to_expr;
use enjambre::core::request::{Header, HttpMethod, QueryPair, Request};
use enjambre::core::task::{LegacyTask, Task};
use enjambre::locust::render_locustfile;

fn make_request(index: usize) -> Request {
    Request {
        timestamp: chrono::DateTime::parse_from_rfc3339("2024-03-01T10:00:00+00:00").unwrap()
            + chrono::Duration::seconds(index as i64),
        method: HttpMethod::Post,
        url: url::Url::parse(&format!("https://example.com/items/{}", index)).unwrap(),
        headers: vec![
            Header {
                name: "Accept".to_string(),
                value: "application/json".to_string(),
            },
            Header {
                name: "X-Request-Id".to_string(),
                value: format!("r-{}", index),
            },
        ],
        post_data: Some(serde_json::json!({
            "mimeType": "application/json",
            "text": "{\"item\": \"widget\", \"qty\": 3}"
        })),
        query: vec![QueryPair {
            name: "page".to_string(),
            value: "2".to_string(),
        }],
    }
}

fn bench_build_call(c: &mut Criterion) {
    let request = make_request(0);
    c.bench_function("build_call_post_json", |b| {
        b.iter(|| {
            let call = request_to_expr(black_box(&request)).unwrap();
            black_box(call);
        });
    });
}

fn bench_render_locustfile(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_locustfile");
    for size in [1usize, 16, 128] {
        let requests: Vec<Request> = (0..size).map(make_request).collect();
        let legacy = LegacyTask::from_requests(requests, |_| false);
        let tasks: Vec<Task> = legacy.iter().map(Task::from_legacy).collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), &tasks, |b, tasks| {
            b.iter(|| {
                let script = render_locustfile(black_box(tasks)).unwrap();
                black_box(script);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build_call, bench_render_locustfile);
criterion_main!(benches);
