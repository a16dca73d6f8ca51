//! Highlight heuristic benchmarks.
//!
//! Measures both tiers and extraction on generated quiz pages:
//! - Question counts: 10, 100, 500
//!
//! Run with: cargo bench --bench highlight
//! Results saved to: target/criterion/

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use mcq_overlay::page::{El, Highlighter, StaticDocument, extract};
use mcq_overlay::protocol::RadioGrouping;

// ============================================================================
// Benchmark Parameters
// ============================================================================

const QUESTION_COUNTS: &[usize] = &[10, 100, 500];

const LETTERS: [&str; 4] = ["A", "B", "C", "D"];

// ============================================================================
// Fixtures
// ============================================================================

fn radio_page(questions: usize) -> StaticDocument {
    StaticDocument::new("https://example.com/radios", "Radios").with_body((0..questions).map(
        |q| {
            El::new("fieldset")
                .child(El::new("legend").text(format!("{}) Question number {q}", q + 1)))
                .children(LETTERS.iter().map(|letter| {
                    El::new("label")
                        .child(El::radio(format!("q{q}"), *letter))
                        .text(format!("Answer {letter} for {q}"))
                }))
        },
    ))
}

fn text_page(questions: usize) -> StaticDocument {
    StaticDocument::new("https://example.com/text", "Text").with_body((0..questions).map(|q| {
        El::new("div")
            .child(El::new("p").text(format!("{}) Question number {q}", q + 1)))
            .children(
                LETTERS
                    .iter()
                    .map(|letter| El::new("li").text(format!("{letter}) option {q}"))),
            )
    }))
}

// ============================================================================
// Benchmark: Structural Tier
// ============================================================================

fn bench_structural(c: &mut Criterion) {
    let highlighter = Highlighter::new(RadioGrouping::default());
    let mut group = c.benchmark_group("highlight_structural");

    for &count in QUESTION_COUNTS {
        let mut doc = radio_page(count);
        group.bench_with_input(BenchmarkId::new("last_question", count), &count, |b, &n| {
            b.iter(|| highlighter.highlight(&mut doc, black_box(n - 1), black_box(2)));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Textual Tier
// ============================================================================

fn bench_textual(c: &mut Criterion) {
    let highlighter = Highlighter::new(RadioGrouping::default());
    let mut group = c.benchmark_group("highlight_textual");

    for &count in QUESTION_COUNTS {
        let mut doc = text_page(count);
        group.bench_with_input(BenchmarkId::new("option_b", count), &count, |b, _| {
            b.iter(|| highlighter.highlight(&mut doc, black_box(0), black_box(1)));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Extraction
// ============================================================================

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");

    for &count in QUESTION_COUNTS {
        let doc = radio_page(count);
        group.bench_with_input(BenchmarkId::new("radio_page", count), &doc, |b, doc| {
            b.iter(|| extract(black_box(doc)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_structural, bench_textual, bench_extract);
criterion_main!(benches);
