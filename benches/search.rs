//! Benchmarks for offset resolution on large unit lists.

use braillemap::prelude::*;
use criterion::{Criterion, black_box, criterion_group, criterion_main};

/// Alternating words and single spaces, with a print page every 200 units.
fn build_list(words: usize) -> UnitList {
    let mut list = UnitList::new();
    let mut text = 0;
    let mut braille = 0;
    for i in 0..words {
        let node = NodeId(u32::try_from(i).unwrap_or(u32::MAX));
        if i % 200 == 0 {
            list.push(
                Unit::new(UnitKind::PageBoundary { kind: PageKind::Print }, node)
                    .with_text(text, text)
                    .with_braille([Span::new(braille, braille + 3)]),
            );
            braille += 3;
        }
        list.push(
            Unit::new(UnitKind::Content, node)
                .with_text(text, text + 6)
                .with_braille([Span::new(braille, braille + 7)]),
        );
        list.push(
            Unit::new(UnitKind::Whitespace, node)
                .with_text(text + 6, text + 7)
                .with_braille([Span::new(braille + 7, braille + 8)]),
        );
        text += 7;
        braille += 8;
    }
    list
}

fn bench_text_search(c: &mut Criterion) {
    let list = build_list(50_000);
    c.bench_function("find_closest_by_text_50k", |b| {
        b.iter(|| list.find_closest_by_text(black_box(123_457), None).unwrap())
    });
}

fn bench_braille_search(c: &mut Criterion) {
    let list = build_list(50_000);
    c.bench_function("find_closest_by_braille_50k", |b| {
        b.iter(|| list.find_closest_by_braille(black_box(141_093), None).unwrap())
    });
}

fn bench_selected_range(c: &mut Criterion) {
    let list = build_list(5_000);
    c.bench_function("units_in_selected_range_5k", |b| {
        b.iter(|| list.units_in_selected_range(black_box(0), black_box(35_000)).unwrap())
    });
}

criterion_group!(benches, bench_text_search, bench_braille_search, bench_selected_range);
criterion_main!(benches);
