use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gridsource::*;

const REGIONS: [&str; 4] = ["north", "south", "east", "west"];

fn make_records(size: usize) -> Vec<Record> {
    (0..size)
        .map(|i| {
            Record::object([
                ("id", Value::from(i as i64)),
                ("region", Value::from(REGIONS[i % REGIONS.len()])),
                ("amount", Value::from(((i * 7919) % 1000) as f64 * 1.5)),
                ("name", Value::from(format!("customer-{}", (i * 31) % size))),
            ])
        })
        .collect()
}

fn bench_multi_key_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("multi_key_sort");

    for size in [100, 1000, 10000].iter() {
        let source = DataSource::new(make_records(*size));
        let keys = vec![SortKey::ascending("region"), SortKey::descending("amount")];

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let mut rows = source.data().to_vec();
                sort::sort_records(&mut rows, black_box(&keys));
                rows
            });
        });
    }
    group.finish();
}

fn bench_filter_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_chain");

    for size in [100, 1000, 10000].iter() {
        let source = DataSource::new(make_records(*size));
        let clauses = vec![
            FilterClause::new(ComparisonOp::GreaterThan, 200).and(),
            FilterClause::new(ComparisonOp::LessOrEqual, 900),
        ];

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| filter::filter_records(source.data(), black_box(&clauses), "amount", false));
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    for size in [100, 1000, 10000].iter() {
        let source = DataSource::new(make_records(*size));

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| search_records(source.data(), black_box("ER-1"), false));
        });
    }
    group.finish();
}

fn bench_view_recompute(c: &mut Criterion) {
    let mut group = c.benchmark_group("view_recompute");

    for size in [100, 1000, 10000].iter() {
        let mut source = DataSource::new(make_records(*size));
        source.add_sort_key(SortKey::descending("amount"), false);
        source.add_filter("region", vec![FilterClause::new(ComparisonOp::NotEqual, "east")], false);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| source.apply_filters().len());
        });
    }
    group.finish();
}

fn bench_grouped_page(c: &mut Criterion) {
    let mut group = c.benchmark_group("grouped_page");

    for size in [100, 1000, 10000].iter() {
        let mut source = DataSource::new(make_records(*size));
        source.add_sort_key(SortKey::ascending("id"), true);
        source.group_by_field("region", None, false);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| source.page(black_box(size / DEFAULT_PAGE_SIZE / 2)));
        });
    }
    group.finish();
}

fn bench_group_whole_view(c: &mut Criterion) {
    let mut group = c.benchmark_group("group_whole_view");

    for size in [100, 1000, 10000].iter() {
        let mut source = DataSource::new(make_records(*size));
        source.group_by_field("region", None, false);
        source.group_by_field("amount", None, false);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| source.group_data(None));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_multi_key_sort,
    bench_filter_chain,
    bench_search,
    bench_view_recompute,
    bench_grouped_page,
    bench_group_whole_view
);
criterion_main!(benches);
