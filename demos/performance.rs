/// Performance Example
///
/// This example demonstrates:
/// - Cost of view recomputation as sort keys and filters stack up
/// - Grouping a page versus grouping the whole view
/// - Search over a large collection

use gridsource::{ComparisonOp, DataSource, FilterClause, Record, SortKey, Value};
use std::time::Instant;

fn main() {
    env_logger::init();

    println!("=== GridSource Performance Example ===\n");

    let n = 100_000;
    let cities = ["Oslo", "Bergen", "Trondheim", "Stavanger", "Tromso"];

    let start = Instant::now();
    let records: Vec<Record> = (0..n)
        .map(|i| {
            Record::object([
                ("id", Value::from(i as i64)),
                ("city", Value::from(cities[i % cities.len()])),
                ("score", Value::from(((i * 7919) % 10_000) as f64 / 100.0)),
                ("label", Value::from(format!("item-{:06}", (i * 31) % n))),
            ])
        })
        .collect();
    let mut source = DataSource::new(records);
    println!("1. Loading {} records: {:?}\n", n, start.elapsed());

    println!("2. Sorting");
    let start = Instant::now();
    source.add_sort_key(SortKey::descending("score"), true);
    println!("   One key: {:?}", start.elapsed());

    let start = Instant::now();
    source.add_sort_key(SortKey::ascending("city"), true);
    println!("   Two keys: {:?}\n", start.elapsed());

    println!("3. Filtering");
    let start = Instant::now();
    source.add_filter("score", vec![FilterClause::new(ComparisonOp::GreaterThan, 50)], true);
    println!("   score > 50 ({} rows): {:?}", source.len(), start.elapsed());

    let start = Instant::now();
    source.add_filter("city", vec![FilterClause::new(ComparisonOp::StartsWith, "t")], true);
    println!("   city starts with 't' ({} rows): {:?}\n", source.len(), start.elapsed());

    println!("4. Grouping");
    source.group_by_field("city", None, false);
    let start = Instant::now();
    let page = source.page(10);
    println!("   One page ({} rows): {:?}", page.records().len(), start.elapsed());

    let start = Instant::now();
    let all = source.group_data(None);
    println!("   Whole view ({} rows): {:?}\n", all.records().len(), start.elapsed());

    println!("5. Search");
    let start = Instant::now();
    let hits = source.search("item-0001", None, false).len();
    println!("   'item-0001' ({} hits): {:?}\n", hits, start.elapsed());

    println!("=== Example Complete ===");
}
