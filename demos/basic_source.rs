/// Basic Data Source Example
///
/// This example demonstrates:
/// - Loading records from JSON
/// - Multi-key sorting with primers
/// - Registered filters and ad-hoc search
/// - Grouping the view by a field

use gridsource::{primers, ComparisonOp, DataSource, FilterClause, SortKey, ViewSlice};

const EMPLOYEES: &str = r#"[
    {"name": "Alice",  "dept": "Engineering", "salary": 120000, "hired": "2019-04-01"},
    {"name": "bob",    "dept": "Sales",       "salary": 70000,  "hired": "2021-09-13"},
    {"name": "Carol",  "dept": "Engineering", "salary": 135000, "hired": "2016-01-11"},
    {"name": "dave",   "dept": "Support",     "salary": 58000,  "hired": "2022-02-28"},
    {"name": "Erin",   "dept": "Sales",       "salary": 82000,  "hired": "2018-07-23"},
    {"name": "Frank",  "dept": "Engineering", "salary": 99000,  "hired": "2023-05-02"}
]"#;

fn print_rows(source: &DataSource) {
    for record in source.current_view() {
        println!(
            "   {:<6} {:<12} {:>7} {}",
            record.field_value("name"),
            record.field_value("dept"),
            record.field_value("salary"),
            record.field_value("hired")
        );
    }
    println!();
}

fn main() -> gridsource::Result<()> {
    env_logger::init();

    println!("=== GridSource Basic Example ===\n");

    // 1. Load data
    println!("1. Loading records...");
    let mut source = DataSource::default();
    source.set_data_json(EMPLOYEES)?;
    println!("   Loaded {} records\n", source.len());

    // 2. Sort by department, then salary descending
    println!("2. Sorting by dept, then salary (descending)...");
    source.add_sort_key(SortKey::ascending("dept"), false);
    source.add_sort_key(SortKey::descending("salary"), true);
    print_rows(&source);

    // 3. Sort by hire date, case-insensitive name as tie breaker
    println!("3. Re-sorting by hire date...");
    source.sort(
        Some(vec![
            SortKey::ascending("hired").with_primer(primers::date),
            SortKey::ascending("name").with_primer(primers::lowercase),
        ]),
        None,
    );
    print_rows(&source);

    // 4. Filter on salary range
    println!("4. Filtering salary between 60000 and 125000...");
    source.add_filter(
        "salary",
        vec![
            FilterClause::new(ComparisonOp::GreaterOrEqual, 60000).and(),
            FilterClause::new(ComparisonOp::LessOrEqual, 125000),
        ],
        true,
    );
    print_rows(&source);

    // 5. Free-text search over the filtered view
    println!("5. Searching for 'eng'...");
    source.search("eng", None, false);
    print_rows(&source);

    // 6. Group by department
    println!("6. Grouping by dept...");
    source.clear_filters();
    if let Some(ViewSlice::Grouped(groups)) = source.group_by_field("dept", None, true) {
        for group in &groups {
            println!("   {} ({} records)", group.key, group.values.len());
        }
    }
    println!();

    println!("=== Example Complete ===");
    Ok(())
}
