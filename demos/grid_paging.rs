/// Grid Paging Example
///
/// This example demonstrates:
/// - Configuring page size from JSON
/// - Change hooks
/// - Paging a grouped view
/// - Serializing a page for a grid client

use gridsource::{DataSource, DataSourceConfig, DataSourceHooks, Record, SortKey, Value};

fn main() -> gridsource::Result<()> {
    env_logger::init();

    println!("=== GridSource Paging Example ===\n");

    let config = DataSourceConfig::from_json(r#"{"pageSize": 4}"#)?;
    let hooks = DataSourceHooks::new()
        .on_change(|| println!("   [hook] data replaced"))
        .on_sort(|keys| {
            let fields: Vec<&str> = keys.iter().map(|k| k.field.as_str()).collect();
            println!("   [hook] sort keys now {:?}", fields);
        })
        .on_group(|keys| println!("   [hook] {} grouping level(s)", keys.len()));

    let mut source = DataSource::with_config(Vec::new(), config, hooks)?;

    // 1. Load generated orders
    println!("1. Loading orders...");
    let statuses = ["open", "shipped", "returned"];
    let orders = (1..=10)
        .map(|i| {
            Record::object([
                ("order", Value::from(i)),
                ("status", Value::from(statuses[i as usize % statuses.len()])),
                ("total", Value::from(i as f64 * 12.5)),
            ])
        })
        .collect();
    source.set_data(orders);
    println!("   {} orders, {} pages\n", source.len(), source.page_count());

    // 2. Sort and group
    println!("2. Sorting by total (descending) and grouping by status...");
    source.add_sort_key(SortKey::descending("total"), true);
    source.group_by_field("status", None, false);
    println!();

    // 3. Walk the pages
    println!("3. Pages:");
    for index in 0..source.page_count() {
        let page = source.page(index);
        println!("   page {}: {}", index, page.to_json()?);
    }
    println!();

    // 4. A window that straddles pages
    println!("4. Rows 2..=5:");
    for record in source.range(2, 5).records() {
        println!("   order {} ({})", record.field_value("order"), record.field_value("status"));
    }
    println!();

    println!("=== Example Complete ===");
    Ok(())
}
