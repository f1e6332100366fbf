// 把 CSV 目录导入 SQLite（建表 + INSERT OR REPLACE，单事务）
//
// Usage:
//   cargo run --bin import_sample_data -- [csv_dir] [db_path]

use sales_trend::db::DEFAULT_DB_FILE;
use sales_trend::importer::CsvImporter;
use sales_trend::logging;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let csv_dir = args.next().unwrap_or_else(|| ".".to_string());
    let db_path = args.next().unwrap_or_else(|| DEFAULT_DB_FILE.to_string());

    println!("开始导入 {} -> {}", csv_dir, db_path);
    let summary = CsvImporter::new(&csv_dir).import_into(&db_path)?;

    println!("{}", "=".repeat(50));
    println!("导入完成（{} ms）", summary.elapsed_ms);
    println!("{}", "=".repeat(50));
    println!("Customers:   {}", summary.table_rows.customers);
    println!("Products:    {}", summary.table_rows.products);
    println!("Orders:      {}", summary.table_rows.orders);
    println!("Order Items: {}", summary.table_rows.order_items);
    println!("Payments:    {}", summary.table_rows.payments);
    println!("\n数据库: {}", summary.db_path);
    Ok(())
}
