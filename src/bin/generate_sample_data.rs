// 生成样例电商数据（五个 CSV）
//
// Usage:
//   cargo run --bin generate_sample_data -- [output_dir] [orders] [seed]

use sales_trend::importer::{SampleDataConfig, SampleDataGenerator};
use sales_trend::logging;
use std::error::Error;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let output_dir = PathBuf::from(args.next().unwrap_or_else(|| ".".to_string()));

    let mut config = SampleDataConfig::default();
    if let Some(orders) = args.next() {
        config.orders = orders.parse().map_err(|_| format!("无效的订单数: {}", orders))?;
    }
    if let Some(seed) = args.next() {
        config.seed = seed.parse().map_err(|_| format!("无效的 seed: {}", seed))?;
    }

    println!("开始生成样例数据 -> {}", output_dir.display());
    let counts = SampleDataGenerator::new(config)?.write_csv(&output_dir)?;

    println!("- customers.csv: {} records", counts.customers);
    println!("- products.csv: {} records", counts.products);
    println!("- orders.csv: {} records", counts.orders);
    println!("- order_items.csv: {} records", counts.order_items);
    println!("- payments.csv: {} records", counts.payments);
    Ok(())
}
