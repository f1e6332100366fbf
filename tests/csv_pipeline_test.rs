// ==========================================
// 样例数据 → CSV → SQLite 全链路测试
// ==========================================
// 测试目标:
// - 生成器输出可被导入器完整导入
// - CSV 直读与 SQLite 读取得到同一份报表
// - 生成数据的支付全部对平
// ==========================================

use sales_trend::api::ReportApi;
use sales_trend::domain::types::PaymentCheckStatus;
use sales_trend::importer::{CsvImporter, SampleDataConfig, SampleDataGenerator};
use sales_trend::repository::SalesRepository;
use std::fs;
use tempfile::TempDir;

fn generate(dir: &TempDir) -> SampleDataConfig {
    let config = SampleDataConfig {
        orders: 120,
        ..SampleDataConfig::default()
    };
    SampleDataGenerator::new(config.clone())
        .unwrap()
        .write_csv(dir.path())
        .unwrap();
    config
}

#[test]
fn test_generate_import_and_report() {
    let dir = TempDir::new().unwrap();
    let config = generate(&dir);
    let db_path = dir.path().join("ecommerce.db");
    let db_path = db_path.to_str().unwrap();

    let summary = CsvImporter::new(dir.path()).import_into(db_path).unwrap();
    assert_eq!(summary.table_rows.customers, config.customers);
    assert_eq!(summary.table_rows.products, config.products);
    assert_eq!(summary.table_rows.orders, 120);
    assert_eq!(summary.table_rows.payments, 120);
    assert!(summary.table_rows.order_items >= 120);

    let report = ReportApi::open_database(db_path).unwrap().generate_report().unwrap();
    assert!(!report.rows.is_empty());
    assert!(report.rows.len() <= 24);
    assert!(report.rows.first().unwrap().month.as_str() >= "2006-01");
    assert!(report.rows.last().unwrap().month.as_str() <= "2007-12");
    assert!(report.skipped_rows.is_empty());

    let orders: usize = report.rows.iter().map(|r| r.order_count).sum();
    assert_eq!(orders, 120);

    // 每行数值均为有限值
    for row in &report.rows {
        assert!(row.monthly_revenue.is_finite() && row.monthly_revenue > 0.0);
        assert!(row.forecast_next_month.is_finite());
        assert!(row.percent_change.map_or(true, f64::is_finite));
    }
}

#[test]
fn test_csv_source_matches_database_source() {
    let dir = TempDir::new().unwrap();
    generate(&dir);
    let db_path = dir.path().join("ecommerce.db");
    let db_path = db_path.to_str().unwrap();
    CsvImporter::new(dir.path()).import_into(db_path).unwrap();

    let from_db = ReportApi::open_database(db_path).unwrap().generate_report().unwrap();
    let from_csv = ReportApi::open_csv_dir(dir.path()).unwrap().generate_report().unwrap();

    assert_eq!(from_db.rows, from_csv.rows);
    assert_eq!(from_db.summary, from_csv.summary);
    assert_eq!(from_db.forecast, from_csv.forecast);
}

#[test]
fn test_generated_payments_reconcile() {
    let dir = TempDir::new().unwrap();
    generate(&dir);

    let recon = ReportApi::open_csv_dir(dir.path())
        .unwrap()
        .reconcile_payments()
        .unwrap();

    assert_eq!(recon.total_orders, 120);
    assert_eq!(recon.mismatching, 0);
    assert!(recon.orders_without_payment.is_empty());
    assert!(recon.orphan_payments.is_empty());
    assert!(recon.checks.iter().all(|c| c.status == PaymentCheckStatus::Match));
    assert_eq!(recon.match_rate(), 100.0);
}

#[test]
fn test_imported_dates_are_iso() {
    let dir = TempDir::new().unwrap();
    generate(&dir);
    let raw_orders = fs::read_to_string(dir.path().join("orders.csv")).unwrap();
    assert!(raw_orders.lines().nth(1).unwrap().contains('/'));

    let db_path = dir.path().join("ecommerce.db");
    CsvImporter::new(dir.path())
        .import_into(db_path.to_str().unwrap())
        .unwrap();

    let repo = SalesRepository::new(db_path.to_str().unwrap()).unwrap();
    let facts = repo.find_order_line_facts().unwrap();
    for fact in facts {
        let date = fact.order_date.unwrap();
        assert_eq!(date.len(), 10);
        assert_eq!(&date[4..5], "-");
    }
}
