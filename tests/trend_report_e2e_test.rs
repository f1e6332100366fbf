// ==========================================
// 月度趋势报表端到端测试（SQLite 数据源）
// ==========================================
// 测试目标: 建库 → 写入订单 → ReportApi 生成报表
// ==========================================

mod test_helpers;

use sales_trend::api::{ApiError, ReportApi};
use sales_trend::config::{config_keys, ConfigOverrides};
use sales_trend::domain::report::TrendDirection;
use sales_trend::domain::trend::SkipReason;
use sales_trend::domain::types::{BaselinePolicy, ForecastEstimator, PercentSurfacing};
use test_helpers::{create_test_db, insert_order, open_test_connection, seed_monthly_revenue, set_config};

const SERIES: &[(&str, f64)] = &[
    ("2006-01", 100.0),
    ("2006-02", 150.0),
    ("2006-03", 120.0),
    ("2006-04", 180.0),
];

#[test]
fn test_four_month_series_default_config() {
    let (_tmp, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).unwrap();
    seed_monthly_revenue(&conn, 1, SERIES).unwrap();

    let api = ReportApi::open_database(&db_path).unwrap();
    let report = api.generate_report().unwrap();

    assert_eq!(report.rows.len(), 4);
    let revenues: Vec<f64> = report.rows.iter().map(|r| r.monthly_revenue).collect();
    assert_eq!(revenues, vec![100.0, 150.0, 120.0, 180.0]);

    // 默认基期口径: 首月变化 = 首月收入
    let changes: Vec<f64> = report.rows.iter().map(|r| r.revenue_change).collect();
    assert_eq!(changes, vec![100.0, 50.0, -30.0, 60.0]);
    assert_eq!(report.rows[0].percent_change, Some(0.0));
    assert_eq!(report.rows[1].percent_change, Some(50.0));
    assert_eq!(report.rows[2].percent_change, Some(-20.0));

    assert_eq!(report.rows[0].moving_avg_3, 100.0);
    assert_eq!(report.rows[1].moving_avg_3, 125.0);
    assert_eq!(report.rows[3].moving_avg_3, 150.0);

    // 累计平均变化 ≠ 两点斜率
    assert_eq!(report.rows[3].avg_change_to_date, 45.0);
    assert_eq!(report.rows[3].estimated_slope, Some(26.67));
    assert_eq!(report.rows[0].estimated_slope, None);
    assert_eq!(report.rows[3].forecast_next_month, 225.0);

    let sequence_years: Vec<(i32, u32)> = report.rows.iter().map(|r| (r.year, r.month_num)).collect();
    assert_eq!(sequence_years, vec![(2006, 1), (2006, 2), (2006, 3), (2006, 4)]);

    assert_eq!(report.overall_trend.direction, TrendDirection::Positive);
    assert_eq!(report.forecast.len(), 3);
    assert_eq!(report.forecast[2].month, "2006-07");
}

#[test]
fn test_stored_config_is_applied_and_overridable() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    seed_monthly_revenue(&conn, 1, SERIES).unwrap();
    set_config(&conn, config_keys::BASELINE_POLICY, "none").unwrap();
    set_config(&conn, config_keys::LABEL_STYLE, "arrow").unwrap();
    set_config(&conn, config_keys::PERCENT_SURFACING, "null").unwrap();

    let mut api = ReportApi::open_database(&db_path).unwrap();
    assert_eq!(api.config().baseline_policy, BaselinePolicy::None);
    assert_eq!(api.config().percent_surfacing, PercentSurfacing::Null);

    let cumulative = api.generate_report().unwrap();
    assert_eq!(cumulative.rows[0].trend, "N/A");
    assert_eq!(cumulative.rows[1].trend, "↑ Growing");
    assert_eq!(cumulative.rows[2].trend, "↓ Declining");
    assert_eq!(cumulative.rows[0].percent_change, None);
    assert_eq!(cumulative.rows[0].forecast_next_month, 100.0);

    api.apply_overrides(&ConfigOverrides {
        forecast_estimator: Some(ForecastEstimator::Global),
        ..Default::default()
    });
    let global = api.generate_report().unwrap();

    // 差值不同，两种估计器给出不同预测
    assert_eq!(global.rows[0].forecast_next_month, 126.67);
    assert_ne!(
        global.rows[1].forecast_next_month,
        cumulative.rows[1].forecast_next_month
    );
}

#[test]
fn test_order_count_is_distinct_orders() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    insert_order(&conn, 1, "2006-05-02", &[(1, 10.0), (2, 5.0), (1, 3.5)]).unwrap();
    insert_order(&conn, 2, "2006-05-20", &[(4, 2.5)]).unwrap();

    let report = ReportApi::open_database(&db_path)
        .unwrap()
        .generate_report()
        .unwrap();

    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].order_count, 2);
    assert_eq!(report.rows[0].monthly_revenue, 33.5);
}

#[test]
fn test_insertion_order_does_not_change_report() {
    let (_tmp_a, db_a) = create_test_db().unwrap();
    let (_tmp_b, db_b) = create_test_db().unwrap();

    let conn_a = open_test_connection(&db_a).unwrap();
    seed_monthly_revenue(&conn_a, 1, SERIES).unwrap();

    let mut reversed: Vec<(&str, f64)> = SERIES.to_vec();
    reversed.reverse();
    let conn_b = open_test_connection(&db_b).unwrap();
    seed_monthly_revenue(&conn_b, 100, &reversed).unwrap();

    let report_a = ReportApi::open_database(&db_a).unwrap().generate_report().unwrap();
    let report_b = ReportApi::open_database(&db_b).unwrap().generate_report().unwrap();
    assert_eq!(report_a.rows, report_b.rows);
    assert_eq!(report_a.summary, report_b.summary);
}

#[test]
fn test_year_boundary_and_gap_months() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    seed_monthly_revenue(
        &conn,
        1,
        &[("2007-01", 300.0), ("2006-12", 200.0), ("2006-09", 100.0)],
    )
    .unwrap();

    let report = ReportApi::open_database(&db_path).unwrap().generate_report().unwrap();
    let months: Vec<&str> = report.rows.iter().map(|r| r.month.as_str()).collect();
    // 缺失月份不补零，序号连续
    assert_eq!(months, vec!["2006-09", "2006-12", "2007-01"]);
    assert_eq!(report.rows[1].previous_month_revenue, 100.0);
}

#[test]
fn test_malformed_dates_are_skipped() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    seed_monthly_revenue(&conn, 1, &SERIES[..2]).unwrap();
    insert_order(&conn, 50, "someday", &[(1, 999.0)]).unwrap();

    let report = ReportApi::open_database(&db_path).unwrap().generate_report().unwrap();
    assert_eq!(report.rows.len(), 2);
    assert_eq!(report.skipped_rows.len(), 1);
    assert_eq!(report.skipped_rows[0].order_id, 50);
    assert_eq!(report.summary.total_revenue, 250.0);
}

#[test]
fn test_empty_database_yields_empty_report() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let report = ReportApi::open_database(&db_path).unwrap().generate_report().unwrap();

    assert!(report.rows.is_empty());
    assert!(report.forecast.is_empty());
    assert_eq!(report.summary.total_months, 0);
}

#[test]
fn test_invalid_stored_config_is_config_error() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    set_config(&conn, config_keys::FORECAST_HORIZON, "many").unwrap();

    let result = ReportApi::open_database(&db_path);
    assert!(matches!(result, Err(ApiError::ConfigError(_))));
}

#[test]
fn test_mistyped_quantity_is_skipped_not_fatal() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();
    seed_monthly_revenue(&conn, 1, &SERIES[..2]).unwrap();
    insert_order(&conn, 3, "2006-03-10", &[(1, 70.0)]).unwrap();
    conn.execute("UPDATE order_items SET quantity = 'abc' WHERE order_id = 3", [])
        .unwrap();

    let report = ReportApi::open_database(&db_path).unwrap().generate_report().unwrap();
    assert_eq!(report.rows.len(), 2);
    assert_eq!(report.skipped_rows.len(), 1);
    assert_eq!(report.skipped_rows[0].order_id, 3);
    assert_eq!(report.skipped_rows[0].reason, SkipReason::MissingQuantity);
}
