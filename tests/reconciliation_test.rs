// ==========================================
// 支付对账集成测试
// ==========================================
// 测试目标: 多笔支付合并、缺失支付、金额不符、孤立支付
// ==========================================

mod test_helpers;

use rusqlite::{params, Connection};
use sales_trend::api::ReportApi;
use sales_trend::domain::types::PaymentCheckStatus;
use test_helpers::{create_test_db, insert_order, insert_payment, open_test_connection};

#[test]
fn test_reconciliation_statuses() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_test_connection(&db_path).unwrap();

    // 订单 1: 全额支付
    insert_order(&conn, 1, "2006-01-05", &[(2, 25.0)]).unwrap();
    insert_payment(&conn, 1, 1, 50.0, "2006-01-06").unwrap();

    // 订单 2: 分两次支付，合计相符
    insert_order(&conn, 2, "2006-01-07", &[(1, 40.0), (1, 60.0)]).unwrap();
    insert_payment(&conn, 2, 2, 30.0, "2006-01-08").unwrap();
    insert_payment(&conn, 3, 2, 70.0, "2006-01-09").unwrap();

    // 订单 3: 少付
    insert_order(&conn, 3, "2006-02-01", &[(3, 10.0)]).unwrap();
    insert_payment(&conn, 4, 3, 25.0, "2006-02-02").unwrap();

    // 订单 4: 未支付
    insert_order(&conn, 4, "2006-02-03", &[(1, 12.5)]).unwrap();

    let recon = ReportApi::open_database(&db_path)
        .unwrap()
        .reconcile_payments()
        .unwrap();

    assert_eq!(recon.total_orders, 4);
    assert_eq!(recon.matching, 2);
    assert_eq!(recon.mismatching, 2);

    let status: Vec<(i64, PaymentCheckStatus)> =
        recon.checks.iter().map(|c| (c.order_id, c.status)).collect();
    assert_eq!(
        status,
        vec![
            (1, PaymentCheckStatus::Match),
            (2, PaymentCheckStatus::Match),
            (3, PaymentCheckStatus::Mismatch),
            (4, PaymentCheckStatus::Mismatch),
        ]
    );
    assert_eq!(recon.checks[2].difference, 5.0);
    assert_eq!(recon.orders_without_payment.len(), 1);
    assert_eq!(recon.orders_without_payment[0].order_id, 4);
    assert_eq!(recon.orders_without_payment[0].difference, 12.5);
}

#[test]
fn test_orphan_payment_is_reported() {
    let (_tmp, db_path) = create_test_db().unwrap();
    {
        let conn = open_test_connection(&db_path).unwrap();
        insert_order(&conn, 1, "2006-01-05", &[(1, 10.0)]).unwrap();
        insert_payment(&conn, 1, 1, 10.0, "2006-01-05").unwrap();
    }
    {
        // 外键默认关闭的裸连接，模拟历史脏数据
        let raw = Connection::open(&db_path).unwrap();
        // bundled SQLite 编译时默认开启外键，这里显式关闭以符合上述前提
        raw.execute_batch("PRAGMA foreign_keys = OFF;").unwrap();
        raw.execute(
            "INSERT INTO payments (payment_id, amount, order_id, payment_method, payment_date)
             VALUES (?1, ?2, ?3, 'Card', '2006-03-01')",
            params![2, 99.0, 777],
        )
        .unwrap();
    }

    let recon = ReportApi::open_database(&db_path)
        .unwrap()
        .reconcile_payments()
        .unwrap();

    assert_eq!(recon.total_orders, 1);
    assert_eq!(recon.matching, 1);
    assert_eq!(recon.orphan_payments.len(), 1);
    assert_eq!(recon.orphan_payments[0].order_id, 777);
}
