// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库初始化、源数据写入
// ==========================================

#![allow(dead_code)]

use rusqlite::{params, Connection};
use sales_trend::db::{init_schema, open_sqlite_connection};
use std::error::Error;
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径不是 UTF-8")?
        .to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开测试数据库连接（统一 PRAGMA）
pub fn open_test_connection(db_path: &str) -> Result<Connection, Box<dyn Error>> {
    Ok(open_sqlite_connection(db_path)?)
}

/// 写入一张订单及其明细（客户/商品按需补齐）
///
/// lines: (quantity, price)
pub fn insert_order(
    conn: &Connection,
    order_id: i64,
    order_date: &str,
    lines: &[(i64, f64)],
) -> Result<(), Box<dyn Error>> {
    conn.execute(
        "INSERT OR IGNORE INTO customers (customer_id, customer_name, email)
         VALUES (1, 'Test Customer', 'test@example.com')",
        [],
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO products (product_id, product_name, category, price)
         VALUES (1, 'Test Product', 'Books', 10.0)",
        [],
    )?;
    conn.execute(
        "INSERT INTO orders (order_id, customer_id, order_date, status) VALUES (?1, 1, ?2, 'delivered')",
        params![order_id, order_date],
    )?;

    for (quantity, price) in lines {
        conn.execute(
            "INSERT INTO order_items (order_id, product_id, quantity, price) VALUES (?1, 1, ?2, ?3)",
            params![order_id, quantity, price],
        )?;
    }
    Ok(())
}

/// 写入支付记录
pub fn insert_payment(
    conn: &Connection,
    payment_id: i64,
    order_id: i64,
    amount: f64,
    payment_date: &str,
) -> Result<(), Box<dyn Error>> {
    conn.execute(
        "INSERT INTO payments (payment_id, amount, order_id, payment_method, payment_date)
         VALUES (?1, ?2, ?3, 'UPI', ?4)",
        params![payment_id, amount, order_id, payment_date],
    )?;
    Ok(())
}

/// 按月写入营收序列：每月一张订单、一条明细（数量 1，单价 = 营收）
///
/// months: (YYYY-MM, revenue)，订单号从 first_order_id 起递增
pub fn seed_monthly_revenue(
    conn: &Connection,
    first_order_id: i64,
    months: &[(&str, f64)],
) -> Result<(), Box<dyn Error>> {
    for (offset, (month, revenue)) in months.iter().enumerate() {
        let order_date = format!("{}-15", month);
        insert_order(conn, first_order_id + offset as i64, &order_date, &[(1, *revenue)])?;
    }
    Ok(())
}

/// 写入全局配置
pub fn set_config(conn: &Connection, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    conn.execute(
        "INSERT OR REPLACE INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)",
        params![key, value],
    )?;
    Ok(())
}
