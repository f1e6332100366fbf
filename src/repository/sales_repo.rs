// ==========================================
// 月度销售趋势分析 - 销售源数据仓储
// ==========================================
// 职责: 五张源表的批量写入 + 趋势计算 / 支付对账所需的读取
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::sales::{
    parse_order_date, Customer, Order, OrderLine, OrderLineFact, Payment, Product, SalesDataset,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sales_source::{ReconciliationInput, SalesSource};
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, Row};
use serde::Serialize;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument};

/// 一次写入各表的记录数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub customers: usize,
    pub products: usize,
    pub orders: usize,
    pub order_items: usize,
    pub payments: usize,
}

impl TableCounts {
    pub fn total(&self) -> usize {
        self.customers + self.products + self.orders + self.order_items + self.payments
    }
}

// ==========================================
// SalesRepository - 销售源数据仓储
// ==========================================
pub struct SalesRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SalesRepository {
    /// 打开数据库文件创建仓储实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 批量写入完整数据集（INSERT OR REPLACE）
    ///
    /// # 说明
    /// - 单事务写入五张表，任一失败整体回滚
    /// - 写入顺序满足外键: customers/products → orders → order_items/payments
    /// - 日期统一写成 YYYY-MM-DD
    #[instrument(skip(self, dataset), fields(orders = dataset.orders.len()))]
    pub fn upsert_dataset(&self, dataset: &SalesDataset) -> RepositoryResult<TableCounts> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let mut counts = TableCounts::default();

        for c in &dataset.customers {
            tx.execute(
                "INSERT OR REPLACE INTO customers
                 (customer_id, customer_name, email, phone_number, city, country)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![c.customer_id, c.customer_name, c.email, c.phone_number, c.city, c.country],
            )?;
            counts.customers += 1;
        }

        for p in &dataset.products {
            tx.execute(
                "INSERT OR REPLACE INTO products (product_id, product_name, category, price)
                 VALUES (?1, ?2, ?3, ?4)",
                params![p.product_id, p.product_name, p.category, p.price],
            )?;
            counts.products += 1;
        }

        for o in &dataset.orders {
            tx.execute(
                "INSERT OR REPLACE INTO orders (order_id, customer_id, order_date, status)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    o.order_id,
                    o.customer_id,
                    o.order_date.format("%Y-%m-%d").to_string(),
                    o.status
                ],
            )?;
            counts.orders += 1;
        }

        for l in &dataset.order_lines {
            tx.execute(
                "INSERT OR REPLACE INTO order_items (item_id, order_id, product_id, quantity, price)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![l.item_id, l.order_id, l.product_id, l.quantity, l.price],
            )?;
            counts.order_items += 1;
        }

        for p in &dataset.payments {
            tx.execute(
                "INSERT OR REPLACE INTO payments
                 (payment_id, amount, order_id, payment_method, payment_date)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    p.payment_id,
                    p.amount,
                    p.order_id,
                    p.payment_method,
                    p.payment_date.format("%Y-%m-%d").to_string()
                ],
            )?;
            counts.payments += 1;
        }

        tx.commit()?;
        debug!(total = counts.total(), "数据集写入完成");
        Ok(counts)
    }

    /// 读取 orders ⋈ order_items 投影
    ///
    /// order_date 以原始文本返回（非文本存储类型转为字符串），不在仓储层解析
    /// quantity / price 存储类型不符时返回 None，由聚合器跳过
    #[instrument(skip(self))]
    pub fn find_order_line_facts(&self) -> RepositoryResult<Vec<OrderLineFact>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT o.order_id, o.order_date, oi.quantity, oi.price
             FROM orders o
             INNER JOIN order_items oi ON o.order_id = oi.order_id
             ORDER BY oi.item_id",
        )?;

        let facts = stmt
            .query_map([], |row| {
                Ok(OrderLineFact {
                    order_id: row.get(0)?,
                    order_date: raw_text(row, 1)?,
                    quantity: raw_integer(row, 2)?,
                    price: raw_real(row, 3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = facts.len(), "读取订单明细投影");
        Ok(facts)
    }

    /// 全部订单号（升序）
    pub fn find_order_ids(&self) -> RepositoryResult<Vec<i64>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT order_id FROM orders ORDER BY order_id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<i64>, _>>()?;
        Ok(ids)
    }

    /// 全部订单
    pub fn find_orders(&self) -> RepositoryResult<Vec<Order>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT order_id, customer_id, order_date, status FROM orders ORDER BY order_id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    raw_text(row, 2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(order_id, customer_id, date, status)| {
                Ok(Order {
                    order_id,
                    customer_id,
                    order_date: parse_date_field("orders", order_id, "order_date", date)?,
                    status,
                })
            })
            .collect()
    }

    /// 全部订单明细
    pub fn find_order_lines(&self) -> RepositoryResult<Vec<OrderLine>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT item_id, order_id, product_id, quantity, price
             FROM order_items ORDER BY item_id",
        )?;
        let lines = stmt
            .query_map([], |row| {
                Ok(OrderLine {
                    item_id: row.get(0)?,
                    order_id: row.get(1)?,
                    product_id: row.get(2)?,
                    quantity: row.get(3)?,
                    price: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lines)
    }

    /// 全部支付记录
    pub fn find_payments(&self) -> RepositoryResult<Vec<Payment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT payment_id, amount, order_id, payment_method, payment_date
             FROM payments ORDER BY payment_id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    raw_text(row, 4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(payment_id, amount, order_id, payment_method, date)| {
                Ok(Payment {
                    payment_id,
                    amount,
                    order_id,
                    payment_method,
                    payment_date: parse_date_field("payments", payment_id, "payment_date", date)?,
                })
            })
            .collect()
    }

    /// 全部客户
    pub fn find_customers(&self) -> RepositoryResult<Vec<Customer>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT customer_id, customer_name, email, phone_number, city, country
             FROM customers ORDER BY customer_id",
        )?;
        let customers = stmt
            .query_map([], |row| {
                Ok(Customer {
                    customer_id: row.get(0)?,
                    customer_name: row.get(1)?,
                    email: row.get(2)?,
                    phone_number: row.get(3)?,
                    city: row.get(4)?,
                    country: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(customers)
    }

    /// 全部商品
    pub fn find_products(&self) -> RepositoryResult<Vec<Product>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT product_id, product_name, category, price FROM products ORDER BY product_id",
        )?;
        let products = stmt
            .query_map([], |row| {
                Ok(Product {
                    product_id: row.get(0)?,
                    product_name: row.get(1)?,
                    category: row.get(2)?,
                    price: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(products)
    }

    /// 各表当前行数
    pub fn count_rows(&self) -> RepositoryResult<TableCounts> {
        let conn = self.get_conn()?;
        let count = |table: &str| -> RepositoryResult<usize> {
            let n: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
            Ok(n as usize)
        };

        Ok(TableCounts {
            customers: count("customers")?,
            products: count("products")?,
            orders: count("orders")?,
            order_items: count("order_items")?,
            payments: count("payments")?,
        })
    }
}

impl SalesSource for SalesRepository {
    fn load_order_line_facts(&self) -> Result<Vec<OrderLineFact>, Box<dyn Error>> {
        Ok(self.find_order_line_facts()?)
    }

    fn load_reconciliation_input(&self) -> Result<ReconciliationInput, Box<dyn Error>> {
        Ok(ReconciliationInput {
            order_ids: self.find_order_ids()?,
            lines: self.find_order_lines()?,
            payments: self.find_payments()?,
        })
    }

    fn describe(&self) -> String {
        match self.get_conn() {
            Ok(conn) => conn
                .path()
                .map(|p| format!("sqlite:{}", p))
                .unwrap_or_else(|| "sqlite:memory".to_string()),
            Err(_) => "sqlite".to_string(),
        }
    }
}

// ==========================================
// 辅助函数
// ==========================================

/// 读取文本列；整数/浮点存储的值转为字符串，NULL 返回 None
fn raw_text(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => None,
        ValueRef::Text(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Blob(_) => None,
    })
}

// 整数列宽松读取: 仅 INTEGER 存储类型有效
fn raw_integer(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<i64>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Integer(i) => Some(i),
        _ => None,
    })
}

// 数值列宽松读取: INTEGER / REAL 有效
fn raw_real(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<f64>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Real(f) => Some(f),
        ValueRef::Integer(i) => Some(i as f64),
        _ => None,
    })
}

fn parse_date_field(
    table: &str,
    id: i64,
    field: &str,
    raw: Option<String>,
) -> RepositoryResult<chrono::NaiveDate> {
    let raw = raw.unwrap_or_default();
    parse_order_date(&raw).ok_or_else(|| RepositoryError::FieldValueError {
        table: table.to_string(),
        id,
        field: field.to_string(),
        message: format!("无法解析日期: '{}'", raw),
    })
}
