// ==========================================
// 月度销售趋势分析 - 电商源数据实体
// ==========================================
// 对应五张源表: customers / products / orders / order_items / payments
// 红线: 源数据只读，不在计算链路中修改
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// order_date 可接受的日期格式（按顺序尝试）
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// order_date 可接受的日期时间格式
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

// ==========================================
// Customer - 客户
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: i64,
    pub customer_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

// ==========================================
// Product - 商品
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: i64,
    pub product_name: String,
    pub category: Option<String>,
    pub price: f64,
}

// ==========================================
// Order - 订单
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: i64,
    pub customer_id: i64,
    pub order_date: NaiveDate, // 月度分桶的时间键
    pub status: Option<String>,
}

// ==========================================
// OrderLine - 订单明细
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub item_id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub price: f64, // 下单时成交单价
}

impl OrderLine {
    /// 明细金额 = 数量 × 单价
    pub fn line_total(&self) -> f64 {
        self.quantity as f64 * self.price
    }
}

// ==========================================
// Payment - 支付记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub payment_id: i64,
    pub amount: f64,
    pub order_id: i64,
    pub payment_method: Option<String>,
    pub payment_date: NaiveDate,
}

// ==========================================
// OrderLineFact - 聚合器输入行
// ==========================================
// orders ⋈ order_items 的投影，只保留计算所需的三个字段
// 日期/数值保持原始可空形态，由聚合器逐行校验（坏行跳过并告警）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineFact {
    pub order_id: i64,
    pub order_date: Option<String>,
    pub quantity: Option<i64>,
    pub price: Option<f64>,
}

impl OrderLineFact {
    pub fn new(order_id: i64, order_date: &str, quantity: i64, price: f64) -> Self {
        Self {
            order_id,
            order_date: Some(order_date.to_string()),
            quantity: Some(quantity),
            price: Some(price),
        }
    }
}

// ==========================================
// SalesDataset - 五张源表的完整数据集
// ==========================================
// 生成器输出 / CSV 导入器的中间形态
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesDataset {
    pub customers: Vec<Customer>,
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
    pub order_lines: Vec<OrderLine>,
    pub payments: Vec<Payment>,
}

impl SalesDataset {
    /// 订单金额（按 order_id 汇总明细金额）
    pub fn order_total(&self, order_id: i64) -> f64 {
        self.order_lines
            .iter()
            .filter(|l| l.order_id == order_id)
            .map(OrderLine::line_total)
            .sum()
    }

    /// 聚合器输入行（orders ⋈ order_items，日期转 ISO 文本）
    pub fn order_line_facts(&self) -> Vec<OrderLineFact> {
        let dates: std::collections::HashMap<i64, NaiveDate> = self
            .orders
            .iter()
            .map(|o| (o.order_id, o.order_date))
            .collect();

        self.order_lines
            .iter()
            .filter_map(|line| {
                dates.get(&line.order_id).map(|date| OrderLineFact {
                    order_id: line.order_id,
                    order_date: Some(date.format("%Y-%m-%d").to_string()),
                    quantity: Some(line.quantity),
                    price: Some(line.price),
                })
            })
            .collect()
    }
}

/// 解析订单日期
///
/// 支持:
/// - YYYY-MM-DD（入库后的标准格式）
/// - YYYY-MM-DD HH:MM:SS / YYYY-MM-DDTHH:MM:SS
/// - MM/DD/YYYY（样例数据生成器的原始格式）
///
/// 无法解析时返回 None，由调用方决定跳过或报错
pub fn parse_order_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_order_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2006, 3, 7).unwrap();
        assert_eq!(parse_order_date("2006-03-07"), Some(expected));
        assert_eq!(parse_order_date("03/07/2006"), Some(expected));
        assert_eq!(parse_order_date("2006-03-07 13:45:00"), Some(expected));
        assert_eq!(parse_order_date(" 2006-03-07T00:00:00 "), Some(expected));
    }

    #[test]
    fn test_parse_order_date_rejects_garbage() {
        assert_eq!(parse_order_date(""), None);
        assert_eq!(parse_order_date("not-a-date"), None);
        assert_eq!(parse_order_date("2006-13-01"), None);
    }

    #[test]
    fn test_dataset_facts_skip_lines_without_order() {
        let dataset = SalesDataset {
            orders: vec![Order {
                order_id: 1,
                customer_id: 1,
                order_date: NaiveDate::from_ymd_opt(2006, 1, 15).unwrap(),
                status: None,
            }],
            order_lines: vec![
                OrderLine { item_id: 1, order_id: 1, product_id: 1, quantity: 2, price: 10.0 },
                OrderLine { item_id: 2, order_id: 99, product_id: 1, quantity: 1, price: 5.0 },
            ],
            ..Default::default()
        };

        let facts = dataset.order_line_facts();
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].order_date.as_deref(), Some("2006-01-15"));
        assert_eq!(dataset.order_total(1), 20.0);
        assert_eq!(dataset.order_total(99), 5.0);
    }

    #[test]
    fn test_line_total() {
        let line = OrderLine {
            item_id: 1,
            order_id: 1,
            product_id: 7,
            quantity: 3,
            price: 12.5,
        };
        assert_eq!(line.line_total(), 37.5);
    }
}
