// ==========================================
// 月度销售趋势分析 - 样例数据生成器
// ==========================================
// 输出: customers / products / orders / order_items / payments 五个 CSV
// 约束: 给定 seed 输出完全确定（单一 StdRng 流，按固定顺序取值）
// ==========================================

use crate::domain::sales::{Customer, Order, OrderLine, Payment, Product, SalesDataset};
use crate::domain::trend::round2;
use crate::importer::csv_importer::{
    CUSTOMERS_FILE, ORDERS_FILE, ORDER_ITEMS_FILE, PAYMENTS_FILE, PRODUCTS_FILE,
};
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::sales_repo::TableCounts;
use chrono::{Duration, NaiveDate};
use csv::Writer;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, instrument};

const PAYMENT_METHODS: &[&str] = &["UPI", "Card", "Wallet", "Net Banking", "Cash on Delivery"];
const ORDER_STATUSES: &[&str] = &["pending", "processing", "shipped", "delivered", "cancelled"];
const CATEGORIES: &[&str] = &[
    "Electronics",
    "Clothing",
    "Books",
    "Home & Kitchen",
    "Sports",
    "Toys",
    "Beauty",
    "Food",
];
const CITIES: &[&str] = &["Pune", "Lyon", "Osaka", "Austin", "Leeds", "Porto", "Cebu"];
const COUNTRIES: &[&str] = &["India", "France", "Japan", "USA", "UK", "Portugal", "Philippines"];

/// CSV 中日期的书写格式
const CSV_DATE_FORMAT: &str = "%m/%d/%Y";

/// 生成参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleDataConfig {
    pub customers: usize,
    pub products: usize,
    pub orders: usize,
    pub min_items_per_order: usize,
    pub max_items_per_order: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// 付款日相对下单日的最大延迟天数
    pub max_payment_delay_days: i64,
    pub seed: u64,
}

impl Default for SampleDataConfig {
    fn default() -> Self {
        Self {
            customers: 100,
            products: 50,
            orders: 200,
            min_items_per_order: 1,
            max_items_per_order: 5,
            start_date: NaiveDate::from_ymd_opt(2006, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2007, 12, 31).unwrap_or_default(),
            max_payment_delay_days: 7,
            seed: 42,
        }
    }
}

impl SampleDataConfig {
    pub fn validate(&self) -> ImportResult<()> {
        if self.customers == 0 || self.products == 0 || self.orders == 0 {
            return Err(ImportError::InvalidGeneratorConfig(
                "customers / products / orders 必须大于 0".to_string(),
            ));
        }
        if self.min_items_per_order == 0 || self.min_items_per_order > self.max_items_per_order {
            return Err(ImportError::InvalidGeneratorConfig(format!(
                "每单明细数范围无效: [{}, {}]",
                self.min_items_per_order, self.max_items_per_order
            )));
        }
        if self.start_date > self.end_date {
            return Err(ImportError::InvalidGeneratorConfig(format!(
                "日期范围无效: {} > {}",
                self.start_date, self.end_date
            )));
        }
        if self.max_payment_delay_days < 0 {
            return Err(ImportError::InvalidGeneratorConfig(
                "max_payment_delay_days 不能为负".to_string(),
            ));
        }
        Ok(())
    }
}

// ==========================================
// SampleDataGenerator
// ==========================================
pub struct SampleDataGenerator {
    config: SampleDataConfig,
}

impl SampleDataGenerator {
    pub fn new(config: SampleDataConfig) -> ImportResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SampleDataConfig {
        &self.config
    }

    /// 生成内存数据集
    pub fn generate(&self) -> SalesDataset {
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        let customers = (1..=self.config.customers)
            .map(|i| self.customer(i, &mut rng))
            .collect();
        let products: Vec<Product> = (1..=self.config.products)
            .map(|i| self.product(i, &mut rng))
            .collect();
        let orders: Vec<Order> = (1..=self.config.orders)
            .map(|i| self.order(i, &mut rng))
            .collect();

        let mut order_lines = Vec::new();
        for order in &orders {
            self.push_order_lines(order, &products, &mut order_lines, &mut rng);
        }

        let mut dataset = SalesDataset {
            customers,
            products,
            orders,
            order_lines,
            payments: Vec::new(),
        };
        let mut payments = Vec::with_capacity(dataset.orders.len());
        for (idx, order) in dataset.orders.iter().enumerate() {
            let total = dataset.order_total(order.order_id);
            payments.push(self.payment(idx + 1, order, total, &mut rng));
        }
        dataset.payments = payments;
        dataset
    }

    /// 生成并写出五个 CSV 文件
    #[instrument(skip(self, dir), fields(dir = %dir.display(), seed = self.config.seed))]
    pub fn write_csv(&self, dir: &Path) -> ImportResult<TableCounts> {
        fs::create_dir_all(dir).map_err(|e| ImportError::FileWriteError(e.to_string()))?;
        let dataset = self.generate();

        write_rows(
            &dir.join(CUSTOMERS_FILE),
            &["customer_id", "customer_name", "email", "phone number", "city", "country"],
            dataset.customers.iter().map(|c| {
                vec![
                    c.customer_id.to_string(),
                    c.customer_name.clone(),
                    c.email.clone(),
                    c.phone_number.clone().unwrap_or_default(),
                    c.city.clone().unwrap_or_default(),
                    c.country.clone().unwrap_or_default(),
                ]
            }),
        )?;

        write_rows(
            &dir.join(PRODUCTS_FILE),
            &["product_id", "product_name", "category", "price"],
            dataset.products.iter().map(|p| {
                vec![
                    p.product_id.to_string(),
                    p.product_name.clone(),
                    p.category.clone().unwrap_or_default(),
                    format!("{:.2}", p.price),
                ]
            }),
        )?;

        write_rows(
            &dir.join(ORDERS_FILE),
            &["order_id", "customer_id", "order_date", "status"],
            dataset.orders.iter().map(|o| {
                vec![
                    o.order_id.to_string(),
                    o.customer_id.to_string(),
                    o.order_date.format(CSV_DATE_FORMAT).to_string(),
                    o.status.clone().unwrap_or_default(),
                ]
            }),
        )?;

        write_rows(
            &dir.join(ORDER_ITEMS_FILE),
            &["item_id", "order_id", "product_id", "quantity", "price"],
            dataset.order_lines.iter().map(|l| {
                vec![
                    l.item_id.to_string(),
                    l.order_id.to_string(),
                    l.product_id.to_string(),
                    l.quantity.to_string(),
                    format!("{:.2}", l.price),
                ]
            }),
        )?;

        write_rows(
            &dir.join(PAYMENTS_FILE),
            &["payment_id", "amount", "order_id", "payment_method", "payment_date"],
            dataset.payments.iter().map(|p| {
                vec![
                    p.payment_id.to_string(),
                    format!("{:.2}", p.amount),
                    p.order_id.to_string(),
                    p.payment_method.clone().unwrap_or_default(),
                    p.payment_date.format(CSV_DATE_FORMAT).to_string(),
                ]
            }),
        )?;

        let counts = TableCounts {
            customers: dataset.customers.len(),
            products: dataset.products.len(),
            orders: dataset.orders.len(),
            order_items: dataset.order_lines.len(),
            payments: dataset.payments.len(),
        };
        info!(total = counts.total(), "样例数据生成完成");
        Ok(counts)
    }

    // ===== 单条记录生成 =====

    fn customer(&self, i: usize, rng: &mut StdRng) -> Customer {
        Customer {
            customer_id: i as i64,
            customer_name: format!("Customer_{}", i),
            email: format!("customer{}@example.com", i),
            phone_number: Some(format!("555-{:04}", rng.gen_range(0..10_000))),
            city: CITIES.choose(rng).map(|c| c.to_string()),
            country: COUNTRIES.choose(rng).map(|c| c.to_string()),
        }
    }

    fn product(&self, i: usize, rng: &mut StdRng) -> Product {
        // 10.00 ~ 1000.00
        let cents: u32 = rng.gen_range(1_000..=100_000);
        Product {
            product_id: i as i64,
            product_name: format!("Product_{}", i),
            category: CATEGORIES.choose(rng).map(|c| c.to_string()),
            price: cents as f64 / 100.0,
        }
    }

    fn order(&self, i: usize, rng: &mut StdRng) -> Order {
        let span_days = (self.config.end_date - self.config.start_date).num_days();
        Order {
            order_id: i as i64,
            customer_id: rng.gen_range(1..=self.config.customers as i64),
            order_date: self.config.start_date + Duration::days(rng.gen_range(0..=span_days)),
            status: ORDER_STATUSES.choose(rng).map(|s| s.to_string()),
        }
    }

    fn push_order_lines(
        &self,
        order: &Order,
        products: &[Product],
        out: &mut Vec<OrderLine>,
        rng: &mut StdRng,
    ) {
        let wanted =
            rng.gen_range(self.config.min_items_per_order..=self.config.max_items_per_order);
        let count = wanted.min(products.len());

        // 同一订单内商品不重复
        for product in products.choose_multiple(rng, count) {
            // 成交价 = 标价 × [0.90, 1.10]
            let factor: f64 = rng.gen_range(0.9..=1.1);
            out.push(OrderLine {
                item_id: out.len() as i64 + 1,
                order_id: order.order_id,
                product_id: product.product_id,
                quantity: rng.gen_range(1..=5),
                price: round2(product.price * factor),
            });
        }
    }

    fn payment(&self, i: usize, order: &Order, order_total: f64, rng: &mut StdRng) -> Payment {
        let delay = rng.gen_range(0..=self.config.max_payment_delay_days);
        let payment_date = (order.order_date + Duration::days(delay)).min(self.config.end_date);
        Payment {
            payment_id: i as i64,
            amount: round2(order_total),
            order_id: order.order_id,
            payment_method: PAYMENT_METHODS.choose(rng).map(|m| m.to_string()),
            payment_date,
        }
    }
}

fn write_rows<I>(path: &Path, header: &[&str], rows: I) -> ImportResult<()>
where
    I: Iterator<Item = Vec<String>>,
{
    let mut writer =
        Writer::from_path(path).map_err(|e| ImportError::FileWriteError(e.to_string()))?;
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}
