// ==========================================
// 月度销售趋势分析 - CSV 目录数据源
// ==========================================
// 职责: 不落库，直接从 orders.csv ⋈ order_items.csv 读取聚合器输入
// 约束: 日期/数量/单价保持宽松解析，坏值交给聚合器跳过并告警
//       order_id 坏值的行在读取时跳过并告警
// ==========================================

use crate::domain::sales::OrderLineFact;
use crate::importer::csv_importer::{ORDERS_FILE, ORDER_ITEMS_FILE, PAYMENTS_FILE};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::CsvParser;
use crate::repository::sales_source::{ReconciliationInput, SalesSource};
use std::collections::HashMap;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct CsvSalesSource {
    data_dir: PathBuf,
}

impl CsvSalesSource {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    /// orders ⋈ order_items（内连接，明细顺序保持文件顺序）
    pub fn read_facts(&self) -> ImportResult<Vec<OrderLineFact>> {
        let orders = CsvParser.parse_to_raw_records(&self.data_dir.join(ORDERS_FILE))?;
        let items = CsvParser.parse_to_raw_records(&self.data_dir.join(ORDER_ITEMS_FILE))?;

        let mut order_dates: HashMap<i64, Option<String>> = HashMap::with_capacity(orders.len());
        let mut bad_keys = 0usize;
        for rec in &orders {
            let Some(order_id) = lenient_key(rec.get("order_id"), ORDERS_FILE, rec.row) else {
                bad_keys += 1;
                continue;
            };
            order_dates.insert(order_id, rec.get("order_date").map(str::to_string));
        }

        let mut facts = Vec::with_capacity(items.len());
        let mut unmatched = 0usize;
        for rec in &items {
            let Some(order_id) = lenient_key(rec.get("order_id"), ORDER_ITEMS_FILE, rec.row) else {
                bad_keys += 1;
                continue;
            };
            let Some(order_date) = order_dates.get(&order_id) else {
                unmatched += 1;
                continue;
            };

            facts.push(OrderLineFact {
                order_id,
                order_date: order_date.clone(),
                quantity: rec.get("quantity").and_then(|v| v.parse::<i64>().ok()),
                price: rec.get("price").and_then(|v| v.parse::<f64>().ok()),
            });
        }

        if unmatched > 0 {
            warn!(unmatched, "订单明细引用了不存在的订单，已忽略");
        }
        if bad_keys > 0 {
            warn!(bad_keys, "order_id 缺失或非整数的行已忽略");
        }
        debug!(count = facts.len(), "CSV 明细投影读取完成");
        Ok(facts)
    }

    /// 对账输入（严格解析，任一坏行即失败）
    pub fn read_reconciliation_input(&self) -> ImportResult<ReconciliationInput> {
        let orders = CsvParser.parse_to_raw_records(&self.data_dir.join(ORDERS_FILE))?;
        let items = CsvParser.parse_to_raw_records(&self.data_dir.join(ORDER_ITEMS_FILE))?;
        let payments = CsvParser.parse_to_raw_records(&self.data_dir.join(PAYMENTS_FILE))?;

        let order_ids = orders
            .iter()
            .map(|rec| parse_key(rec.get("order_id"), ORDERS_FILE, rec.row))
            .collect::<ImportResult<Vec<_>>>()?;

        let line_mapper = FieldMapper::new(ORDER_ITEMS_FILE);
        let lines = items
            .iter()
            .map(|rec| line_mapper.map_order_line(rec))
            .collect::<ImportResult<Vec<_>>>()?;

        let payment_mapper = FieldMapper::new(PAYMENTS_FILE);
        let payments = payments
            .iter()
            .map(|rec| payment_mapper.map_payment(rec))
            .collect::<ImportResult<Vec<_>>>()?;

        Ok(ReconciliationInput {
            order_ids,
            lines,
            payments,
        })
    }
}

impl SalesSource for CsvSalesSource {
    fn load_order_line_facts(&self) -> Result<Vec<OrderLineFact>, Box<dyn Error>> {
        Ok(self.read_facts()?)
    }

    fn load_reconciliation_input(&self) -> Result<ReconciliationInput, Box<dyn Error>> {
        Ok(self.read_reconciliation_input()?)
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.data_dir.display())
    }
}

/// 连接键必须是整数，否则无法确定归属
fn parse_key(value: Option<&str>, file: &str, row: usize) -> ImportResult<i64> {
    let raw = value.ok_or_else(|| ImportError::MissingField {
        file: file.to_string(),
        row,
        field: "order_id".to_string(),
    })?;
    raw.parse::<i64>()
        .map_err(|_| ImportError::TypeConversionError {
            file: file.to_string(),
            row,
            field: "order_id".to_string(),
            message: format!("无法解析为整数: {}", raw),
        })
}

// 趋势读取路径: 坏键记录告警后返回 None
fn lenient_key(value: Option<&str>, file: &str, row: usize) -> Option<i64> {
    match parse_key(value, file, row) {
        Ok(id) => Some(id),
        Err(e) => {
            warn!(file, row, "跳过无效行: {}", e);
            None
        }
    }
}
