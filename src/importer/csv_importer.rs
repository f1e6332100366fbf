// ==========================================
// 月度销售趋势分析 - CSV → SQLite 导入器
// ==========================================
// 流程: 读取五个 CSV → 字段映射 → 建表 → 单事务 upsert
// 约束: 任一文件/行解析失败则整体失败，不落库
// ==========================================

use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::sales::SalesDataset;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::{CsvParser, RawRecord};
use crate::repository::sales_repo::{SalesRepository, TableCounts};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{info, instrument};

pub const CUSTOMERS_FILE: &str = "customers.csv";
pub const PRODUCTS_FILE: &str = "products.csv";
pub const ORDERS_FILE: &str = "orders.csv";
pub const ORDER_ITEMS_FILE: &str = "order_items.csv";
pub const PAYMENTS_FILE: &str = "payments.csv";

/// 导入结果摘要
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub db_path: String,
    /// 本次写入的记录数
    pub imported: TableCounts,
    /// 导入后各表总行数
    pub table_rows: TableCounts,
    pub elapsed_ms: u128,
}

// ==========================================
// CsvImporter
// ==========================================
pub struct CsvImporter {
    data_dir: PathBuf,
}

impl CsvImporter {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// 读取并映射五个 CSV 文件
    #[instrument(skip(self), fields(dir = %self.data_dir.display()))]
    pub fn read_dataset(&self) -> ImportResult<SalesDataset> {
        let dataset = SalesDataset {
            customers: self.map_file(CUSTOMERS_FILE, |m, r| m.map_customer(r))?,
            products: self.map_file(PRODUCTS_FILE, |m, r| m.map_product(r))?,
            orders: self.map_file(ORDERS_FILE, |m, r| m.map_order(r))?,
            order_lines: self.map_file(ORDER_ITEMS_FILE, |m, r| m.map_order_line(r))?,
            payments: self.map_file(PAYMENTS_FILE, |m, r| m.map_payment(r))?,
        };

        info!(
            customers = dataset.customers.len(),
            products = dataset.products.len(),
            orders = dataset.orders.len(),
            order_items = dataset.order_lines.len(),
            payments = dataset.payments.len(),
            "CSV 读取完成"
        );
        Ok(dataset)
    }

    /// 导入到指定数据库文件（不存在则创建）
    #[instrument(skip(self))]
    pub fn import_into(&self, db_path: &str) -> ImportResult<ImportSummary> {
        let started = Instant::now();
        let dataset = self.read_dataset()?;

        let conn = open_sqlite_connection(db_path)
            .map_err(|e| ImportError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn)?;

        let repo = SalesRepository::from_connection(Arc::new(Mutex::new(conn)));
        let imported = repo.upsert_dataset(&dataset)?;
        let table_rows = repo.count_rows()?;

        let summary = ImportSummary {
            db_path: db_path.to_string(),
            imported,
            table_rows,
            elapsed_ms: started.elapsed().as_millis(),
        };
        info!(
            total = summary.imported.total(),
            elapsed_ms = summary.elapsed_ms,
            "导入完成"
        );
        Ok(summary)
    }

    fn map_file<T>(
        &self,
        file: &str,
        map: impl Fn(&FieldMapper<'_>, &RawRecord) -> ImportResult<T>,
    ) -> ImportResult<Vec<T>> {
        let records = CsvParser.parse_to_raw_records(&self.data_dir.join(file))?;
        let mapper = FieldMapper::new(file);
        records.iter().map(|rec| map(&mapper, rec)).collect()
    }
}
