// ==========================================
// 月度销售趋势分析 - 导入层
// ==========================================
// 职责: 样例数据生成 / CSV 解析 / CSV → SQLite 导入 / CSV 直读数据源
// ==========================================

pub mod csv_importer;
pub mod csv_source;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod sample_generator;

// 重导出核心类型
pub use csv_importer::{
    CsvImporter, ImportSummary, CUSTOMERS_FILE, ORDERS_FILE, ORDER_ITEMS_FILE, PAYMENTS_FILE,
    PRODUCTS_FILE,
};
pub use csv_source::CsvSalesSource;
pub use error::{ImportError, ImportResult};
pub use field_mapper::{parse_import_date, FieldMapper};
pub use file_parser::{CsvParser, RawRecord};
pub use sample_generator::{SampleDataConfig, SampleDataGenerator};
