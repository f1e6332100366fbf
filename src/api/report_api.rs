// ==========================================
// 月度销售趋势分析 - 报表 API
// ==========================================
// 职责: 组合 数据源 + 配置 + 计算流水线，对外提供报表与对账
// 数据源: SQLite 数据库文件 / CSV 目录
// ==========================================

use crate::api::error::{from_boxed, ApiError, ApiResult};
use crate::config::{ConfigManager, ConfigOverrides, ReportConfig, ReportConfigReader};
use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::report::{ReconciliationReport, SalesTrendReport};
use crate::engine::{PaymentReconciler, TrendPipeline};
use crate::importer::CsvSalesSource;
use crate::repository::{SalesRepository, SalesSource};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{info, instrument};

// ==========================================
// ReportApi - 报表 API
// ==========================================
pub struct ReportApi {
    source: Box<dyn SalesSource>,
    config: ReportConfig,
}

impl ReportApi {
    /// 使用任意数据源与给定配置创建
    pub fn new(source: Box<dyn SalesSource>, config: ReportConfig) -> Self {
        Self { source, config }
    }

    /// 打开 SQLite 数据库
    ///
    /// # 说明
    /// - 建表语句幂等，对已有库只补齐缺失的表（含 config_kv）
    /// - 报表配置从 config_kv 读取，缺失键取默认值
    pub fn open_database(db_path: &str) -> ApiResult<Self> {
        if !Path::new(db_path).exists() {
            return Err(ApiError::NotFound(format!("数据库文件不存在: {}", db_path)));
        }

        let conn = open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn)?;
        let conn = Arc::new(Mutex::new(conn));

        let config_manager = ConfigManager::from_connection(conn.clone())
            .map_err(|e| from_boxed(e, ApiError::ConfigError))?;
        let config = config_manager
            .load_report_config()
            .map_err(|e| from_boxed(e, ApiError::ConfigError))?;

        Ok(Self::new(
            Box::new(SalesRepository::from_connection(conn)),
            config,
        ))
    }

    /// 直接读取 CSV 目录（使用默认配置）
    pub fn open_csv_dir<P: AsRef<Path>>(dir: P) -> ApiResult<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(ApiError::NotFound(format!("CSV 目录不存在: {}", dir.display())));
        }
        Ok(Self::new(
            Box::new(CsvSalesSource::new(dir)),
            ReportConfig::default(),
        ))
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// 应用命令行覆盖项
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        self.config = self.config.with_overrides(overrides);
    }

    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    /// 生成月度趋势报表
    #[instrument(skip(self), fields(source = %self.source.describe()))]
    pub fn generate_report(&self) -> ApiResult<SalesTrendReport> {
        let facts = self
            .source
            .load_order_line_facts()
            .map_err(|e| from_boxed(e, ApiError::SourceError))?;

        let report = TrendPipeline::new(self.config).run(&facts)?;
        info!(months = report.rows.len(), "报表生成完成");
        Ok(report)
    }

    /// 支付对账
    #[instrument(skip(self), fields(source = %self.source.describe()))]
    pub fn reconcile_payments(&self) -> ApiResult<ReconciliationReport> {
        let input = self
            .source
            .load_reconciliation_input()
            .map_err(|e| from_boxed(e, ApiError::SourceError))?;

        let reconciler = PaymentReconciler::new(self.config.reconciliation_tolerance);
        Ok(reconciler.reconcile(&input.order_ids, &input.lines, &input.payments))
    }
}
