// ==========================================
// 月度销售趋势分析 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + CSV
// 系统定位: 电商订单月度营收趋势与预测
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 趋势计算
pub mod engine;

// 导入层 - 样例数据 / CSV
pub mod importer;

// 配置层 - 报表口径
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    BaselinePolicy, ForecastEstimator, LabelStyle, PaymentCheckStatus, PercentSurfacing,
    TrendLabel,
};

// 领域实体
pub use domain::{
    MonthKey, MonthlyAggregate, OrderLineFact, ReconciliationReport, ReportRow, SalesDataset,
    SalesTrendReport, SequencedMonth, TrendRecord,
};

// 引擎
pub use engine::{
    Forecaster, MonthSequencer, MonthlyAggregator, PaymentReconciler, TrendCalculator,
    TrendPipeline,
};

// 配置
pub use config::{ConfigManager, ConfigOverrides, ReportConfig};

// API
pub use api::{ApiError, ReportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "月度销售趋势分析";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
