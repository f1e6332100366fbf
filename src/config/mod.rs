// ==========================================
// 月度销售趋势分析 - 配置层
// ==========================================
// 职责: 报表口径配置管理（预测估计器 / 标签风格 / 基期口径 等）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod report_config;
pub mod report_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use report_config::{
    ConfigOverrides, ReportConfig, DEFAULT_FORECAST_HORIZON, MAX_FORECAST_HORIZON,
};
pub use report_config_trait::ReportConfigReader;
