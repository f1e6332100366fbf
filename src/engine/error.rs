// ==========================================
// 月度销售趋势分析 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("月份键无法解析: {0}（期望 YYYY-MM）")]
    InvalidMonthKey(String),

    #[error("配置值无效 (key: {key}, value: {value})")]
    InvalidConfigValue { key: String, value: String },
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
