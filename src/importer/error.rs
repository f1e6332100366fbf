// ==========================================
// 月度销售趋势分析 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("文件写入失败: {0}")]
    FileWriteError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 数据映射错误 =====
    #[error("必填字段缺失 ({file} 行 {row}): {field}")]
    MissingField {
        file: String,
        row: usize,
        field: String,
    },

    #[error("类型转换失败 ({file} 行 {row}, 字段 {field}): {message}")]
    TypeConversionError {
        file: String,
        row: usize,
        field: String,
        message: String,
    },

    #[error("日期格式错误 ({file} 行 {row}, 字段 {field}): 期望 MM/DD/YYYY 或 YYYY-MM-DD，实际 {value}")]
    DateFormatError {
        file: String,
        row: usize,
        field: String,
        value: String,
    },

    // ===== 生成参数错误 =====
    #[error("生成参数无效: {0}")]
    InvalidGeneratorConfig(String),

    // ===== 数据库错误 =====
    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库写入失败: {0}")]
    DatabaseWriteError(#[from] RepositoryError),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for ImportError {
    fn from(err: rusqlite::Error) -> Self {
        ImportError::DatabaseWriteError(RepositoryError::from(err))
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
