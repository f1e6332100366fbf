// ==========================================
// 月度销售趋势分析 - API层错误类型
// ==========================================
// 职责: 汇总各层错误，转换为面向使用者的错误消息
// ==========================================

use crate::engine::error::EngineError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入与配置错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据源读取失败: {0}")]
    SourceError(String),

    // ==========================================
    // 导入与计算错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("趋势计算失败: {0}")]
    CalculationError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::DatabaseError(format!("外键约束违反: {}", msg))
            }
            RepositoryError::FieldValueError {
                table,
                id,
                field,
                message,
            } => ApiError::InvalidInput(format!("{}.{}(id={})错误: {}", table, field, id, message)),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidConfigValue { .. } => ApiError::ConfigError(err.to_string()),
            EngineError::InvalidMonthKey(_) => ApiError::CalculationError(err.to_string()),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::FileNotFound(path) => ApiError::NotFound(format!("文件不存在: {}", path)),
            ImportError::DatabaseWriteError(repo_err) => ApiError::from(repo_err),
            ImportError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        ApiError::from(RepositoryError::from(err))
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

/// 配置层与数据源 Trait 返回 Box<dyn Error>，按具体类型还原
pub(crate) fn from_boxed(err: Box<dyn std::error::Error>, fallback: fn(String) -> ApiError) -> ApiError {
    let err = match err.downcast::<EngineError>() {
        Ok(e) => return ApiError::from(*e),
        Err(err) => err,
    };
    let err = match err.downcast::<RepositoryError>() {
        Ok(e) => return ApiError::from(*e),
        Err(err) => err,
    };
    let err = match err.downcast::<ImportError>() {
        Ok(e) => return ApiError::from(*e),
        Err(err) => err,
    };
    fallback(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boxed_engine_error_keeps_kind() {
        let boxed: Box<dyn std::error::Error> = Box::new(EngineError::InvalidConfigValue {
            key: "label_style".to_string(),
            value: "fancy".to_string(),
        });
        let err = from_boxed(boxed, ApiError::InternalError);
        assert!(matches!(err, ApiError::ConfigError(msg) if msg.contains("fancy")));
    }

    #[test]
    fn test_boxed_unknown_error_uses_fallback() {
        let boxed: Box<dyn std::error::Error> = "锁获取失败".into();
        let err = from_boxed(boxed, ApiError::SourceError);
        assert!(matches!(err, ApiError::SourceError(_)));
    }

    #[test]
    fn test_import_file_not_found_maps_to_not_found() {
        let err = ApiError::from(ImportError::FileNotFound("orders.csv".to_string()));
        assert!(err.to_string().contains("orders.csv"));
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
