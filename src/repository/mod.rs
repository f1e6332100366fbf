// ==========================================
// 月度销售趋势分析 - 数据仓储层
// ==========================================
// 职责: 提供源数据访问接口,屏蔽 SQLite / CSV 细节
// 约束: 所有查询使用参数化
// 红线: Repository 不含业务逻辑
// ==========================================

pub mod error;
pub mod sales_repo;
pub mod sales_source;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use sales_repo::{SalesRepository, TableCounts};
pub use sales_source::{ReconciliationInput, SalesSource};
