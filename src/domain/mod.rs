// ==========================================
// 月度销售趋势分析 - 领域模型层
// ==========================================
// 职责: 定义源数据实体、趋势中间实体、报表输出对象
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod report;
pub mod sales;
pub mod trend;
pub mod types;

// 重导出核心类型
pub use report::{
    ForecastPoint, OrphanPayment, OverallTrend, PaymentCheck, ReconciliationReport, ReportRow,
    SalesTrendReport, SummaryStatistics, TrendDirection,
};
pub use sales::{
    parse_order_date, Customer, Order, OrderLine, OrderLineFact, Payment, Product, SalesDataset,
};
pub use trend::{
    round2, MonthKey, MonthlyAggregate, SequencedMonth, SkipReason, SkippedRow, TrendRecord,
};
pub use types::{
    BaselinePolicy, ForecastEstimator, LabelStyle, PaymentCheckStatus, PercentSurfacing,
    TrendLabel,
};
