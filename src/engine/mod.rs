// ==========================================
// 月度销售趋势分析 - 引擎层
// ==========================================
// 职责: 聚合 / 排序 / 趋势指标 / 预测 / 汇总 / 支付对账
// 红线: Engine 不拼 SQL，不做取整以外的呈现
// ==========================================

pub mod aggregator;
pub mod error;
pub mod forecaster;
pub mod pipeline;
pub mod reconciliation;
pub mod sequencer;
pub mod summary;
pub mod trend;

// 重导出核心引擎
pub use aggregator::{AggregationOutcome, MonthlyAggregator};
pub use error::{EngineError, EngineResult};
pub use forecaster::Forecaster;
pub use pipeline::TrendPipeline;
pub use reconciliation::{PaymentReconciler, DEFAULT_TOLERANCE};
pub use sequencer::MonthSequencer;
pub use summary::SummaryCalculator;
pub use trend::{TrendCalculator, MOVING_AVERAGE_WINDOW};
