// ==========================================
// 月度销售趋势分析 - API 层
// ==========================================
// 职责: 对外业务接口（报表生成 / 支付对账 / 文本与图表渲染），屏蔽数据源与配置细节
// ==========================================

pub mod chart;
pub mod error;
pub mod formatter;
pub mod report_api;

pub use chart::{render_chart_svg, write_chart_svg};
pub use error::{ApiError, ApiResult};
pub use formatter::{render_json, render_reconciliation, render_report, JsonOutput};
pub use report_api::ReportApi;
