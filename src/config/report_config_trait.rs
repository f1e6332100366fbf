// ==========================================
// 月度销售趋势分析 - 报表配置读取 Trait
// ==========================================
// 职责: 定义报表计算所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::report_config::ReportConfig;
use crate::domain::types::{BaselinePolicy, ForecastEstimator, LabelStyle, PercentSurfacing};
use std::error::Error;

// ==========================================
// ReportConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
pub trait ReportConfigReader {
    /// 获取下月预测估计器
    ///
    /// # 默认值
    /// - cumulative
    fn get_forecast_estimator(&self) -> Result<ForecastEstimator, Box<dyn Error>>;

    /// 获取趋势标签风格
    ///
    /// # 默认值
    /// - plain
    fn get_label_style(&self) -> Result<LabelStyle, Box<dyn Error>>;

    /// 获取无定义百分比的呈现口径
    ///
    /// # 默认值
    /// - zero
    fn get_percent_surfacing(&self) -> Result<PercentSurfacing, Box<dyn Error>>;

    /// 获取首月基期口径
    ///
    /// # 默认值
    /// - zero
    fn get_baseline_policy(&self) -> Result<BaselinePolicy, Box<dyn Error>>;

    /// 获取向后预测月数
    ///
    /// # 默认值
    /// - 3
    fn get_forecast_horizon(&self) -> Result<u32, Box<dyn Error>>;

    /// 获取支付对账容差
    ///
    /// # 默认值
    /// - 0.01
    fn get_reconciliation_tolerance(&self) -> Result<f64, Box<dyn Error>>;

    /// 一次性读取完整报表配置
    fn load_report_config(&self) -> Result<ReportConfig, Box<dyn Error>> {
        Ok(ReportConfig {
            forecast_estimator: self.get_forecast_estimator()?,
            label_style: self.get_label_style()?,
            percent_surfacing: self.get_percent_surfacing()?,
            baseline_policy: self.get_baseline_policy()?,
            forecast_horizon: self.get_forecast_horizon()?,
            reconciliation_tolerance: self.get_reconciliation_tolerance()?,
        })
    }
}
