// ==========================================
// 月度销售趋势分析 - 报表口径配置
// ==========================================

use crate::config::config_keys;
use crate::domain::types::{BaselinePolicy, ForecastEstimator, LabelStyle, PercentSurfacing};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::reconciliation::DEFAULT_TOLERANCE;
use serde::{Deserialize, Serialize};

/// 默认向后预测月数
pub const DEFAULT_FORECAST_HORIZON: u32 = 3;

/// 向后预测月数上限（0 表示不做多月预测）
pub const MAX_FORECAST_HORIZON: u32 = 120;

/// 报表口径配置
///
/// 存储位置：config_kv（scope_id='global'），每个字段一个 key，见 `config_keys`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// 下月预测使用的估计器（cumulative / global）
    #[serde(default)]
    pub forecast_estimator: ForecastEstimator,

    /// 趋势标签风格（plain / arrow）
    #[serde(default)]
    pub label_style: LabelStyle,

    /// 无定义百分比的呈现方式（zero / null）
    #[serde(default)]
    pub percent_surfacing: PercentSurfacing,

    /// 首月基期口径（zero / none）
    #[serde(default)]
    pub baseline_policy: BaselinePolicy,

    /// 向后预测月数
    #[serde(default = "default_forecast_horizon")]
    pub forecast_horizon: u32,

    /// 支付对账容差（金额）
    #[serde(default = "default_reconciliation_tolerance")]
    pub reconciliation_tolerance: f64,
}

fn default_forecast_horizon() -> u32 {
    DEFAULT_FORECAST_HORIZON
}

fn default_reconciliation_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            forecast_estimator: ForecastEstimator::default(),
            label_style: LabelStyle::default(),
            percent_surfacing: PercentSurfacing::default(),
            baseline_policy: BaselinePolicy::default(),
            forecast_horizon: DEFAULT_FORECAST_HORIZON,
            reconciliation_tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// 命令行覆盖项（None 表示沿用已存储的配置）
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConfigOverrides {
    pub forecast_estimator: Option<ForecastEstimator>,
    pub label_style: Option<LabelStyle>,
    pub percent_surfacing: Option<PercentSurfacing>,
    pub baseline_policy: Option<BaselinePolicy>,
    pub forecast_horizon: Option<u32>,
}

impl ReportConfig {
    /// 应用覆盖项，返回新配置
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(v) = overrides.forecast_estimator {
            self.forecast_estimator = v;
        }
        if let Some(v) = overrides.label_style {
            self.label_style = v;
        }
        if let Some(v) = overrides.percent_surfacing {
            self.percent_surfacing = v;
        }
        if let Some(v) = overrides.baseline_policy {
            self.baseline_policy = v;
        }
        if let Some(v) = overrides.forecast_horizon {
            self.forecast_horizon = v;
        }
        self
    }

    /// 校验数值型配置的取值范围
    pub fn validate(&self) -> EngineResult<()> {
        if self.forecast_horizon > MAX_FORECAST_HORIZON {
            return Err(EngineError::InvalidConfigValue {
                key: config_keys::FORECAST_HORIZON.to_string(),
                value: self.forecast_horizon.to_string(),
            });
        }
        if !self.reconciliation_tolerance.is_finite() || self.reconciliation_tolerance < 0.0 {
            return Err(EngineError::InvalidConfigValue {
                key: config_keys::RECONCILIATION_TOLERANCE.to_string(),
                value: self.reconciliation_tolerance.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_only_touch_given_fields() {
        let stored = ReportConfig {
            label_style: LabelStyle::Arrow,
            ..ReportConfig::default()
        };
        let merged = stored.with_overrides(&ConfigOverrides {
            forecast_estimator: Some(ForecastEstimator::Global),
            ..Default::default()
        });

        assert_eq!(merged.forecast_estimator, ForecastEstimator::Global);
        assert_eq!(merged.label_style, LabelStyle::Arrow);
        assert_eq!(merged.forecast_horizon, DEFAULT_FORECAST_HORIZON);
    }

    #[test]
    fn test_validate_bounds_forecast_horizon() {
        let mut config = ReportConfig::default();
        assert!(config.validate().is_ok());

        config.forecast_horizon = MAX_FORECAST_HORIZON;
        assert!(config.validate().is_ok());

        config.forecast_horizon = 4_000_000_000;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidConfigValue { ref key, .. } if key == config_keys::FORECAST_HORIZON
        ));
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config: ReportConfig =
            serde_json::from_str(r#"{"forecast_estimator":"global","label_style":"arrow"}"#)
                .unwrap();

        assert_eq!(config.forecast_estimator, ForecastEstimator::Global);
        assert_eq!(config.label_style, LabelStyle::Arrow);
        assert_eq!(config.percent_surfacing, PercentSurfacing::Zero);
        assert_eq!(config.forecast_horizon, 3);
        assert_eq!(config.reconciliation_tolerance, 0.01);
    }
}
