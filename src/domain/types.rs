// ==========================================
// 月度销售趋势分析 - 领域类型定义
// ==========================================
// 职责: 趋势标签 + 报表口径选项（预测估计器 / 标签风格 / 百分比呈现 / 基期口径）
// 约定: to_db_str 与 config_kv 中存储的取值保持一致
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 趋势标签 (Trend Label)
// ==========================================
// 由 revenue_change 的符号决定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendLabel {
    Growing,       // 环比增长
    Declining,     // 环比下降
    Stable,        // 持平
    NotApplicable, // 无可比基期
}

impl TrendLabel {
    /// 根据环比变化额判定标签
    pub fn from_change(change: Option<f64>) -> Self {
        match change {
            Some(c) if c > 0.0 => TrendLabel::Growing,
            Some(c) if c < 0.0 => TrendLabel::Declining,
            Some(_) => TrendLabel::Stable,
            None => TrendLabel::NotApplicable,
        }
    }

    /// 按标签风格输出展示文本
    pub fn render(&self, style: LabelStyle) -> &'static str {
        match (style, self) {
            (LabelStyle::Plain, TrendLabel::Growing) => "Growing",
            (LabelStyle::Plain, TrendLabel::Declining) => "Declining",
            (LabelStyle::Plain, TrendLabel::Stable) => "Stable",
            (LabelStyle::Arrow, TrendLabel::Growing) => "↑ Growing",
            (LabelStyle::Arrow, TrendLabel::Declining) => "↓ Declining",
            (LabelStyle::Arrow, TrendLabel::Stable) => "→ Stable",
            (_, TrendLabel::NotApplicable) => "N/A",
        }
    }
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(LabelStyle::Plain))
    }
}

// ==========================================
// 预测估计器 (Forecast Estimator)
// ==========================================
// Cumulative: 当月收入 + 截至当月的累计平均变化
// Global:     当月收入 + 全序列环比变化均值（一次性计算的常量）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ForecastEstimator {
    #[default]
    Cumulative,
    Global,
}

impl fmt::Display for ForecastEstimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl ForecastEstimator {
    /// 从字符串解析估计器
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "cumulative" | "cumulative_average" => Some(ForecastEstimator::Cumulative),
            "global" | "global_average" => Some(ForecastEstimator::Global),
            _ => None,
        }
    }

    /// 转换为配置存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ForecastEstimator::Cumulative => "cumulative",
            ForecastEstimator::Global => "global",
        }
    }
}

// ==========================================
// 标签风格 (Label Style)
// ==========================================
// Plain: Growing / Declining / Stable
// Arrow: ↑ Growing / ↓ Declining / → Stable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LabelStyle {
    #[default]
    Plain,
    Arrow,
}

impl fmt::Display for LabelStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl LabelStyle {
    /// 从字符串解析标签风格
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "plain" | "words" => Some(LabelStyle::Plain),
            "arrow" | "symbols" => Some(LabelStyle::Arrow),
            _ => None,
        }
    }

    /// 转换为配置存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            LabelStyle::Plain => "plain",
            LabelStyle::Arrow => "arrow",
        }
    }
}

// ==========================================
// 百分比呈现口径 (Percent Surfacing)
// ==========================================
// 前值缺失或为 0 时 percent_change 无定义
// Zero: 输出 0（与原报表一致）; Null: 输出空值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PercentSurfacing {
    #[default]
    Zero,
    Null,
}

impl fmt::Display for PercentSurfacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl PercentSurfacing {
    /// 从字符串解析百分比呈现口径
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "zero" | "0" => Some(PercentSurfacing::Zero),
            "null" | "none" | "undefined" => Some(PercentSurfacing::Null),
            _ => None,
        }
    }

    /// 转换为配置存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            PercentSurfacing::Zero => "zero",
            PercentSurfacing::Null => "null",
        }
    }
}

// ==========================================
// 基期口径 (Baseline Policy)
// ==========================================
// 首月没有上月收入:
// Zero: 上月按 0 计，首月变化额 = 首月收入，参与累计均值
// None: 首月变化额无定义，标签 N/A，不参与累计均值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BaselinePolicy {
    #[default]
    Zero,
    None,
}

impl fmt::Display for BaselinePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl BaselinePolicy {
    /// 从字符串解析基期口径
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "zero" | "0" => Some(BaselinePolicy::Zero),
            "none" | "null" => Some(BaselinePolicy::None),
            _ => None,
        }
    }

    /// 转换为配置存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            BaselinePolicy::Zero => "zero",
            BaselinePolicy::None => "none",
        }
    }
}

// ==========================================
// 对账状态 (Payment Check Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentCheckStatus {
    Match,    // 金额一致
    Mismatch, // 金额不一致
}

impl fmt::Display for PaymentCheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentCheckStatus::Match => write!(f, "MATCH"),
            PaymentCheckStatus::Mismatch => write!(f, "MISMATCH"),
        }
    }
}
