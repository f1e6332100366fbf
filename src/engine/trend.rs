// ==========================================
// 月度销售趋势分析 - 趋势计算器
// ==========================================
// 职责: 在时间有序序列上逐月派生环比/移动平均/累计均值/斜率/标签
// 输入: SequencedMonth（已按时间排序）
// 输出: TrendRecord（全精度，取整留给呈现层）
// ==========================================
// 窗口实现:
// - LAG              → 上一个元素
// - 3 月移动平均      → 定长尾部缓冲 + 滚动和
// - 累计平均变化      → 前缀滚动和 + 计数
// - 两点斜率          → (rev[i] - rev[1]) / (i - 1)
// 红线: 所有除法显式检查分母，不产生 NaN/∞
// ==========================================

use crate::domain::trend::{SequencedMonth, TrendRecord};
use crate::domain::types::{BaselinePolicy, TrendLabel};
use crate::engine::forecaster::Forecaster;
use std::collections::VecDeque;
use tracing::{debug, instrument};

/// 移动平均窗口（月）
pub const MOVING_AVERAGE_WINDOW: usize = 3;

pub struct TrendCalculator {
    baseline: BaselinePolicy,
}

impl TrendCalculator {
    pub fn new(baseline: BaselinePolicy) -> Self {
        Self { baseline }
    }

    /// 逐月计算趋势指标
    ///
    /// 序列必须已由 MonthSequencer 排序；本函数只做单遍顺序扫描
    #[instrument(skip(self, months, forecaster), fields(count = months.len(), baseline = %self.baseline))]
    pub fn calculate(
        &self,
        months: &[SequencedMonth],
        forecaster: &Forecaster,
    ) -> Vec<TrendRecord> {
        let mut records = Vec::with_capacity(months.len());

        let mut window: VecDeque<f64> = VecDeque::with_capacity(MOVING_AVERAGE_WINDOW);
        let mut window_sum = 0.0;
        let mut change_sum = 0.0;
        let mut change_count = 0usize;

        let first_revenue = months.first().map(|m| m.total_revenue());
        let mut previous: Option<f64> = None;

        for (idx, month) in months.iter().enumerate() {
            let revenue = month.total_revenue();

            // 环比变化
            let revenue_change = match (previous, self.baseline) {
                (Some(prev), _) => Some(revenue - prev),
                (None, BaselinePolicy::Zero) => Some(revenue),
                (None, BaselinePolicy::None) => None,
            };

            let percent_change = match previous {
                Some(prev) if prev > 0.0 => Some((revenue - prev) / prev * 100.0),
                _ => None,
            };

            // 3 月移动平均
            if window.len() == MOVING_AVERAGE_WINDOW {
                if let Some(oldest) = window.pop_front() {
                    window_sum -= oldest;
                }
            }
            window.push_back(revenue);
            window_sum += revenue;
            let moving_avg_3 = window_sum / window.len() as f64;

            // 累计平均变化
            if let Some(change) = revenue_change {
                change_sum += change;
                change_count += 1;
            }
            let avg_change_to_date = if change_count > 0 {
                Some(change_sum / change_count as f64)
            } else {
                None
            };

            // 首月到当月的两点斜率
            let slope_estimate = match (first_revenue, idx) {
                (Some(first), i) if i > 0 => Some((revenue - first) / i as f64),
                _ => None,
            };

            records.push(TrendRecord {
                month: month.clone(),
                previous_revenue: previous,
                revenue_change,
                percent_change,
                moving_avg_3,
                avg_change_to_date,
                trend_label: TrendLabel::from_change(revenue_change),
                forecast_next: forecaster.forecast_next(revenue, avg_change_to_date),
                slope_estimate,
            });

            previous = Some(revenue);
        }

        debug!(records = records.len(), "趋势计算完成");
        records
    }
}

impl Default for TrendCalculator {
    fn default() -> Self {
        Self::new(BaselinePolicy::default())
    }
}
