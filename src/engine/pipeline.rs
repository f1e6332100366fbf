// ==========================================
// 月度销售趋势分析 - 计算流水线
// ==========================================
// 用途: 协调 聚合 → 排序 → 趋势/预测 → 汇总 的执行顺序
// 输出: SalesTrendReport（呈现口径，金额保留两位小数）
// ==========================================

use crate::config::ReportConfig;
use crate::domain::report::{OverallTrend, ReportRow, SalesTrendReport, SummaryStatistics};
use crate::domain::sales::OrderLineFact;
use crate::domain::trend::round2;
use crate::engine::aggregator::MonthlyAggregator;
use crate::engine::error::EngineResult;
use crate::engine::forecaster::Forecaster;
use crate::engine::sequencer::MonthSequencer;
use crate::engine::summary::SummaryCalculator;
use crate::engine::trend::TrendCalculator;
use tracing::{debug, info, instrument};

// ==========================================
// TrendPipeline - 趋势计算流水线
// ==========================================
pub struct TrendPipeline {
    config: ReportConfig,
    aggregator: MonthlyAggregator,
    sequencer: MonthSequencer,
    summary: SummaryCalculator,
}

impl TrendPipeline {
    pub fn new(config: ReportConfig) -> Self {
        Self {
            config,
            aggregator: MonthlyAggregator::new(),
            sequencer: MonthSequencer::new(),
            summary: SummaryCalculator::new(),
        }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// 执行完整计算
    ///
    /// # 流程
    /// 0. 校验配置取值范围
    /// 1. 按月聚合（坏行跳过并记录）
    /// 2. 月份排序并分配序号
    /// 3. 计算全局平均变化，构造预测器
    /// 4. 逐月趋势指标 + 下月预测
    /// 5. 汇总统计 / 整体趋势 / 向后多月预测
    #[instrument(skip(self, facts), fields(rows = facts.len(), estimator = %self.config.forecast_estimator))]
    pub fn run(&self, facts: &[OrderLineFact]) -> EngineResult<SalesTrendReport> {
        self.config.validate()?;

        let outcome = self.aggregator.aggregate(facts);
        debug!(
            months = outcome.months.len(),
            skipped = outcome.skipped.len(),
            "聚合完成"
        );

        let months = self.sequencer.sequence(outcome.months)?;
        let forecaster = Forecaster::new(self.config.forecast_estimator, &months);
        let records = TrendCalculator::new(self.config.baseline_policy).calculate(&months, &forecaster);

        let last_avg = records.last().and_then(|r| r.avg_change_to_date);
        let forecast = forecaster
            .project(&months, last_avg, self.config.forecast_horizon)
            .into_iter()
            .map(|mut point| {
                point.forecasted_revenue = round2(point.forecasted_revenue);
                point
            })
            .collect();

        let rows: Vec<ReportRow> = records
            .iter()
            .map(|r| ReportRow::from_record(r, self.config.percent_surfacing, self.config.label_style))
            .collect();

        let report = SalesTrendReport {
            estimator: self.config.forecast_estimator,
            rows,
            summary: round_summary(self.summary.summarize(&records)),
            overall_trend: round_overall(self.summary.overall_trend(&records)),
            forecast,
            skipped_rows: outcome.skipped,
        };

        info!(
            months = report.rows.len(),
            skipped = report.skipped_rows.len(),
            direction = report.overall_trend.direction.describe(),
            "趋势报表计算完成"
        );
        Ok(report)
    }
}

fn round_summary(s: SummaryStatistics) -> SummaryStatistics {
    SummaryStatistics {
        total_months: s.total_months,
        total_revenue: round2(s.total_revenue),
        avg_monthly_revenue: round2(s.avg_monthly_revenue),
        min_monthly_revenue: round2(s.min_monthly_revenue),
        max_monthly_revenue: round2(s.max_monthly_revenue),
        avg_monthly_change: round2(s.avg_monthly_change),
        avg_percent_change: round2(s.avg_percent_change),
    }
}

fn round_overall(t: OverallTrend) -> OverallTrend {
    OverallTrend {
        overall_slope: round2(t.overall_slope),
        avg_monthly_revenue: round2(t.avg_monthly_revenue),
        direction: t.direction,
    }
}
