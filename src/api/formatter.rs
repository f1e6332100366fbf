// ==========================================
// 月度销售趋势分析 - 报表渲染
// ==========================================
// 输出: 控制台文本表格 / JSON
// 红线: 只做排版，不改动任何数值
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ReportConfig;
use crate::domain::report::{ReconciliationReport, ReportRow, SalesTrendReport};
use serde::Serialize;
use std::fmt;

const RULE_WIDTH: usize = 132;

/// JSON 输出的顶层结构
#[derive(Debug, Serialize)]
pub struct JsonOutput<'a> {
    pub source: &'a str,
    pub config: &'a ReportConfig,
    pub report: &'a SalesTrendReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconciliation: Option<&'a ReconciliationReport>,
}

pub fn render_json(output: &JsonOutput<'_>) -> ApiResult<String> {
    serde_json::to_string_pretty(output)
        .map_err(|e| ApiError::InternalError(format!("JSON 序列化失败: {}", e)))
}

/// 趋势报表文本
pub fn render_report(report: &SalesTrendReport) -> String {
    ReportText(report).to_string()
}

/// 支付对账文本
pub fn render_reconciliation(report: &ReconciliationReport) -> String {
    ReconciliationText(report).to_string()
}

struct ReportText<'a>(&'a SalesTrendReport);

impl fmt::Display for ReportText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        let rule = "=".repeat(RULE_WIDTH);

        writeln!(f, "{}", rule)?;
        writeln!(f, "MONTHLY SALES TREND ANALYSIS (forecast: {})", report.estimator)?;
        writeln!(f, "{}", rule)?;

        if report.rows.is_empty() {
            writeln!(f, "No valid order data.")?;
        } else {
            writeln!(
                f,
                "{:<8} {:>12} {:>6} {:>12} {:>11} {:>9} {:>12} {:>11} {:<12} {:>12} {:>10}",
                "Month",
                "Revenue",
                "Orders",
                "Prev",
                "Change",
                "Change%",
                "MovingAvg3",
                "AvgChange",
                "Trend",
                "Forecast",
                "Slope"
            )?;
            writeln!(f, "{}", "-".repeat(RULE_WIDTH))?;
            for row in &report.rows {
                writeln!(f, "{}", render_row(row))?;
            }
        }

        let s = &report.summary;
        writeln!(f)?;
        writeln!(f, "SUMMARY STATISTICS")?;
        writeln!(f, "{}", "-".repeat(40))?;
        writeln!(f, "Total months:            {}", s.total_months)?;
        writeln!(f, "Total revenue:           {:.2}", s.total_revenue)?;
        writeln!(f, "Average monthly revenue: {:.2}", s.avg_monthly_revenue)?;
        writeln!(f, "Min monthly revenue:     {:.2}", s.min_monthly_revenue)?;
        writeln!(f, "Max monthly revenue:     {:.2}", s.max_monthly_revenue)?;
        writeln!(f, "Average monthly change:  {:.2}", s.avg_monthly_change)?;
        writeln!(f, "Average percent change:  {:.2}%", s.avg_percent_change)?;

        let t = &report.overall_trend;
        writeln!(f)?;
        writeln!(f, "OVERALL TREND")?;
        writeln!(f, "{}", "-".repeat(40))?;
        writeln!(f, "Slope per month:         {:.2}", t.overall_slope)?;
        writeln!(f, "Direction:               {}", t.direction.describe())?;

        if !report.forecast.is_empty() {
            writeln!(f)?;
            writeln!(f, "FORECAST")?;
            writeln!(f, "{}", "-".repeat(40))?;
            for point in &report.forecast {
                writeln!(
                    f,
                    "+{} {:<8} {:>12.2}",
                    point.period, point.month, point.forecasted_revenue
                )?;
            }
        }

        if !report.skipped_rows.is_empty() {
            writeln!(f)?;
            writeln!(f, "Skipped {} malformed order line(s).", report.skipped_rows.len())?;
        }

        Ok(())
    }
}

fn render_row(row: &ReportRow) -> String {
    let percent = row
        .percent_change
        .map(|p| format!("{:.2}", p))
        .unwrap_or_else(|| "-".to_string());
    let slope = row
        .estimated_slope
        .map(|s| format!("{:.2}", s))
        .unwrap_or_else(|| "-".to_string());

    format!(
        "{:<8} {:>12.2} {:>6} {:>12.2} {:>11.2} {:>9} {:>12.2} {:>11.2} {:<12} {:>12.2} {:>10}",
        row.month,
        row.monthly_revenue,
        row.order_count,
        row.previous_month_revenue,
        row.revenue_change,
        percent,
        row.moving_avg_3,
        row.avg_change_to_date,
        row.trend,
        row.forecast_next_month,
        slope
    )
}

struct ReconciliationText<'a>(&'a ReconciliationReport);

impl fmt::Display for ReconciliationText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        writeln!(f, "PAYMENT RECONCILIATION")?;
        writeln!(f, "{}", "-".repeat(60))?;
        writeln!(
            f,
            "Orders: {}  Matching: {}  Mismatching: {}  Match rate: {:.2}%",
            report.total_orders,
            report.matching,
            report.mismatching,
            report.match_rate()
        )?;

        let mismatches: Vec<_> = report
            .checks
            .iter()
            .filter(|c| c.status == crate::domain::types::PaymentCheckStatus::Mismatch)
            .collect();
        if !mismatches.is_empty() {
            writeln!(
                f,
                "{:>8} {:>12} {:>12} {:>12}",
                "Order", "Total", "Paid", "Difference"
            )?;
            for check in mismatches {
                let paid = check
                    .payment_amount
                    .map(|a| format!("{:.2}", a))
                    .unwrap_or_else(|| "-".to_string());
                writeln!(
                    f,
                    "{:>8} {:>12.2} {:>12} {:>12.2}",
                    check.order_id, check.order_total, paid, check.difference
                )?;
            }
        }

        if !report.orders_without_payment.is_empty() {
            let ids: Vec<String> = report
                .orders_without_payment
                .iter()
                .map(|c| c.order_id.to_string())
                .collect();
            writeln!(f, "Orders without payment: {}", ids.join(", "))?;
        }
        if !report.orphan_payments.is_empty() {
            writeln!(
                f,
                "Payments referencing unknown orders: {}",
                report.orphan_payments.len()
            )?;
        }
        Ok(())
    }
}
