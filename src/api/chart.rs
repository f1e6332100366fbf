// ==========================================
// 月度销售趋势分析 - 趋势图表
// ==========================================
// 输出: 2×2 面板 SVG
//   [收入走势]          [环比变化额柱状图]
//   [趋势线 + 多月预测]  [环比百分比柱状图]
// 红线: 只读取 SalesTrendReport，不重新计算任何指标（趋势线拟合除外）
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::report::SalesTrendReport;
use plotters::prelude::*;
use std::fmt::Display;
use std::fs;
use std::path::Path;
use tracing::{info, instrument};

const CHART_SIZE: (u32, u32) = (1600, 1000);
const FONT: &str = "sans-serif";

const REVENUE_COLOR: RGBColor = RGBColor(0x2E, 0x86, 0xAB);
const TREND_COLOR: RGBColor = RGBColor(0xFF, 0xA5, 0x00);
const FORECAST_COLOR: RGBColor = RGBColor(0x28, 0xA7, 0x45);
const DECLINE_COLOR: RGBColor = RGBColor(0xDC, 0x35, 0x45);
const FLAT_COLOR: RGBColor = RGBColor(0x6C, 0x75, 0x7D);

/// 渲染并写出 SVG 文件
#[instrument(skip(report), fields(path = %path.display(), months = report.rows.len()))]
pub fn write_chart_svg(report: &SalesTrendReport, path: &Path) -> ApiResult<()> {
    let svg = render_chart_svg(report)?;
    fs::write(path, svg).map_err(|e| {
        ApiError::InternalError(format!("图表写出失败 ({}): {}", path.display(), e))
    })?;
    info!("趋势图表已写出");
    Ok(())
}

/// 渲染 SVG 文本
pub fn render_chart_svg(report: &SalesTrendReport) -> ApiResult<String> {
    if report.rows.is_empty() {
        return Err(ApiError::InvalidInput("没有可绘制的月份数据".to_string()));
    }

    let months: Vec<String> = report.rows.iter().map(|r| r.month.clone()).collect();
    let revenues: Vec<f64> = report.rows.iter().map(|r| r.monthly_revenue).collect();
    let changes: Vec<f64> = report.rows.iter().map(|r| r.revenue_change).collect();
    let percents: Vec<f64> = report
        .rows
        .iter()
        .map(|r| r.percent_change.unwrap_or(0.0))
        .collect();

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;
        let root = root
            .titled("Monthly Sales Trend Analysis and Forecasting", (FONT, 28))
            .map_err(chart_error)?;
        let panels = root.split_evenly((2, 2));

        draw_revenue(&panels[0], &months, &revenues)?;
        draw_bars(
            &panels[1],
            "Month-to-Month Revenue Change",
            "Revenue Change ($)",
            &months,
            &changes,
        )?;
        draw_forecast(&panels[2], report, &months, &revenues)?;
        draw_bars(
            &panels[3],
            "Month-to-Month Percentage Change",
            "Percentage Change (%)",
            &months,
            &percents,
        )?;

        root.present().map_err(chart_error)?;
    }
    Ok(svg)
}

fn draw_revenue<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    months: &[String],
    revenues: &[f64],
) -> ApiResult<()> {
    let (lo, hi) = padded_range(revenues.iter().copied(), false);
    let mut chart = ChartBuilder::on(area)
        .caption("Monthly Revenue Over Time", (FONT, 20))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(-0.5f64..(months.len() as f64 - 0.5), lo..hi)
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .x_desc("Month")
        .y_desc("Revenue ($)")
        .x_labels(months.len().min(12))
        .x_label_formatter(&|x: &f64| month_label(months, *x))
        .draw()
        .map_err(chart_error)?;

    let points: Vec<(f64, f64)> = indexed(revenues);
    chart
        .draw_series(LineSeries::new(points.clone(), REVENUE_COLOR.stroke_width(3)))
        .map_err(chart_error)?;
    chart
        .draw_series(points.into_iter().map(|p| Circle::new(p, 4, REVENUE_COLOR.filled())))
        .map_err(chart_error)?;
    Ok(())
}

fn draw_bars<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    caption: &str,
    y_desc: &str,
    months: &[String],
    values: &[f64],
) -> ApiResult<()> {
    let (lo, hi) = padded_range(values.iter().copied(), true);
    let x_max = months.len() as f64 - 0.5;
    let mut chart = ChartBuilder::on(area)
        .caption(caption, (FONT, 20))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(-0.5f64..x_max, lo..hi)
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .x_desc("Month")
        .y_desc(y_desc)
        .x_labels(months.len().min(12))
        .x_label_formatter(&|x: &f64| month_label(months, *x))
        .draw()
        .map_err(chart_error)?;

    chart
        .draw_series(values.iter().enumerate().map(|(i, v)| {
            let x = i as f64;
            Rectangle::new([(x - 0.4, 0.0), (x + 0.4, *v)], sign_color(*v).mix(0.8).filled())
        }))
        .map_err(chart_error)?;
    chart
        .draw_series(LineSeries::new(vec![(-0.5, 0.0), (x_max, 0.0)], BLACK.stroke_width(1)))
        .map_err(chart_error)?;
    Ok(())
}

fn draw_forecast<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    report: &SalesTrendReport,
    months: &[String],
    revenues: &[f64],
) -> ApiResult<()> {
    let labels: Vec<String> = months
        .iter()
        .cloned()
        .chain(report.forecast.iter().map(|p| p.month.clone()))
        .collect();
    let last = revenues.len() - 1;
    let forecast_points: Vec<(f64, f64)> = std::iter::once((last as f64, revenues[last]))
        .chain(
            report
                .forecast
                .iter()
                .map(|p| ((last + p.period) as f64, p.forecasted_revenue)),
        )
        .collect();

    let (lo, hi) = padded_range(
        revenues
            .iter()
            .copied()
            .chain(forecast_points.iter().map(|(_, y)| *y)),
        false,
    );
    let mut chart = ChartBuilder::on(area)
        .caption("Revenue Trend with Forecast", (FONT, 20))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(-0.5f64..(labels.len() as f64 - 0.5), lo..hi)
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .x_desc("Month")
        .y_desc("Revenue ($)")
        .x_labels(labels.len().min(12))
        .x_label_formatter(&|x: &f64| month_label(&labels, *x))
        .draw()
        .map_err(chart_error)?;

    chart
        .draw_series(LineSeries::new(indexed(revenues), REVENUE_COLOR.stroke_width(3)))
        .map_err(chart_error)?
        .label("Historical Revenue")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], REVENUE_COLOR));

    if let Some((slope, intercept)) = least_squares(revenues) {
        let trend = vec![(0.0, intercept), (last as f64, intercept + slope * last as f64)];
        chart
            .draw_series(LineSeries::new(trend, TREND_COLOR.stroke_width(2)))
            .map_err(chart_error)?
            .label("Trend Line")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], TREND_COLOR));
    }

    if !report.forecast.is_empty() {
        chart
            .draw_series(LineSeries::new(
                vec![(last as f64, lo), (last as f64, hi)],
                FLAT_COLOR.stroke_width(1),
            ))
            .map_err(chart_error)?;
        chart
            .draw_series(LineSeries::new(forecast_points.clone(), FORECAST_COLOR.stroke_width(3)))
            .map_err(chart_error)?
            .label(format!("Forecast (Next {} Months)", report.forecast.len()))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], FORECAST_COLOR));
        chart
            .draw_series(
                forecast_points
                    .into_iter()
                    .skip(1)
                    .map(|p| Circle::new(p, 5, FORECAST_COLOR.filled())),
            )
            .map_err(chart_error)?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.9))
        .border_style(BLACK)
        .draw()
        .map_err(chart_error)?;
    Ok(())
}

fn chart_error<E: Display>(err: E) -> ApiError {
    ApiError::InternalError(format!("图表绘制失败: {}", err))
}

fn indexed(values: &[f64]) -> Vec<(f64, f64)> {
    values.iter().enumerate().map(|(i, v)| (i as f64, *v)).collect()
}

fn sign_color(value: f64) -> RGBColor {
    if value > 0.0 {
        FORECAST_COLOR
    } else if value < 0.0 {
        DECLINE_COLOR
    } else {
        FLAT_COLOR
    }
}

/// 刻度位置 → 月份标签（非整数刻度留空）
fn month_label(labels: &[String], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

/// 纵轴范围，两端各留 10% 余量；柱状图包含 0
fn padded_range(values: impl Iterator<Item = f64>, include_zero: bool) -> (f64, f64) {
    let init = if include_zero { (0.0, 0.0) } else { (f64::INFINITY, f64::NEG_INFINITY) };
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold(init, |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let pad = if hi > lo { (hi - lo) * 0.1 } else { lo.abs().max(1.0) * 0.1 };
    (lo - pad, hi + pad)
}

/// 最小二乘直线 (slope, intercept)，x 取 0..n
fn least_squares(values: &[f64]) -> Option<(f64, f64)> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let nf = n as f64;
    let mean_x = (nf - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / nf;
    let (num, den) = values.iter().enumerate().fold((0.0, 0.0), |(num, den), (i, y)| {
        let dx = i as f64 - mean_x;
        (num + dx * (y - mean_y), den + dx * dx)
    });
    let slope = num / den;
    Some((slope, mean_y - slope * mean_x))
}
