// ==========================================
// 月度销售趋势分析 - 命令行入口
// ==========================================
// 用法:
//   sales-trend [--db PATH | --csv DIR] [--estimator cumulative|global]
//               [--labels plain|arrow] [--percent zero|null] [--baseline zero|none]
//               [--horizon N] [--json] [--reconcile] [--chart FILE.svg]
// ==========================================

use sales_trend::api::{
    render_json, render_reconciliation, render_report, write_chart_svg, JsonOutput, ReportApi,
};
use sales_trend::config::{ConfigOverrides, MAX_FORECAST_HORIZON};
use sales_trend::db::DEFAULT_DB_FILE;
use sales_trend::domain::types::{BaselinePolicy, ForecastEstimator, LabelStyle, PercentSurfacing};
use sales_trend::logging;
use std::error::Error;
use std::path::PathBuf;

const USAGE: &str = "usage: sales-trend [--db PATH | --csv DIR] [--estimator cumulative|global] \
[--labels plain|arrow] [--percent zero|null] [--baseline zero|none] [--horizon N] \
[--json] [--reconcile] [--chart FILE.svg]";

#[derive(Debug, Clone, PartialEq)]
enum SourceArg {
    Database(String),
    CsvDir(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
struct CliArgs {
    source: SourceArg,
    overrides: ConfigOverrides,
    json: bool,
    reconcile: bool,
    chart: Option<PathBuf>,
    help: bool,
}

fn parse_args<I: Iterator<Item = String>>(mut args: I) -> Result<CliArgs, String> {
    let mut db: Option<String> = None;
    let mut csv: Option<PathBuf> = None;
    let mut overrides = ConfigOverrides::default();
    let mut json = false;
    let mut reconcile = false;
    let mut chart: Option<PathBuf> = None;
    let mut help = false;

    while let Some(arg) = args.next() {
        let mut value = |flag: &str| {
            args.next()
                .filter(|v| !v.starts_with("--"))
                .ok_or_else(|| format!("{} 需要一个参数", flag))
        };

        match arg.as_str() {
            "--db" => db = Some(value("--db")?),
            "--csv" => csv = Some(PathBuf::from(value("--csv")?)),
            "--estimator" => {
                let v = value("--estimator")?;
                overrides.forecast_estimator = Some(
                    ForecastEstimator::from_str(&v).ok_or_else(|| format!("未知估计器: {}", v))?,
                );
            }
            "--labels" => {
                let v = value("--labels")?;
                overrides.label_style =
                    Some(LabelStyle::from_str(&v).ok_or_else(|| format!("未知标签风格: {}", v))?);
            }
            "--percent" => {
                let v = value("--percent")?;
                overrides.percent_surfacing = Some(
                    PercentSurfacing::from_str(&v).ok_or_else(|| format!("未知百分比口径: {}", v))?,
                );
            }
            "--baseline" => {
                let v = value("--baseline")?;
                overrides.baseline_policy = Some(
                    BaselinePolicy::from_str(&v).ok_or_else(|| format!("未知基期口径: {}", v))?,
                );
            }
            "--horizon" => {
                let v = value("--horizon")?;
                let horizon = v
                    .parse::<u32>()
                    .ok()
                    .filter(|h| *h <= MAX_FORECAST_HORIZON)
                    .ok_or_else(|| format!("无效的预测月数: {}（0..={}）", v, MAX_FORECAST_HORIZON))?;
                overrides.forecast_horizon = Some(horizon);
            }
            "--json" => json = true,
            "--reconcile" => reconcile = true,
            "--chart" => chart = Some(PathBuf::from(value("--chart")?)),
            "-h" | "--help" => help = true,
            other => return Err(format!("未知参数: {}", other)),
        }
    }

    let source = match (db, csv) {
        (Some(_), Some(_)) => return Err("--db 与 --csv 只能二选一".to_string()),
        (None, Some(dir)) => SourceArg::CsvDir(dir),
        (Some(path), None) => SourceArg::Database(path),
        (None, None) => SourceArg::Database(DEFAULT_DB_FILE.to_string()),
    };

    Ok(CliArgs {
        source,
        overrides,
        json,
        reconcile,
        chart,
        help,
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = match parse_args(std::env::args().skip(1)) {
        Ok(cli) => cli,
        Err(msg) => {
            eprintln!("{}\n{}", msg, USAGE);
            std::process::exit(2);
        }
    };
    if cli.help {
        println!("{}", USAGE);
        return Ok(());
    }

    logging::init();
    tracing::info!("{} v{}", sales_trend::APP_NAME, sales_trend::VERSION);

    let mut api = match &cli.source {
        SourceArg::Database(path) => ReportApi::open_database(path)?,
        SourceArg::CsvDir(dir) => ReportApi::open_csv_dir(dir)?,
    };
    api.apply_overrides(&cli.overrides);

    let report = api.generate_report()?;
    let reconciliation = if cli.reconcile {
        Some(api.reconcile_payments()?)
    } else {
        None
    };

    if let Some(path) = &cli.chart {
        if report.rows.is_empty() {
            tracing::warn!("没有有效月份数据，跳过图表输出");
        } else {
            write_chart_svg(&report, path)?;
        }
    }

    if cli.json {
        let source = api.source_description();
        let output = JsonOutput {
            source: &source,
            config: api.config(),
            report: &report,
            reconciliation: reconciliation.as_ref(),
        };
        println!("{}", render_json(&output)?);
    } else {
        print!("{}", render_report(&report));
        if let Some(recon) = &reconciliation {
            println!();
            print!("{}", render_reconciliation(recon));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliArgs, String> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_defaults_to_database_file() {
        let cli = parse(&[]).unwrap();
        assert_eq!(cli.source, SourceArg::Database(DEFAULT_DB_FILE.to_string()));
        assert_eq!(cli.overrides, ConfigOverrides::default());
        assert!(!cli.json && !cli.reconcile);
        assert_eq!(cli.chart, None);
    }

    #[test]
    fn test_parses_all_flags() {
        let cli = parse(&[
            "--csv", "data", "--estimator", "global", "--labels", "arrow", "--percent", "null",
            "--baseline", "none", "--horizon", "6", "--json", "--reconcile",
            "--chart", "trend.svg",
        ])
        .unwrap();

        assert_eq!(cli.source, SourceArg::CsvDir(PathBuf::from("data")));
        assert_eq!(cli.overrides.forecast_estimator, Some(ForecastEstimator::Global));
        assert_eq!(cli.overrides.label_style, Some(LabelStyle::Arrow));
        assert_eq!(cli.overrides.percent_surfacing, Some(PercentSurfacing::Null));
        assert_eq!(cli.overrides.baseline_policy, Some(BaselinePolicy::None));
        assert_eq!(cli.overrides.forecast_horizon, Some(6));
        assert!(cli.json && cli.reconcile);
        assert_eq!(cli.chart, Some(PathBuf::from("trend.svg")));
    }

    #[test]
    fn test_rejects_conflicting_and_unknown_args() {
        assert!(parse(&["--db", "a.db", "--csv", "dir"]).is_err());
        assert!(parse(&["--estimator", "magic"]).is_err());
        assert!(parse(&["--db"]).is_err());
        assert!(parse(&["--verbose"]).is_err());
        assert!(parse(&["--horizon", "4000000000"]).is_err());
    }
}
