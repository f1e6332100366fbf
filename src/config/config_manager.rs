// ==========================================
// 月度销售趋势分析 - 配置管理器
// ==========================================
// 职责: 报表口径配置的加载、查询、写入、快照
// 存储: config_kv 表 (scope_id='global' + key-value)
// ==========================================

use crate::config::report_config::{ReportConfig, MAX_FORECAST_HORIZON};
use crate::config::report_config_trait::ReportConfigReader;
use crate::db::open_sqlite_connection;
use crate::domain::types::{BaselinePolicy, ForecastEstimator, LabelStyle, PercentSurfacing};
use crate::engine::error::EngineError;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(config_key = key, value, "配置已更新");
        Ok(())
    }

    /// 把整份报表配置写回 config_kv
    pub fn save_report_config(&self, config: &ReportConfig) -> Result<(), Box<dyn Error>> {
        self.set_global_config_value(
            config_keys::FORECAST_ESTIMATOR,
            config.forecast_estimator.to_db_str(),
        )?;
        self.set_global_config_value(config_keys::LABEL_STYLE, config.label_style.to_db_str())?;
        self.set_global_config_value(
            config_keys::PERCENT_SURFACING,
            config.percent_surfacing.to_db_str(),
        )?;
        self.set_global_config_value(
            config_keys::BASELINE_POLICY,
            config.baseline_policy.to_db_str(),
        )?;
        self.set_global_config_value(
            config_keys::FORECAST_HORIZON,
            &config.forecast_horizon.to_string(),
        )?;
        self.set_global_config_value(
            config_keys::RECONCILIATION_TOLERANCE,
            &config.reconciliation_tolerance.to_string(),
        )?;
        Ok(())
    }

    /// 获取所有 global 配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 随报表一起输出，便于复现口径
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        let json_value = json!(config_map);
        Ok(serde_json::to_string(&json_value)?)
    }

    /// 读取枚举型配置；缺省时用默认值，无法识别时报配置错误
    fn get_parsed<T>(
        &self,
        key: &str,
        default: T,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Result<T, Box<dyn Error>> {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => parse(&raw).ok_or_else(|| {
                Box::new(EngineError::InvalidConfigValue {
                    key: key.to_string(),
                    value: raw,
                }) as Box<dyn Error>
            }),
        }
    }
}

// ==========================================
// ReportConfigReader Trait 实现
// ==========================================
impl ReportConfigReader for ConfigManager {
    fn get_forecast_estimator(&self) -> Result<ForecastEstimator, Box<dyn Error>> {
        self.get_parsed(
            config_keys::FORECAST_ESTIMATOR,
            ForecastEstimator::default(),
            ForecastEstimator::from_str,
        )
    }

    fn get_label_style(&self) -> Result<LabelStyle, Box<dyn Error>> {
        self.get_parsed(config_keys::LABEL_STYLE, LabelStyle::default(), LabelStyle::from_str)
    }

    fn get_percent_surfacing(&self) -> Result<PercentSurfacing, Box<dyn Error>> {
        self.get_parsed(
            config_keys::PERCENT_SURFACING,
            PercentSurfacing::default(),
            PercentSurfacing::from_str,
        )
    }

    fn get_baseline_policy(&self) -> Result<BaselinePolicy, Box<dyn Error>> {
        self.get_parsed(
            config_keys::BASELINE_POLICY,
            BaselinePolicy::default(),
            BaselinePolicy::from_str,
        )
    }

    fn get_forecast_horizon(&self) -> Result<u32, Box<dyn Error>> {
        let defaults = ReportConfig::default();
        self.get_parsed(config_keys::FORECAST_HORIZON, defaults.forecast_horizon, |s| {
            s.trim().parse::<u32>().ok().filter(|v| *v <= MAX_FORECAST_HORIZON)
        })
    }

    fn get_reconciliation_tolerance(&self) -> Result<f64, Box<dyn Error>> {
        let defaults = ReportConfig::default();
        self.get_parsed(
            config_keys::RECONCILIATION_TOLERANCE,
            defaults.reconciliation_tolerance,
            |s| s.trim().parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0),
        )
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 预测
    pub const FORECAST_ESTIMATOR: &str = "forecast_estimator";
    pub const FORECAST_HORIZON: &str = "forecast_horizon";

    // 呈现
    pub const LABEL_STYLE: &str = "label_style";
    pub const PERCENT_SURFACING: &str = "percent_surfacing";

    // 计算口径
    pub const BASELINE_POLICY: &str = "baseline_policy";

    // 对账
    pub const RECONCILIATION_TOLERANCE: &str = "reconciliation_tolerance";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use tempfile::NamedTempFile;

    fn manager() -> (NamedTempFile, ConfigManager) {
        let temp_file = NamedTempFile::new().unwrap();
        let conn = open_sqlite_connection(temp_file.path().to_str().unwrap()).unwrap();
        init_schema(&conn).unwrap();
        let manager = ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap();
        (temp_file, manager)
    }

    #[test]
    fn test_defaults_when_table_empty() {
        let (_tmp, manager) = manager();
        let config = manager.load_report_config().unwrap();
        assert_eq!(config, ReportConfig::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let (_tmp, manager) = manager();
        let config = ReportConfig {
            forecast_estimator: ForecastEstimator::Global,
            label_style: LabelStyle::Arrow,
            percent_surfacing: PercentSurfacing::Null,
            baseline_policy: BaselinePolicy::None,
            forecast_horizon: 6,
            reconciliation_tolerance: 0.5,
        };

        manager.save_report_config(&config).unwrap();

        assert_eq!(manager.load_report_config().unwrap(), config);
        let snapshot = manager.get_config_snapshot().unwrap();
        assert!(snapshot.contains("\"forecast_estimator\":\"global\""));
    }

    #[test]
    fn test_invalid_value_is_config_error() {
        let (_tmp, manager) = manager();
        manager
            .set_global_config_value(config_keys::FORECAST_ESTIMATOR, "crystal_ball")
            .unwrap();

        let err = manager.load_report_config().unwrap_err();
        assert!(err.to_string().contains("forecast_estimator"));
    }

    #[test]
    fn test_oversized_horizon_is_config_error() {
        let (_tmp, manager) = manager();
        manager
            .set_global_config_value(config_keys::FORECAST_HORIZON, "4000000000")
            .unwrap();

        let err = manager.load_report_config().unwrap_err();
        assert!(err.to_string().contains("forecast_horizon"));
    }
}
