// ==========================================
// 月度销售趋势分析 - 时间排序器
// ==========================================
// 职责: 按 (year, month_num) 升序排列月度汇总，分配 1-based 序号
// 约束: 排序键只看时间，与收入大小无关
// 失败: 月份键无法解析为 (year, month_num) 时返回校验错误
// ==========================================

use crate::domain::trend::{MonthKey, MonthlyAggregate, SequencedMonth};
use crate::engine::error::{EngineError, EngineResult};
use std::collections::HashMap;
use tracing::instrument;

pub struct MonthSequencer;

impl MonthSequencer {
    pub fn new() -> Self {
        Self
    }

    /// 排序并分配序号
    #[instrument(skip(self, months), fields(count = months.len()))]
    pub fn sequence(
        &self,
        months: HashMap<String, MonthlyAggregate>,
    ) -> EngineResult<Vec<SequencedMonth>> {
        let mut keyed = months
            .into_iter()
            .map(|(label, aggregate)| {
                MonthKey::parse(&label)
                    .map(|key| (key, aggregate))
                    .ok_or(EngineError::InvalidMonthKey(label))
            })
            .collect::<EngineResult<Vec<_>>>()?;

        keyed.sort_by_key(|(key, _)| *key);

        Ok(keyed
            .into_iter()
            .enumerate()
            .map(|(idx, (key, aggregate))| SequencedMonth {
                sequence: idx + 1,
                key,
                aggregate,
            })
            .collect())
    }
}

impl Default for MonthSequencer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregate(month: &str, revenue: f64) -> (String, MonthlyAggregate) {
        (
            month.to_string(),
            MonthlyAggregate {
                month: month.to_string(),
                total_revenue: revenue,
                order_count: 1,
            },
        )
    }

    #[test]
    fn test_sequence_orders_by_year_then_month() {
        let months: HashMap<_, _> = vec![
            aggregate("2007-01", 5.0),
            aggregate("2006-12", 500.0),
            aggregate("2006-02", 50.0),
        ]
        .into_iter()
        .collect();

        let seq = MonthSequencer::new().sequence(months).unwrap();

        let labels: Vec<String> = seq.iter().map(|m| m.key.label()).collect();
        assert_eq!(labels, vec!["2006-02", "2006-12", "2007-01"]);
        let indices: Vec<usize> = seq.iter().map(|m| m.sequence).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn test_sequence_rejects_unparseable_key() {
        let months: HashMap<_, _> = vec![aggregate("2006-01", 1.0), aggregate("Jan 2006", 1.0)]
            .into_iter()
            .collect();

        let err = MonthSequencer::new().sequence(months).unwrap_err();
        assert!(matches!(err, EngineError::InvalidMonthKey(ref k) if k == "Jan 2006"));
    }

    #[test]
    fn test_sequence_empty() {
        let seq = MonthSequencer::new().sequence(HashMap::new()).unwrap();
        assert!(seq.is_empty());
    }
}
