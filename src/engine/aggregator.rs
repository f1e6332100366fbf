// ==========================================
// 月度销售趋势分析 - 月度聚合器
// ==========================================
// 职责: 按 order_date 所在自然月分组，汇总收入与去重订单数
// 输入: OrderLineFact（无序）
// 输出: month(YYYY-MM) → MonthlyAggregate
// ==========================================
// 约束: 无订单的月份不补零（不出现在结果中）
// 坏行: 日期/数值缺失或无法解析的行跳过并记录告警，不中断聚合
// ==========================================

use crate::domain::sales::{parse_order_date, OrderLineFact};
use crate::domain::trend::{MonthKey, MonthlyAggregate, SkipReason, SkippedRow};
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument, warn};

// ==========================================
// AggregationOutcome - 聚合结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct AggregationOutcome {
    pub months: HashMap<String, MonthlyAggregate>,
    pub skipped: Vec<SkippedRow>,
}

// 单月累加器
#[derive(Default)]
struct MonthAccumulator {
    revenue: f64,
    orders: HashSet<i64>,
}

// ==========================================
// MonthlyAggregator - 月度聚合器
// ==========================================
pub struct MonthlyAggregator;

impl MonthlyAggregator {
    pub fn new() -> Self {
        Self
    }

    /// 聚合订单明细
    #[instrument(skip(self, facts), fields(count = facts.len()))]
    pub fn aggregate(&self, facts: &[OrderLineFact]) -> AggregationOutcome {
        let mut buckets: HashMap<MonthKey, MonthAccumulator> = HashMap::new();
        let mut skipped = Vec::new();

        for fact in facts {
            match Self::validate(fact) {
                Ok((key, amount)) => {
                    let acc = buckets.entry(key).or_default();
                    acc.revenue += amount;
                    acc.orders.insert(fact.order_id);
                }
                Err(reason) => {
                    warn!(order_id = fact.order_id, "跳过无效明细行: {}", reason);
                    skipped.push(SkippedRow {
                        order_id: fact.order_id,
                        reason,
                    });
                }
            }
        }

        let months: HashMap<String, MonthlyAggregate> = buckets
            .into_iter()
            .map(|(key, acc)| {
                let label = key.label();
                (
                    label.clone(),
                    MonthlyAggregate {
                        month: label,
                        total_revenue: acc.revenue,
                        order_count: acc.orders.len(),
                    },
                )
            })
            .collect();

        debug!(months = months.len(), skipped = skipped.len(), "月度聚合完成");

        AggregationOutcome { months, skipped }
    }

    /// 校验单行并返回 (月份键, 明细金额)
    fn validate(fact: &OrderLineFact) -> Result<(MonthKey, f64), SkipReason> {
        let raw_date = fact.order_date.as_deref().ok_or(SkipReason::MissingDate)?;
        let date = parse_order_date(raw_date)
            .ok_or_else(|| SkipReason::InvalidDate(raw_date.to_string()))?;
        let quantity = fact.quantity.ok_or(SkipReason::MissingQuantity)?;
        let price = fact.price.ok_or(SkipReason::MissingPrice)?;

        let amount = quantity as f64 * price;
        if !amount.is_finite() {
            return Err(SkipReason::NonFiniteAmount);
        }

        Ok((MonthKey::from_date(date), amount))
    }
}

impl Default for MonthlyAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fact(order_id: i64, date: &str, quantity: i64, price: f64) -> OrderLineFact {
        OrderLineFact::new(order_id, date, quantity, price)
    }

    #[test]
    fn test_aggregate_revenue_and_distinct_orders() {
        let facts = vec![
            fact(1, "2006-01-05", 2, 10.0),
            fact(1, "2006-01-05", 1, 5.0), // 同一订单多行
            fact(2, "2006-01-20", 3, 1.5),
            fact(3, "2006-02-01", 1, 100.0),
        ];

        let outcome = MonthlyAggregator::new().aggregate(&facts);

        assert!(outcome.skipped.is_empty());
        assert_eq!(outcome.months.len(), 2);

        let jan = &outcome.months["2006-01"];
        assert_eq!(jan.total_revenue, 29.5);
        assert_eq!(jan.order_count, 2);

        let feb = &outcome.months["2006-02"];
        assert_eq!(feb.total_revenue, 100.0);
        assert_eq!(feb.order_count, 1);
    }

    #[test]
    fn test_aggregate_does_not_fill_missing_months() {
        let facts = vec![fact(1, "2006-01-05", 1, 10.0), fact(2, "2006-04-05", 1, 10.0)];
        let outcome = MonthlyAggregator::new().aggregate(&facts);

        assert_eq!(outcome.months.len(), 2);
        assert!(!outcome.months.contains_key("2006-02"));
        assert!(!outcome.months.contains_key("2006-03"));
    }

    #[test]
    fn test_aggregate_skips_bad_rows_with_reason() {
        let facts = vec![
            fact(1, "2006-01-05", 1, 10.0),
            fact(2, "yesterday", 1, 10.0),
            OrderLineFact {
                order_id: 3,
                order_date: None,
                quantity: Some(1),
                price: Some(1.0),
            },
            OrderLineFact {
                order_id: 4,
                order_date: Some("2006-01-09".to_string()),
                quantity: Some(1),
                price: None,
            },
            fact(5, "2006-01-09", 1, f64::INFINITY),
        ];

        let outcome = MonthlyAggregator::new().aggregate(&facts);

        assert_eq!(outcome.months.len(), 1);
        assert_eq!(outcome.months["2006-01"].total_revenue, 10.0);
        assert_eq!(outcome.skipped.len(), 4);
        assert_eq!(
            outcome.skipped[0].reason,
            SkipReason::InvalidDate("yesterday".to_string())
        );
        assert_eq!(outcome.skipped[1].reason, SkipReason::MissingDate);
        assert_eq!(outcome.skipped[2].reason, SkipReason::MissingPrice);
        assert_eq!(outcome.skipped[3].reason, SkipReason::NonFiniteAmount);
    }

    #[test]
    fn test_aggregate_empty_input() {
        let outcome = MonthlyAggregator::new().aggregate(&[]);
        assert!(outcome.months.is_empty());
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn test_aggregate_accepts_raw_generator_date_format() {
        let facts = vec![fact(1, "12/31/2007", 2, 50.0), fact(2, "2007-12-01", 1, 1.0)];
        let outcome = MonthlyAggregator::new().aggregate(&facts);

        assert_eq!(outcome.months.len(), 1);
        assert_eq!(outcome.months["2007-12"].total_revenue, 101.0);
        assert_eq!(outcome.months["2007-12"].order_count, 2);
    }
}
