// ==========================================
// 月度销售趋势分析 - 支付对账
// ==========================================
// 职责: 比对订单明细合计与支付金额
// 规则:
// - order_total = Σ(quantity × price)，无明细时为 0
// - |order_total - payment_amount| < tolerance → MATCH，否则 MISMATCH
// - 无支付记录的订单一律 MISMATCH（订单金额为 0 也不例外），difference = order_total
// - 同一订单多笔支付按合计比对
// - 支付指向不存在的订单 → 孤儿支付
// ==========================================

use crate::domain::report::{OrphanPayment, PaymentCheck, ReconciliationReport};
use crate::domain::sales::{OrderLine, Payment};
use crate::domain::types::PaymentCheckStatus;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{info, instrument};

/// 默认对账容差（金额）
pub const DEFAULT_TOLERANCE: f64 = 0.01;

pub struct PaymentReconciler {
    tolerance: f64,
}

impl PaymentReconciler {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    #[instrument(skip_all, fields(orders = order_ids.len(), payments = payments.len()))]
    pub fn reconcile(
        &self,
        order_ids: &[i64],
        lines: &[OrderLine],
        payments: &[Payment],
    ) -> ReconciliationReport {
        let known_orders: BTreeSet<i64> = order_ids.iter().copied().collect();

        let mut totals: HashMap<i64, f64> = HashMap::new();
        for line in lines {
            *totals.entry(line.order_id).or_insert(0.0) += line.line_total();
        }

        let mut paid: BTreeMap<i64, f64> = BTreeMap::new();
        let mut orphan_payments = Vec::new();
        for payment in payments {
            if known_orders.contains(&payment.order_id) {
                *paid.entry(payment.order_id).or_insert(0.0) += payment.amount;
            } else {
                orphan_payments.push(OrphanPayment {
                    payment_id: payment.payment_id,
                    order_id: payment.order_id,
                    amount: payment.amount,
                });
            }
        }

        let checks: Vec<PaymentCheck> = known_orders
            .iter()
            .map(|order_id| {
                let order_total = totals.get(order_id).copied().unwrap_or(0.0);
                let payment_amount = paid.get(order_id).copied();
                let difference = (order_total - payment_amount.unwrap_or(0.0)).abs();
                let status = if payment_amount.is_some() && difference < self.tolerance {
                    PaymentCheckStatus::Match
                } else {
                    PaymentCheckStatus::Mismatch
                };
                PaymentCheck {
                    order_id: *order_id,
                    order_total,
                    payment_amount,
                    status,
                    difference,
                }
            })
            .collect();

        let matching = checks
            .iter()
            .filter(|c| c.status == PaymentCheckStatus::Match)
            .count();
        let orders_without_payment: Vec<PaymentCheck> = checks
            .iter()
            .filter(|c| c.payment_amount.is_none())
            .cloned()
            .collect();

        info!(
            matching,
            mismatching = checks.len() - matching,
            without_payment = orders_without_payment.len(),
            orphans = orphan_payments.len(),
            "支付对账完成"
        );

        ReconciliationReport {
            total_orders: checks.len(),
            matching,
            mismatching: checks.len() - matching,
            checks,
            orders_without_payment,
            orphan_payments,
        }
    }
}

impl Default for PaymentReconciler {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}
