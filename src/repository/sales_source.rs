// ==========================================
// 月度销售趋势分析 - 销售数据源 Trait
// ==========================================
// 职责: 屏蔽数据来自 SQLite 还是 CSV 目录
// 实现者: SalesRepository（SQLite）/ CsvSalesSource（CSV 文件）
// ==========================================

use crate::domain::sales::{OrderLine, OrderLineFact, Payment};
use std::error::Error;

/// 支付对账所需的输入
#[derive(Debug, Clone, Default)]
pub struct ReconciliationInput {
    pub order_ids: Vec<i64>,
    pub lines: Vec<OrderLine>,
    pub payments: Vec<Payment>,
}

pub trait SalesSource {
    /// orders ⋈ order_items 的投影行
    ///
    /// 日期/数值字段保持原样，由聚合器逐行校验
    fn load_order_line_facts(&self) -> Result<Vec<OrderLineFact>, Box<dyn Error>>;

    /// 支付对账输入（全部订单号 + 明细 + 支付）
    fn load_reconciliation_input(&self) -> Result<ReconciliationInput, Box<dyn Error>>;

    /// 数据源描述（日志用）
    fn describe(&self) -> String;
}
