//! 订单聚合服务 - 业务能力层
//!
//! 把数据库查询得到的扁平明细行按订单号折叠成带产品列表的订单

use crate::models::{AggregatedOrder, OrderLineItem, ProductLine};
use std::collections::HashMap;

/// 订单聚合器
pub struct OrderAggregator;

impl OrderAggregator {
    /// 按订单号聚合明细行
    ///
    /// 输出顺序为各订单号在输入中第一次出现的顺序。
    /// 标量字段（采购单号、日期、出库状态、备注、箱号）只取第一次遇到的那一行，
    /// 后续行的不同取值会被忽略；每一行都贡献一个产品条目。
    pub fn aggregate(rows: &[OrderLineItem]) -> Vec<AggregatedOrder> {
        let mut slots: HashMap<&str, usize> = HashMap::new();
        let mut orders: Vec<AggregatedOrder> = Vec::new();

        for row in rows {
            let slot = *slots.entry(row.order_number.as_str()).or_insert_with(|| {
                orders.push(AggregatedOrder::from_first_row(row));
                orders.len() - 1
            });

            orders[slot]
                .products
                .push(ProductLine::new(row.product_description.clone(), row.quantity));
        }

        orders
    }
}
