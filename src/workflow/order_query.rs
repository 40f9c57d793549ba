//! 订单浏览流程 - 流程层
//!
//! 查询明细行 → 按订单号聚合 → 分页

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::error::AppResult;
use crate::infrastructure::{OrderStore, RowFilter, SearchField};
use crate::models::AggregatedOrder;
use crate::services::{paginate, OrderAggregator, Page};

/// 按日期范围浏览的结果
#[derive(Debug, Clone, Serialize)]
pub struct RangeView {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub orders: Vec<AggregatedOrder>,
    /// 所有存在订单的日期（升序）
    pub available_dates: Vec<NaiveDate>,
}

/// 订单浏览
pub struct OrderQuery<'a> {
    store: &'a OrderStore,
    per_page: usize,
}

impl<'a> OrderQuery<'a> {
    pub fn new(store: &'a OrderStore, per_page: usize) -> Self {
        Self { store, per_page }
    }

    /// 按日期范围浏览（不分页）
    ///
    /// # 参数
    /// - `start` / `end`: 起止日期（含）；任一缺失时两者都取最新日期
    /// - `today`: 表为空时使用的日期
    pub fn list_range(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> AppResult<RangeView> {
        let (start_date, end_date) = match (start, end) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                let latest = self.store.latest_date()?.unwrap_or(today);
                info!("📅 未指定日期范围，显示最新日期 {}", latest);
                (latest, latest)
            }
        };

        let rows = self.store.fetch_rows(&RowFilter::DateRange {
            start: start_date,
            end: end_date,
        })?;

        Ok(RangeView {
            start_date,
            end_date,
            orders: OrderAggregator::aggregate(&rows),
            available_dates: self.store.available_dates()?,
        })
    }

    /// 按字段模糊搜索；字段或值为空时返回全部
    pub fn search(&self, field: Option<&str>, value: Option<&str>, page: usize) -> AppResult<Page<AggregatedOrder>> {
        let field = field.map(str::trim).filter(|f| !f.is_empty());
        let value = value.filter(|v| !v.is_empty());

        match (field, value) {
            (Some(field), Some(value)) => {
                let filter = RowFilter::FieldContains {
                    field: SearchField::parse(field)?,
                    value: value.to_string(),
                };
                self.paged(&filter, page)
            }
            _ => self.all(page),
        }
    }

    /// 全部订单
    pub fn all(&self, page: usize) -> AppResult<Page<AggregatedOrder>> {
        self.paged(&RowFilter::All, page)
    }

    /// 按出库状态浏览
    pub fn by_shipped(&self, shipped: bool, page: usize) -> AppResult<Page<AggregatedOrder>> {
        self.paged(&RowFilter::Shipped(shipped), page)
    }

    fn paged(&self, filter: &RowFilter, page: usize) -> AppResult<Page<AggregatedOrder>> {
        let rows = self.store.fetch_rows(filter)?;
        let orders = OrderAggregator::aggregate(&rows);
        Ok(paginate(orders, page, self.per_page))
    }
}
