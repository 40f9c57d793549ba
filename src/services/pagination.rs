use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

/// 分页结果
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// 对聚合后的订单分页
///
/// 页码从 1 开始，小于 1 按 1 处理；超出范围返回空页
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let page = page.max(1);
    let total_items = items.len();
    let total_pages = if total_items > 0 {
        total_items.div_ceil(per_page)
    } else {
        1
    };

    // 偏移量溢出时必然超出范围，返回空页
    let items = match (page - 1).checked_mul(per_page) {
        Some(offset) => items.into_iter().skip(offset).take(per_page).collect(),
        None => Vec::new(),
    };

    Page {
        items,
        page,
        total_pages,
        total_items,
    }
}

/// 给定日期所在周的周日和周六
pub fn week_range(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = date - Duration::days(i64::from(date.weekday().num_days_from_sunday()));
    (start, start + Duration::days(6))
}
