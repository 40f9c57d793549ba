//! 订单存储 - 基础设施层
//!
//! 唯一持有 SQLite 连接的模块，对外只暴露订单明细的读写能力

use crate::error::{AppError, AppResult, BusinessError, FileError};
use crate::infrastructure::migrations::run_migrations;
use crate::models::{NewLineItem, OrderDetails, OrderLineItem};
use chrono::NaiveDate;
use phf::phf_map;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

const SELECT_COLUMNS: &str = "SELECT id, order_number, purchase_order_number, product_description, quantity, box, created_at, shipped, memo FROM orders";
const ORDERING: &str = "ORDER BY created_at DESC, id DESC";

/// 可搜索的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    OrderNumber,
    PurchaseOrderNumber,
    ProductDescription,
    Box,
    Memo,
    CreatedAt,
}

static SEARCH_FIELDS: phf::Map<&'static str, SearchField> = phf_map! {
    "order_number" => SearchField::OrderNumber,
    "purchase_order_number" => SearchField::PurchaseOrderNumber,
    "product_description" => SearchField::ProductDescription,
    "box" => SearchField::Box,
    "memo" => SearchField::Memo,
    "created_at" => SearchField::CreatedAt,
};

impl SearchField {
    /// 从字段名解析，只接受白名单中的列
    pub fn parse(name: &str) -> AppResult<Self> {
        SEARCH_FIELDS.get(name).copied().ok_or_else(|| {
            BusinessError::UnknownSearchField {
                field: name.to_string(),
            }
            .into()
        })
    }

    pub fn column(self) -> &'static str {
        match self {
            SearchField::OrderNumber => "order_number",
            SearchField::PurchaseOrderNumber => "purchase_order_number",
            SearchField::ProductDescription => "product_description",
            SearchField::Box => "box",
            SearchField::Memo => "memo",
            SearchField::CreatedAt => "created_at",
        }
    }
}

/// 明细行查询条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowFilter {
    All,
    Shipped(bool),
    FieldContains { field: SearchField, value: String },
    DateRange { start: NaiveDate, end: NaiveDate },
}

impl RowFilter {
    fn where_clause(&self) -> (String, Vec<Value>) {
        match self {
            RowFilter::All => (String::new(), Vec::new()),
            RowFilter::Shipped(shipped) => (
                "WHERE shipped = ?1".to_string(),
                vec![Value::Integer(i64::from(*shipped))],
            ),
            RowFilter::FieldContains { field, value } => (
                format!("WHERE {} LIKE ?1", field.column()),
                vec![Value::Text(format!("%{}%", value))],
            ),
            RowFilter::DateRange { start, end } => (
                "WHERE DATE(created_at) BETWEEN DATE(?1) AND DATE(?2)".to_string(),
                vec![Value::Text(start.to_string()), Value::Text(end.to_string())],
            ),
        }
    }
}

/// 订单存储
pub struct OrderStore {
    conn: Mutex<Connection>,
}

impl OrderStore {
    /// 打开数据库文件并执行迁移
    pub fn open(db_path: impl AsRef<Path>) -> AppResult<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| FileError::CreateDirFailed {
                path: parent.display().to_string(),
                source,
            })?;
        }
        let conn = Connection::open(db_path)?;
        Self::with_connection(conn)
    }

    /// 内存数据库（测试用）
    pub fn open_in_memory() -> AppResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> AppResult<Self> {
        run_migrations(&conn)?;
        info!("✅ SQLite 数据库初始化完成");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| AppError::other(format!("数据库连接锁已损坏: {}", e)))
    }

    /// 保存入库订单，跳过同一天重复的 (订单号, 产品描述)
    ///
    /// # 返回
    /// 新插入的行数
    pub fn save_orders(&self, orders: &[OrderDetails], today: NaiveDate) -> AppResult<usize> {
        if orders.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut saved = 0;

        for order in orders {
            if order.order_number.trim().is_empty() {
                warn!("跳过无效的订单数据: {:?}", order);
                continue;
            }

            for product in &order.products {
                let exists = tx
                    .query_row(
                        "SELECT id FROM orders WHERE order_number = ?1 AND product_description = ?2 AND created_at = ?3",
                        params![order.order_number, product.description, today],
                        |row| row.get::<_, i64>(0),
                    )
                    .optional()?
                    .is_some();
                if exists {
                    debug!("已存在，跳过: {} / {}", order.order_number, product.description);
                    continue;
                }

                tx.execute(
                    "INSERT INTO orders (order_number, purchase_order_number, product_description, quantity, box, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        order.order_number,
                        order.purchase_order_number,
                        product.description,
                        product.item_quantity,
                        order.box_label,
                        today,
                    ],
                )?;
                saved += 1;
            }
        }

        tx.commit()?;
        info!("成功保存 {} 条新的订单明细", saved);
        Ok(saved)
    }

    /// 按条件查询明细行，按 (created_at DESC, id DESC) 排序
    pub fn fetch_rows(&self, filter: &RowFilter) -> AppResult<Vec<OrderLineItem>> {
        let (where_clause, values) = filter.where_clause();
        let sql = format!("{} {} {}", SELECT_COLUMNS, where_clause, ORDERING);

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values), map_line_item)?
            .filter_map(|row| match row {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!("跳过无法解析的订单行: {}", e);
                    None
                }
            })
            .collect();

        Ok(rows)
    }

    /// 更新某订单全部明细的出库状态
    pub fn update_shipped(&self, order_number: &str, shipped: bool) -> AppResult<usize> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE orders SET shipped = ?1 WHERE order_number = ?2",
            params![shipped, order_number],
        )?;
        info!("订单 {} 出库状态更新为 {}", order_number, i64::from(shipped));
        Ok(updated)
    }

    /// 更新某订单全部明细的备注
    pub fn update_memo(&self, order_number: &str, memo: &str) -> AppResult<usize> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE orders SET memo = ?1 WHERE order_number = ?2",
            params![memo, order_number],
        )?;
        info!("订单 {} 备注已更新", order_number);
        Ok(updated)
    }

    /// 所有存在订单的日期（升序）
    pub fn available_dates(&self) -> AppResult<Vec<NaiveDate>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT DISTINCT created_at FROM orders WHERE created_at IS NOT NULL ORDER BY created_at ASC")?;
        let dates = stmt
            .query_map([], |row| row.get::<_, Value>(0))?
            .filter_map(|row| match row {
                Ok(value) => {
                    let date = date_from_sql(&value);
                    if date.is_none() {
                        warn!("跳过无法解析的日期: {:?}", value);
                    }
                    date
                }
                Err(e) => {
                    warn!("跳过无法读取的日期: {}", e);
                    None
                }
            })
            .collect();
        Ok(dates)
    }

    /// 最新的订单日期
    pub fn latest_date(&self) -> AppResult<Option<NaiveDate>> {
        let conn = self.conn()?;
        let latest = conn.query_row("SELECT MAX(created_at) FROM orders", [], |row| {
            row.get::<_, Value>(0)
        })?;
        Ok(date_from_sql(&latest))
    }

    // ========== 维护操作 ==========

    /// 删除重复明细，每组 (订单号, 产品描述, 日期) 只保留 id 最小的一行
    pub fn remove_duplicates(&self) -> AppResult<usize> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM orders
             WHERE id NOT IN (
                 SELECT MIN(id) FROM orders
                 GROUP BY order_number, product_description, created_at
             )",
            [],
        )?;
        info!("✅ 已删除 {} 条重复数据", deleted);
        Ok(deleted)
    }

    /// 修改指定订单的入库日期
    pub fn reassign_created_at(&self, order_numbers: &[String], date: NaiveDate) -> AppResult<usize> {
        if order_numbers.is_empty() {
            return Ok(0);
        }

        let placeholders = (2..order_numbers.len() + 2)
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE orders SET created_at = ?1 WHERE order_number IN ({})",
            placeholders
        );

        let mut values = vec![Value::Text(date.to_string())];
        values.extend(order_numbers.iter().cloned().map(Value::Text));

        let conn = self.conn()?;
        let updated = conn.execute(&sql, params_from_iter(values))?;
        info!("✅ {} 条明细的日期已改为 {}", updated, date);
        Ok(updated)
    }

    /// 删除指定日期的全部明细
    pub fn delete_by_dates(&self, dates: &[NaiveDate]) -> AppResult<usize> {
        if dates.is_empty() {
            return Ok(0);
        }

        let placeholders = (1..=dates.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("DELETE FROM orders WHERE created_at IN ({})", placeholders);
        let values = dates.iter().map(|d| Value::Text(d.to_string()));

        let conn = self.conn()?;
        let deleted = conn.execute(&sql, params_from_iter(values))?;
        info!("✅ 已删除 {} 条数据", deleted);
        Ok(deleted)
    }

    /// 手动插入一条明细（不做去重）
    pub fn insert_line_item(&self, item: &NewLineItem) -> AppResult<i64> {
        if item.order_number.trim().is_empty() {
            return Err(BusinessError::EmptyOrderNumber.into());
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO orders (order_number, purchase_order_number, product_description, quantity, box, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                item.order_number,
                item.purchase_order_number,
                item.product_description,
                item.quantity,
                item.box_label,
                item.created_at,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }
}

fn map_line_item(row: &Row<'_>) -> rusqlite::Result<OrderLineItem> {
    Ok(OrderLineItem {
        id: row.get(0)?,
        order_number: row.get(1)?,
        purchase_order_number: row.get(2)?,
        product_description: row.get(3)?,
        quantity: quantity_from_sql(&row.get::<_, Value>(4)?),
        box_label: row.get(5)?,
        created_at: date_from_sql(&row.get::<_, Value>(6)?),
        shipped: row.get::<_, Option<bool>>(7)?.unwrap_or(false),
        memo: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
    })
}

/// 数量列可能存有文本（如种子设备的 `' '`），无法识别时记为 0
fn quantity_from_sql(value: &Value) -> i64 {
    match value {
        Value::Integer(n) => *n,
        Value::Real(f) => f.trunc() as i64,
        Value::Text(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// 日期列只认 `YYYY-MM-DD` 开头的文本，其余视为缺失
fn date_from_sql(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Text(s) => s
            .get(..10)
            .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()),
        _ => None,
    }
}
