use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 合作方查询失败时写入采购单号一栏的占位文本
pub const SEED_EQUIPMENT_LABEL: &str = "시드 장비(주문 조회 불가)";
pub const TOKEN_FAILED_LABEL: &str = "API 토큰 실패";
pub const FETCH_FAILED_LABEL: &str = "API 조회 실패";
pub const UNEXPECTED_FAILURE_LABEL: &str = "알 수 없는 오류";

/// 数据库中的一行订单明细
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub id: i64,
    pub order_number: String,
    pub purchase_order_number: Option<String>,
    pub product_description: String,
    pub quantity: i64,
    #[serde(rename = "box")]
    pub box_label: Option<String>,
    /// 旧数据中可能为空或无法识别
    pub created_at: Option<NaiveDate>,
    pub shipped: bool,
    pub memo: String,
}

/// 待插入的订单明细（维护命令使用）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLineItem {
    pub order_number: String,
    pub purchase_order_number: Option<String>,
    pub product_description: String,
    pub quantity: i64,
    pub box_label: Option<String>,
    pub created_at: NaiveDate,
}

/// 产品行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductLine {
    pub description: String,
    #[serde(rename = "itemQuantity")]
    pub item_quantity: i64,
}

impl ProductLine {
    pub fn new(description: impl Into<String>, item_quantity: i64) -> Self {
        Self {
            description: description.into(),
            item_quantity,
        }
    }
}

/// 按订单号聚合后的订单
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedOrder {
    pub order_number: String,
    pub purchase_order_number: Option<String>,
    pub created_at: Option<NaiveDate>,
    pub shipped: bool,
    pub memo: String,
    #[serde(rename = "box")]
    pub box_label: Option<String>,
    pub products: Vec<ProductLine>,
}

impl AggregatedOrder {
    /// 用某订单号遇到的第一行填充标量字段，产品列表为空
    pub fn from_first_row(row: &OrderLineItem) -> Self {
        Self {
            order_number: row.order_number.clone(),
            purchase_order_number: row.purchase_order_number.clone(),
            created_at: row.created_at,
            shipped: row.shipped,
            memo: row.memo.clone(),
            box_label: row.box_label.clone(),
            products: Vec::new(),
        }
    }
}

/// 合作方查询结果状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupStatus {
    /// 查询成功
    Found,
    /// 合作方没有该订单（种子设备）
    SeedEquipment,
    /// 无法获取访问令牌
    TokenUnavailable,
    /// 请求失败
    FetchFailed,
    /// 其他未知错误
    Unexpected,
}

impl LookupStatus {
    /// 查询失败时写入采购单号的占位文本
    pub fn placeholder_label(self) -> Option<&'static str> {
        match self {
            LookupStatus::Found => None,
            LookupStatus::SeedEquipment => Some(SEED_EQUIPMENT_LABEL),
            LookupStatus::TokenUnavailable => Some(TOKEN_FAILED_LABEL),
            LookupStatus::FetchFailed => Some(FETCH_FAILED_LABEL),
            LookupStatus::Unexpected => Some(UNEXPECTED_FAILURE_LABEL),
        }
    }
}

/// 一次入库扫描得到的订单详情
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetails {
    pub order_number: String,
    pub purchase_order_number: String,
    pub products: Vec<ProductLine>,
    #[serde(rename = "box")]
    pub box_label: Option<String>,
    pub status: LookupStatus,
}

impl OrderDetails {
    /// 查询失败的占位记录（无产品行，不会被保存）
    pub fn failed(order_number: impl Into<String>, status: LookupStatus, box_label: Option<String>) -> Self {
        Self {
            order_number: order_number.into(),
            purchase_order_number: status.placeholder_label().unwrap_or_default().to_string(),
            products: Vec::new(),
            box_label,
            status,
        }
    }

    /// 种子设备记录：保留一行空白产品，保存时仍会落库
    pub fn seed_equipment(order_number: impl Into<String>) -> Self {
        Self {
            order_number: order_number.into(),
            purchase_order_number: SEED_EQUIPMENT_LABEL.to_string(),
            products: vec![ProductLine::new(" ", 0)],
            box_label: None,
            status: LookupStatus::SeedEquipment,
        }
    }

    pub fn with_box(mut self, box_label: Option<String>) -> Self {
        self.box_label = box_label;
        self
    }
}
