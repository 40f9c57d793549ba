//! 合作方订单 API 的响应结构
//!
//! 只声明用到的字段，其余字段忽略

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerOrderResponse {
    #[serde(default)]
    pub purchase_order_details: Option<Vec<PurchaseOrderDetail>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderDetail {
    #[serde(default)]
    pub purchase_order_number: Option<String>,
    #[serde(default, rename = "dellOrders")]
    pub orders: Option<Vec<PartnerOrder>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerOrder {
    /// 类型不固定，只有字符串形式参与订单号匹配
    #[serde(default)]
    pub order_number: Option<Value>,
    #[serde(default)]
    pub product_info: Option<Vec<PartnerProduct>>,
}

impl PartnerOrder {
    pub fn matches(&self, order_number: &str) -> bool {
        self.order_number.as_ref().and_then(Value::as_str) == Some(order_number)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerProduct {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub item_quantity: Value,
}
