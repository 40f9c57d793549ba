//! 订单详情提取
//!
//! 从合作方订单 API 的响应中取出采购单号，并按产品描述合计数量

use crate::models::{LookupStatus, OrderDetails, PartnerOrderResponse, ProductLine};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info, warn};

const UNKNOWN_PRODUCT: &str = "Unknown Product";
const NO_PRODUCT_INFO: &str = "제품 정보 없음";
const UNKNOWN_PURCHASE_ORDER: &str = "N/A";

/// 提取订单详情
///
/// # 参数
/// - `order_number`: 查询的订单号
/// - `response`: 合作方返回的数据
///
/// # 返回
/// 没有 `purchaseOrderDetails` 时视为种子设备
pub fn extract_order_details(order_number: &str, response: &PartnerOrderResponse) -> OrderDetails {
    let purchase_orders = match response.purchase_order_details.as_deref() {
        Some(list) if !list.is_empty() => list,
        _ => {
            warn!("⚠️ 响应中没有 purchaseOrderDetails，按种子设备处理: {}", order_number);
            return OrderDetails::seed_equipment(order_number);
        }
    };

    let mut purchase_order_number = UNKNOWN_PURCHASE_ORDER.to_string();
    let mut products: Vec<ProductLine> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for purchase_order in purchase_orders {
        // 遍历全部采购单，最终保留最后一个出现的采购单号
        if let Some(number) = &purchase_order.purchase_order_number {
            purchase_order_number = number.clone();
        }

        for order in purchase_order.orders.as_deref().unwrap_or_default() {
            if !order.matches(order_number) {
                continue;
            }
            debug!("找到匹配的订单 {}，处理产品信息", order_number);

            for product in order.product_info.as_deref().unwrap_or_default() {
                let description = product
                    .description
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_PRODUCT.to_string());
                let quantity = quantity_from_value(&product.item_quantity);

                match positions.get(&description) {
                    Some(&index) => products[index].item_quantity += quantity,
                    None => {
                        positions.insert(description.clone(), products.len());
                        products.push(ProductLine::new(description, quantity));
                    }
                }
            }
        }
    }

    if products.is_empty() {
        warn!("⚠️ 订单 {} 没有产品信息", order_number);
        products.push(ProductLine::new(NO_PRODUCT_INFO, 0));
    }

    info!("✓ 订单详情提取完成: {} ({} 种产品)", order_number, products.len());

    OrderDetails {
        order_number: order_number.to_string(),
        purchase_order_number,
        products,
        box_label: None,
        status: LookupStatus::Found,
    }
}

/// 宽松解析数量：整数、浮点（截断）、数字字符串；其余记为 0
fn quantity_from_value(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        Value::Bool(b) => i64::from(*b),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::SEED_EQUIPMENT_LABEL;
    use serde_json::json;

    fn response(value: Value) -> PartnerOrderResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_sums_quantities_per_description_in_first_seen_order() {
        let data = response(json!({
            "purchaseOrderDetails": [{
                "purchaseOrderNumber": "OH-2501-KTCLOU",
                "dellOrders": [
                    {
                        "orderNumber": "1014977567",
                        "productInfo": [
                            {"description": "PowerEdge R760", "itemQuantity": 1},
                            {"description": "Rail Kit", "itemQuantity": "2"},
                            {"description": "PowerEdge R760", "itemQuantity": 1}
                        ]
                    },
                    {
                        "orderNumber": "1014977568",
                        "productInfo": [{"description": "Other", "itemQuantity": 9}]
                    }
                ]
            }]
        }));

        let details = extract_order_details("1014977567", &data);

        assert_eq!(details.status, LookupStatus::Found);
        assert_eq!(details.purchase_order_number, "OH-2501-KTCLOU");
        assert_eq!(
            details.products,
            vec![ProductLine::new("PowerEdge R760", 2), ProductLine::new("Rail Kit", 2)]
        );
    }

    #[test]
    fn test_missing_purchase_orders_is_seed_equipment() {
        let details = extract_order_details("1016031605", &response(json!({})));
        assert_eq!(details.status, LookupStatus::SeedEquipment);
        assert_eq!(details.purchase_order_number, SEED_EQUIPMENT_LABEL);
        assert_eq!(details.products.len(), 1);

        let details =
            extract_order_details("1016031605", &response(json!({"purchaseOrderDetails": []})));
        assert_eq!(details.status, LookupStatus::SeedEquipment);
    }

    #[test]
    fn test_no_matching_order_yields_placeholder_product() {
        let data = response(json!({
            "purchaseOrderDetails": [{"purchaseOrderNumber": "PO-1", "dellOrders": []}]
        }));

        let details = extract_order_details("1016031605", &data);

        assert_eq!(details.purchase_order_number, "PO-1");
        assert_eq!(details.products, vec![ProductLine::new(NO_PRODUCT_INFO, 0)]);
    }

    #[test]
    fn test_last_purchase_order_number_wins() {
        let data = response(json!({
            "purchaseOrderDetails": [
                {"purchaseOrderNumber": "PO-1", "dellOrders": [
                    {"orderNumber": "1", "productInfo": [{"description": "A", "itemQuantity": 1}]}
                ]},
                {"purchaseOrderNumber": "PO-2", "dellOrders": []}
            ]
        }));

        assert_eq!(extract_order_details("1", &data).purchase_order_number, "PO-2");
    }

    #[test]
    fn test_quantity_parsing_is_lenient() {
        assert_eq!(quantity_from_value(&json!(3)), 3);
        assert_eq!(quantity_from_value(&json!(2.7)), 2);
        assert_eq!(quantity_from_value(&json!(" 4 ")), 4);
        assert_eq!(quantity_from_value(&json!("2.5")), 0);
        assert_eq!(quantity_from_value(&Value::Null), 0);
    }

    #[test]
    fn test_missing_description_is_unknown_product() {
        let data = response(json!({
            "purchaseOrderDetails": [{"dellOrders": [
                {"orderNumber": "1", "productInfo": [{"itemQuantity": 1}]}
            ]}]
        }));

        let details = extract_order_details("1", &data);
        assert_eq!(details.purchase_order_number, UNKNOWN_PURCHASE_ORDER);
        assert_eq!(details.products, vec![ProductLine::new(UNKNOWN_PRODUCT, 1)]);
    }
}
