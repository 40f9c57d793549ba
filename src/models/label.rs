use serde::{Deserialize, Serialize};
use std::fmt;

/// 标签上识别出的箱号
///
/// 납품확인서（多订单交货确认单）保留原始数字文本；
/// 旧版单订单标签解析为整数。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoxRef {
    Number(u64),
    Text(String),
}

impl fmt::Display for BoxRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoxRef::Number(n) => write!(f, "{}", n),
            BoxRef::Text(s) => write!(f, "{}", s),
        }
    }
}

/// 从一张标签中提取出的订单引用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedOrderRef {
    /// 9~10 位数字订单号
    pub order_number: String,
    #[serde(rename = "box")]
    pub box_ref: Option<BoxRef>,
}

impl ExtractedOrderRef {
    pub fn new(order_number: impl Into<String>, box_ref: Option<BoxRef>) -> Self {
        Self {
            order_number: order_number.into(),
            box_ref,
        }
    }

    /// 箱号的存储形式
    pub fn box_label(&self) -> Option<String> {
        self.box_ref.as_ref().map(ToString::to_string)
    }
}
