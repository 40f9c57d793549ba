//! 标签解析服务 - 业务能力层
//!
//! 只负责"从 OCR 文本行中提取订单号和箱号"能力，不做任何 I/O
//!
//! 支持两种标签：
//! 1. 납품확인서（交货确认单）：包含 `ORDER#`，一行一个订单
//! 2. 旧版单订单标签：`Order No` 后的订单号，或出现次数最多的 10 位数字

use crate::error::AppResult;
use crate::models::{BoxRef, ExtractedOrderRef};
use regex::Regex;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// 交货确认单的标记
const DELIVERY_SHEET_MARKER: &str = "ORDER#";

/// 标签解析器
///
/// 正则只在构造时编译一次，解析本身是纯函数
pub struct LabelParser {
    order_token: Regex,
    box_keyword: Regex,
    any_number: Regex,
    order_no: Regex,
    ten_digit: Regex,
    box_of_total: Regex,
    box_prefixed: Regex,
}

impl LabelParser {
    /// 创建解析器
    pub fn new() -> AppResult<Self> {
        Ok(Self {
            order_token: Regex::new(r"\b([0-9]{9,10})\b")?,
            box_keyword: Regex::new(r"(?i)(Box|박스)\s*[:\s]*(\d{1,3})\b")?,
            any_number: Regex::new(r"\b(\d+)\b")?,
            order_no: Regex::new(r"(?i)Order\s*No[:.\s#]*([0-9]{9,10})\b")?,
            ten_digit: Regex::new(r"\b([0-9]{10})\b")?,
            box_of_total: Regex::new(r"(?i)(?:of|/)\s*([0-9]+)\b")?,
            box_prefixed: Regex::new(r"(?i)Box\s*([0-9]+)\b")?,
        })
    }

    /// 解析 OCR 文本行
    ///
    /// # 参数
    /// - `lines`: OCR 服务按顺序返回的文本行
    ///
    /// # 返回
    /// 提取出的订单引用；没有找到订单号时返回空列表
    pub fn parse<S: AsRef<str>>(&self, lines: &[S]) -> Vec<ExtractedOrderRef> {
        let full_text = lines
            .iter()
            .map(|line| line.as_ref())
            .collect::<Vec<&str>>()
            .join(" ");

        if full_text.contains(DELIVERY_SHEET_MARKER) {
            info!("检测到交货确认单格式，尝试按行提取多个订单");
            let refs = self.parse_delivery_sheet(lines);
            if !refs.is_empty() {
                info!("交货确认单中找到 {} 个订单", refs.len());
                return refs;
            }
        }

        debug!("使用单订单标签解析逻辑");
        self.parse_single_label(&full_text).into_iter().collect()
    }

    /// 交货确认单：每行独立提取订单号和箱号
    fn parse_delivery_sheet<S: AsRef<str>>(&self, lines: &[S]) -> Vec<ExtractedOrderRef> {
        lines
            .iter()
            .filter_map(|line| self.parse_sheet_line(line.as_ref()))
            .collect()
    }

    fn parse_sheet_line(&self, line: &str) -> Option<ExtractedOrderRef> {
        let order_number = self.order_token.captures(line)?.get(1)?.as_str();

        let box_number = self
            .box_keyword
            .captures(line)
            .and_then(|caps| caps.get(2))
            .map(|m| m.as_str())
            // 没有 Box 关键字时，取该行第一个不同于订单号的数字
            .or_else(|| {
                self.any_number
                    .captures_iter(line)
                    .filter_map(|caps| caps.get(1))
                    .map(|m| m.as_str())
                    .find(|num| *num != order_number)
            });

        Some(ExtractedOrderRef::new(
            order_number,
            box_number.map(|b| BoxRef::Text(b.to_string())),
        ))
    }

    /// 旧版标签：整段文本只对应一个订单
    fn parse_single_label(&self, full_text: &str) -> Option<ExtractedOrderRef> {
        let order_number = self
            .find_labelled_order_number(full_text)
            .or_else(|| self.find_most_frequent_ten_digit(full_text));

        let box_ref = self.find_box_count(full_text).map(BoxRef::Number);

        match order_number {
            Some(order_number) => Some(ExtractedOrderRef::new(order_number, box_ref)),
            None => {
                warn!("所有规则都未找到订单号");
                None
            }
        }
    }

    fn find_labelled_order_number<'t>(&self, text: &'t str) -> Option<&'t str> {
        let found = self
            .order_no
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str());
        if let Some(order_number) = found {
            info!("通过 'Order No' 规则找到订单号: {}", order_number);
        }
        found
    }

    /// 出现次数最多的 10 位数字；次数相同时取最先出现的
    fn find_most_frequent_ten_digit<'t>(&self, text: &'t str) -> Option<&'t str> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut first_seen: Vec<&str> = Vec::new();

        for token in self
            .ten_digit
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
        {
            let count = counts.entry(token).or_insert(0);
            if *count == 0 {
                first_seen.push(token);
            }
            *count += 1;
        }

        let mut best: Option<(&str, usize)> = None;
        for token in first_seen {
            let count = counts.get(token).copied().unwrap_or(0);
            if best.map_or(true, |(_, max)| count > max) {
                best = Some((token, count));
            }
        }

        let found = best.map(|(token, _)| token);
        if let Some(order_number) = found {
            info!("使用出现次数最多的 10 位数字作为订单号: {}", order_number);
        }
        found
    }

    /// 先匹配 "of Y" / "/Y"，再匹配 "Box Y"
    fn find_box_count(&self, text: &str) -> Option<u64> {
        let raw = self
            .box_of_total
            .captures(text)
            .or_else(|| self.box_prefixed.captures(text))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())?;

        match raw.parse::<u64>() {
            Ok(number) => {
                debug!("最终箱号: {}", number);
                Some(number)
            }
            Err(_) => {
                warn!("提取到的箱号 '{}' 不是有效整数", raw);
                None
            }
        }
    }
}
