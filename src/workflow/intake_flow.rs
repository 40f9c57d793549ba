//! 入库流程 - 流程层
//!
//! 核心职责：定义"一张图片 / 一条手动输入"的完整处理流程
//!
//! 流程顺序：
//! 1. 读图片 → OCR → LabelParser 提取订单引用
//! 2. 每个订单号 → 合作方查询 → 订单详情
//! 3. 查询失败时生成占位记录，不中断整批

use std::path::Path;
use tracing::{debug, error, info, warn};

use crate::clients::{OrderLookup, TextDetector};
use crate::error::{AppError, AppResult, OcrError};
use crate::models::{LookupStatus, OrderDetails};
use crate::services::{extract_order_details, LabelParser};
use crate::utils::logging::truncate_text;
use crate::workflow::intake_ctx::ScanCtx;

/// 手动输入没有对应箱号时使用的值
pub const MISSING_BOX: &str = "N/A";

/// 单张图片的处理结果
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// 得到的订单详情（包括查询失败的占位记录）
    pub details: Vec<OrderDetails>,
    /// 面向操作员的错误信息
    pub errors: Vec<String>,
}

impl ScanOutcome {
    fn failed(message: String) -> Self {
        Self {
            details: Vec::new(),
            errors: vec![message],
        }
    }
}

/// 入库流程
///
/// - 编排 OCR、解析、查询三步
/// - 决定查询失败时使用哪种占位记录
/// - 不持有数据库
pub struct IntakeFlow<D, L> {
    parser: LabelParser,
    detector: D,
    lookup: L,
    verbose_logging: bool,
}

impl<D: TextDetector, L: OrderLookup> IntakeFlow<D, L> {
    /// 创建新的入库流程
    pub fn new(parser: LabelParser, detector: D, lookup: L, verbose_logging: bool) -> Self {
        Self {
            parser,
            detector,
            lookup,
            verbose_logging,
        }
    }

    pub fn parser(&self) -> &LabelParser {
        &self.parser
    }

    /// 获取访问令牌，失败时返回 None，后续查询降级为占位记录
    pub async fn acquire_token(&self) -> Option<String> {
        match self.lookup.access_token().await {
            Ok(token) => Some(token),
            Err(e) => {
                error!("❌ 无法获取访问令牌，本次查询全部标记为失败: {}", e);
                None
            }
        }
    }

    /// 查询单个订单
    ///
    /// # 参数
    /// - `order_number`: 订单号
    /// - `box_label`: 箱号
    /// - `token`: 访问令牌；None 表示令牌获取失败
    ///
    /// # 返回
    /// 总是返回一条记录，失败时为占位记录
    pub async fn lookup(
        &self,
        order_number: &str,
        box_label: Option<String>,
        token: Option<&str>,
    ) -> OrderDetails {
        let Some(token) = token else {
            return OrderDetails::failed(order_number, LookupStatus::TokenUnavailable, box_label);
        };

        match self.lookup.fetch_order(order_number, token).await {
            Ok(response) => extract_order_details(order_number, &response).with_box(box_label),
            Err(e) => {
                let status = failure_status(&e);
                error!("❌ 订单 {} 查询失败 ({:?}): {}", order_number, status, e);
                OrderDetails::failed(order_number, status, box_label)
            }
        }
    }

    /// 处理一张图片
    ///
    /// # 参数
    /// - `path`: 图片路径
    /// - `ctx`: 扫描上下文
    /// - `token`: 访问令牌
    ///
    /// # 返回
    /// 订单详情和错误信息；有错误时本图片不产生任何订单
    pub async fn scan_image(&self, path: &Path, ctx: &ScanCtx, token: Option<&str>) -> ScanOutcome {
        info!("{} 📷 开始处理图片", ctx);

        let lines = match self.recognize(path).await {
            Ok(lines) => lines,
            Err(e) => {
                error!("{} ❌ 图片处理失败: {}", ctx, e);
                return ScanOutcome::failed(format!("'{}' 图片处理失败: {}", ctx.file_name, e));
            }
        };

        if self.verbose_logging {
            debug!("{} OCR 文本: {}", ctx, truncate_text(&lines.join(" "), 200));
        }

        let refs = self.parser.parse(&lines);
        if refs.is_empty() {
            warn!("{} ⚠️ 未找到订单号", ctx);
            return ScanOutcome::failed(format!(
                "'{}' 中未找到订单号，请检查图片后重试或手动输入",
                ctx.file_name
            ));
        }

        info!("{} ✓ 提取到 {} 个订单号，开始查询", ctx, refs.len());

        let mut outcome = ScanOutcome::default();
        for order_ref in refs {
            let details = self
                .lookup(&order_ref.order_number, order_ref.box_label(), token)
                .await;
            outcome.details.push(details);
        }

        outcome
    }

    /// 处理手动输入的订单号
    ///
    /// # 参数
    /// - `orders`: 订单号列表，空白项跳过
    /// - `boxes`: 与订单号按位置对应的箱号，缺失时为 `N/A`
    /// - `token`: 访问令牌
    pub async fn process_manual(
        &self,
        orders: &[String],
        boxes: &[String],
        token: Option<&str>,
    ) -> Vec<OrderDetails> {
        let mut collected = Vec::new();

        for (index, order_number) in orders.iter().enumerate() {
            let order_number = order_number.trim();
            if order_number.is_empty() {
                continue;
            }

            let box_label = boxes
                .get(index)
                .cloned()
                .unwrap_or_else(|| MISSING_BOX.to_string());
            info!("✍️ 处理手动输入的订单: {}", order_number);

            collected.push(self.lookup(order_number, Some(box_label), token).await);
        }

        collected
    }

    /// 读取图片并识别文字
    pub async fn recognize(&self, path: &Path) -> AppResult<Vec<String>> {
        let image = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

        if image.is_empty() {
            return Err(OcrError::EmptyImage.into());
        }

        let lines = self.detector.detect_lines(image).await?;
        if lines.iter().all(|line| line.trim().is_empty()) {
            return Err(OcrError::NoTextDetected.into());
        }

        Ok(lines)
    }
}

/// 查询错误对应的占位状态
fn failure_status(err: &AppError) -> LookupStatus {
    if err.is_fetch_failure() {
        LookupStatus::FetchFailed
    } else {
        LookupStatus::Unexpected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    #[test]
    fn test_failure_status_mapping() {
        let bad_status = AppError::Api(ApiError::BadResponse {
            endpoint: "orders".to_string(),
            status: 500,
            body: String::new(),
        });
        assert_eq!(failure_status(&bad_status), LookupStatus::FetchFailed);

        let parse_error: AppError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(failure_status(&parse_error), LookupStatus::Unexpected);
    }
}
