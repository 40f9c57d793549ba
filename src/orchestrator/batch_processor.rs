//! 批量入库处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责资源管理和一批入库请求的调度。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：打开数据库并执行迁移，创建 OCR / 合作方客户端
//! 2. **并发扫描**：同一批图片并发处理，并发数受 `max_concurrent_scans` 限制，结果保持输入顺序
//! 3. **整批校验**：任意图片出错时整批只返回错误，不保存
//! 4. **保存**：按当天日期写入数据库

use crate::clients::{AzureReadClient, OrderLookup, PartnerClient, TextDetector};
use crate::config::Config;
use crate::error::{AppResult, BusinessError};
use crate::infrastructure::OrderStore;
use crate::models::OrderDetails;
use crate::services::LabelParser;
use crate::utils::logging::{log_intake_summary, log_startup};
use crate::workflow::{IntakeFlow, OrderQuery, ScanCtx, ScanOutcome};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// 一次入库请求
#[derive(Debug, Clone, Default)]
pub struct IntakeRequest {
    /// 标签图片
    pub images: Vec<PathBuf>,
    /// 手动输入的订单号
    pub manual_orders: Vec<String>,
    /// 与手动订单号按位置对应的箱号
    pub boxes: Vec<String>,
    /// 是否写入数据库
    pub save: bool,
}

/// 入库结果
#[derive(Debug, Clone, Default, Serialize)]
pub struct IntakeReport {
    pub collected: Vec<OrderDetails>,
    pub errors: Vec<String>,
    pub saved: usize,
}

/// 应用主结构
pub struct App<D = AzureReadClient, L = PartnerClient> {
    config: Config,
    store: OrderStore,
    flow: IntakeFlow<D, L>,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> AppResult<Self> {
        log_startup(&config);

        let store = OrderStore::open(&config.db_path)?;
        let flow = IntakeFlow::new(
            LabelParser::new()?,
            AzureReadClient::new(&config),
            PartnerClient::new(&config),
            config.verbose_logging,
        );

        Ok(Self::with_parts(config, store, flow))
    }
}

impl<D: TextDetector, L: OrderLookup> App<D, L> {
    /// 用已创建好的组件组装应用
    pub fn with_parts(config: Config, store: OrderStore, flow: IntakeFlow<D, L>) -> Self {
        Self {
            config,
            store,
            flow,
        }
    }

    pub fn store(&self) -> &OrderStore {
        &self.store
    }

    pub fn flow(&self) -> &IntakeFlow<D, L> {
        &self.flow
    }

    /// 订单浏览
    pub fn query(&self) -> OrderQuery<'_> {
        OrderQuery::new(&self.store, self.config.items_per_page)
    }

    /// 处理一批入库请求
    ///
    /// # 参数
    /// - `request`: 图片和手动输入
    ///
    /// # 返回
    /// 图片有错误时只返回错误；否则返回全部订单详情和保存数量
    pub async fn intake(&self, request: IntakeRequest) -> AppResult<IntakeReport> {
        let has_images = !request.images.is_empty();
        let has_manual = request.manual_orders.iter().any(|o| !o.trim().is_empty());
        if !has_images && !has_manual {
            return Err(BusinessError::NoInput.into());
        }

        let token = self.flow.acquire_token().await;
        let mut collected = Vec::new();

        if has_images {
            info!("\n📁 共 {} 张图片待处理", request.images.len());
            let outcome = self.scan_images(&request.images, token.as_deref()).await;

            if !outcome.errors.is_empty() {
                warn!("⚠️ {} 张图片处理失败，本批不保存", outcome.errors.len());
                return Ok(IntakeReport {
                    errors: outcome.errors,
                    ..Default::default()
                });
            }
            collected.extend(outcome.details);
        }

        if has_manual {
            let manual = self
                .flow
                .process_manual(&request.manual_orders, &request.boxes, token.as_deref())
                .await;
            collected.extend(manual);
        }

        if collected.is_empty() {
            return Err(BusinessError::NoInput.into());
        }

        let saved = if request.save {
            let today = chrono::Local::now().date_naive();
            self.store.save_orders(&collected, today)?
        } else {
            0
        };

        log_intake_summary(&collected, saved);

        Ok(IntakeReport {
            collected,
            errors: Vec::new(),
            saved,
        })
    }

    /// 并发扫描图片，结果按输入顺序合并
    async fn scan_images(&self, images: &[PathBuf], token: Option<&str>) -> ScanOutcome {
        let flow = &self.flow;
        let concurrency = self.config.max_concurrent_scans.max(1);

        let outcomes: Vec<ScanOutcome> = stream::iter(images.iter().enumerate())
            .map(|(index, path)| {
                let ctx = ScanCtx::new(index + 1, path);
                async move { flow.scan_image(path, &ctx, token).await }
            })
            .buffered(concurrency)
            .collect()
            .await;

        let mut merged = ScanOutcome::default();
        for outcome in outcomes {
            merged.details.extend(outcome.details);
            merged.errors.extend(outcome.errors);
        }
        merged
    }
}
