//! # Order Intake
//!
//! 一个用于仓库订单入库的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（SQLite 连接），只暴露能力
//! - `OrderStore` - 唯一的连接持有者，提供明细行读写
//! - `run_migrations` - 启动时显式执行的建表/补列
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 纯函数能力，不做 I/O
//! - `LabelParser` - 从 OCR 文本行提取订单号和箱号
//! - `OrderAggregator` - 把明细行按订单号聚合
//! - `extract_order_details` - 合作方响应 → 订单详情
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一张图片"的完整处理流程
//! - `ScanCtx` - 上下文封装（图片序号 + 文件名）
//! - `IntakeFlow` - 流程编排（OCR → 解析 → 查询）
//! - `OrderQuery` - 浏览（查询 → 聚合 → 分页）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量入库，管理资源和并发
//! - `orchestrator/command_runner` - 命令分发
//!
//! 外部服务（OCR、合作方订单 API）位于 `clients/`，以 trait 暴露给流程层。

pub mod cli;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{AzureReadClient, OrderLookup, PartnerClient, TextDetector};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::OrderStore;
pub use models::{AggregatedOrder, BoxRef, ExtractedOrderRef, OrderDetails, OrderLineItem};
pub use orchestrator::{run_command, App, IntakeReport, IntakeRequest};
pub use services::{LabelParser, OrderAggregator};
pub use workflow::{IntakeFlow, OrderQuery, ScanCtx};
