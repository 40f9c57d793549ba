//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责资源管理和命令调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量入库处理器
//! - 管理应用资源（数据库、OCR 客户端、合作方客户端）
//! - 并发扫描一批图片（有上限，结果保持输入顺序）
//! - 合并手动输入，按需保存
//!
//! ### `command_runner` - 命令分发
//! - 把命令行子命令映射到入库、浏览、维护能力
//! - 结果统一输出为 JSON
//!
//! ## 层次关系
//!
//! ```text
//! command_runner (一条命令)
//!     ↓
//! batch_processor (一批图片 + 手动输入)
//!     ↓
//! workflow::IntakeFlow / OrderQuery (单张图片 / 单次浏览)
//!     ↓
//! services (能力层：解析 / 聚合 / 分页)
//!     ↓
//! infrastructure (基础设施：OrderStore)
//! ```

pub mod batch_processor;
pub mod command_runner;

pub use batch_processor::{App, IntakeReport, IntakeRequest};
pub use command_runner::run_command;
