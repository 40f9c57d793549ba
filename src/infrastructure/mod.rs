//! 基础设施层
//!
//! 持有 SQLite 连接，只暴露订单明细的读写能力

pub mod migrations;
pub mod order_store;

pub use migrations::run_migrations;
pub use order_store::{OrderStore, RowFilter, SearchField};
