pub mod intake_ctx;
pub mod intake_flow;
pub mod order_query;

pub use intake_ctx::ScanCtx;
pub use intake_flow::{IntakeFlow, ScanOutcome, MISSING_BOX};
pub use order_query::{OrderQuery, RangeView};
