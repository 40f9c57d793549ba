pub mod label_parser;
pub mod order_aggregator;
pub mod order_details;
pub mod pagination;

pub use label_parser::LabelParser;
pub use order_aggregator::OrderAggregator;
pub use order_details::extract_order_details;
pub use pagination::{paginate, week_range, Page};
