pub mod label;
pub mod order;
pub mod partner;

pub use label::{BoxRef, ExtractedOrderRef};
pub use order::{AggregatedOrder, LookupStatus, NewLineItem, OrderDetails, OrderLineItem, ProductLine};
pub use partner::{PartnerOrder, PartnerOrderResponse, PartnerProduct, PurchaseOrderDetail};
