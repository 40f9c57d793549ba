pub mod ocr_client;
pub mod partner_client;

pub use ocr_client::{AzureReadClient, TextDetector};
pub use partner_client::{OrderLookup, PartnerClient};
