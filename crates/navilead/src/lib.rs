//! NaviLead core: offer pricing, HTML offer templates with placeholder
//! binding, dashboard activity feeds and transactional email rendering.

pub mod activity;
pub mod billing;
pub mod binder;
pub mod cache;
pub mod email;
pub mod error;
pub mod markup;
pub mod money;
pub mod placeholders;
pub mod pricing;
pub mod quote;
pub mod storage;
pub mod template;

// Re-export core types
pub use activity::{Activity, ActivityFeed, ActivityType, build_feed, group_by_type, unified_feed};
pub use billing::{
    BillingInterval, ChargeBreakdown, Plan, SmsCreditPackage, SmsPurchase, sms_credit_charge,
    subscription_charge,
};
pub use binder::{OfferContext, TemplateLayout, bind_offer};
pub use cache::{CachedOfferTemplate, TemplateCache};
pub use email::RenderedEmail;
pub use error::{
    ConfigError, DataError, NavileadError, PricingError, Result, StorageError, TemplateError,
};
pub use money::Currency;
pub use placeholders::{ValidationReport, validate_template};
pub use pricing::{LineTotal, PriceBreakdown, calculate, calculate_quote};
pub use quote::{Attachment, Quote, QuoteBuilder, QuoteId, Service};
#[cfg(feature = "fs")]
pub use storage::FileStorage;
pub use storage::{MemoryStorage, Storage};
pub use template::{OfferTemplate, TemplateBuilder, TemplateId};

/// Get the library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
