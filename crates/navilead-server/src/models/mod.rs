//! API models for requests and responses

pub mod activity;
pub mod api;
pub mod email;
pub mod pricing;
pub mod template;

// Re-export commonly used types
pub use activity::*;
pub use api::*;
pub use email::*;
pub use pricing::*;
pub use template::*;
