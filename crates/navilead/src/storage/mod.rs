//! Storage abstraction for offer templates

#[cfg(feature = "fs")]
mod file;
#[cfg(feature = "fs")]
pub use file::FileStorage;

mod memory;
pub use memory::MemoryStorage;

use async_trait::async_trait;

use crate::error::Result;
use crate::template::{OfferTemplate, TemplateId};

/// Storage trait for template persistence
///
/// Implementations reject templates that fail validation on save, so every
/// stored template can be rendered.
#[async_trait]
pub trait Storage: Send + Sync + 'static {
    /// Save a template, replacing any template with the same id
    async fn save_template(&self, template: &OfferTemplate) -> Result<()>;

    /// Get a template by ID
    async fn get_template(&self, id: &TemplateId) -> Result<OfferTemplate>;

    /// List all templates
    async fn list_templates(&self) -> Result<Vec<OfferTemplate>>;

    /// Delete a template; deleting an unknown id is not an error
    async fn delete_template(&self, id: &TemplateId) -> Result<()>;
}
