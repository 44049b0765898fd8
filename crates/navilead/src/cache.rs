//! Template-level caching of the located element layout

use std::sync::{Arc, Mutex};

use crate::binder::{OfferContext, TemplateLayout};
use crate::error::{NavileadError, Result, StorageError};
use crate::placeholders::ValidationReport;
use crate::template::OfferTemplate;

/// A template that remembers where its elements are between renders
#[derive(Debug)]
pub struct CachedOfferTemplate {
    template: OfferTemplate,
    layout_cache: Arc<Mutex<Option<TemplateLayout>>>,
}

impl CachedOfferTemplate {
    /// Create a new cached template from an existing template
    pub fn new(template: OfferTemplate) -> Self {
        Self {
            template,
            layout_cache: Arc::new(Mutex::new(None)),
        }
    }

    /// Render the template for an offer, locating elements only once
    pub fn render(&self, ctx: &OfferContext) -> Result<String> {
        let mut cache_guard = self
            .layout_cache
            .lock()
            .map_err(|_| NavileadError::Storage(StorageError::Poisoned))?;

        let layout = match *cache_guard {
            Some(layout) => layout,
            None => {
                let layout = TemplateLayout::locate(&self.template.content)?;
                *cache_guard = Some(layout);
                layout
            }
        };
        drop(cache_guard);

        layout.bind(&self.template.content, ctx)
    }

    /// Clear the cached layout, forcing a lookup on next render
    pub fn clear_cache(&self) -> Result<()> {
        let mut cache_guard = self
            .layout_cache
            .lock()
            .map_err(|_| NavileadError::Storage(StorageError::Poisoned))?;
        *cache_guard = None;
        Ok(())
    }

    /// Check if the template has a cached layout
    pub fn is_cached(&self) -> bool {
        self.layout_cache
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Get a reference to the underlying template
    pub fn template(&self) -> &OfferTemplate {
        &self.template
    }

    /// Validate the template's content
    pub fn validate(&self) -> ValidationReport {
        self.template.validate()
    }
}

impl Clone for CachedOfferTemplate {
    fn clone(&self) -> Self {
        Self {
            template: self.template.clone(),
            layout_cache: Arc::new(Mutex::new(None)), // New cache for clone
        }
    }
}

/// Extension trait to add caching capabilities to OfferTemplate
pub trait TemplateCache {
    /// Convert this template into a cached template
    fn with_cache(self) -> CachedOfferTemplate;
}

impl TemplateCache for OfferTemplate {
    fn with_cache(self) -> CachedOfferTemplate {
        CachedOfferTemplate::new(self)
    }
}
