use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::Storage;
use crate::error::{NavileadError, Result, StorageError, TemplateError};
use crate::template::{OfferTemplate, TemplateId};

/// In-memory storage, used by tests and ephemeral servers
#[derive(Debug, Default)]
pub struct MemoryStorage {
    templates: RwLock<HashMap<TemplateId, OfferTemplate>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> NavileadError {
    NavileadError::Storage(StorageError::Poisoned)
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn save_template(&self, template: &OfferTemplate) -> Result<()> {
        template.ensure_valid()?;
        self.templates
            .write()
            .map_err(poisoned)?
            .insert(template.id.clone(), template.clone());
        Ok(())
    }

    async fn get_template(&self, id: &TemplateId) -> Result<OfferTemplate> {
        self.templates
            .read()
            .map_err(poisoned)?
            .get(id)
            .cloned()
            .ok_or_else(|| NavileadError::Template(TemplateError::NotFound { id: id.0.clone() }))
    }

    async fn list_templates(&self) -> Result<Vec<OfferTemplate>> {
        let mut templates: Vec<OfferTemplate> =
            self.templates.read().map_err(poisoned)?.values().cloned().collect();
        templates.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(templates)
    }

    async fn delete_template(&self, id: &TemplateId) -> Result<()> {
        self.templates.write().map_err(poisoned)?.remove(id);
        Ok(())
    }
}
