use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

use super::Storage;
use crate::error::{NavileadError, Result, StorageError, TemplateError};
use crate::template::{OfferTemplate, TemplateId};

/// Metadata stored alongside the template
#[derive(Serialize, Deserialize)]
struct TemplateMetadata {
    id: TemplateId,
    name: String,
    description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    created_at: time::OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    updated_at: time::OffsetDateTime,
}

/// File-based storage implementation
///
/// Layout: `<base>/templates/<id>/template.html` and `metadata.json`.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new file storage with the given base path
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn templates_dir(&self) -> PathBuf {
        self.base_path.join("templates")
    }

    /// Get the path to a template directory
    fn template_dir(&self, id: &TemplateId) -> PathBuf {
        self.templates_dir().join(&id.0)
    }

    /// Get the path to a template's HTML file
    fn template_file(&self, id: &TemplateId) -> PathBuf {
        self.template_dir(id).join("template.html")
    }

    /// Get the path to a template's metadata file
    fn metadata_file(&self, id: &TemplateId) -> PathBuf {
        self.template_dir(id).join("metadata.json")
    }
}

fn write_error(path: &Path, e: impl ToString) -> NavileadError {
    NavileadError::Storage(StorageError::Write {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn read_error(path: &Path, e: impl ToString) -> NavileadError {
    NavileadError::Storage(StorageError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

// ids become directory names
fn check_id(id: &TemplateId) -> Result<()> {
    let ok = !id.0.is_empty()
        && id
            .0
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(NavileadError::Template(TemplateError::InvalidContent {
            reason: format!("template id '{}' may only contain letters, digits, '-' and '_'", id),
        }))
    }
}

#[async_trait]
impl Storage for FileStorage {
    /// Save a template to storage
    async fn save_template(&self, template: &OfferTemplate) -> Result<()> {
        check_id(&template.id)?;
        template.ensure_valid()?;

        let template_dir = self.template_dir(&template.id);
        fs::create_dir_all(&template_dir)
            .await
            .map_err(|e| write_error(&template_dir, e))?;

        let template_file = self.template_file(&template.id);
        fs::write(&template_file, &template.content)
            .await
            .map_err(|e| write_error(&template_file, e))?;

        let metadata = TemplateMetadata {
            id: template.id.clone(),
            name: template.name.clone(),
            description: template.description.clone(),
            created_at: template.created_at,
            updated_at: template.updated_at,
        };

        let metadata_file = self.metadata_file(&template.id);
        let metadata_json =
            serde_json::to_string_pretty(&metadata).map_err(|e| write_error(&metadata_file, e))?;
        fs::write(&metadata_file, metadata_json)
            .await
            .map_err(|e| write_error(&metadata_file, e))?;

        debug!(id = %template.id, "saved template");
        Ok(())
    }

    /// Get a template from storage by ID
    async fn get_template(&self, id: &TemplateId) -> Result<OfferTemplate> {
        check_id(id)?;
        let template_file = self.template_file(id);
        if !fs::try_exists(&template_file).await.unwrap_or(false) {
            return Err(NavileadError::Template(TemplateError::NotFound { id: id.0.clone() }));
        }

        let content = fs::read_to_string(&template_file)
            .await
            .map_err(|e| read_error(&template_file, e))?;

        let metadata_file = self.metadata_file(id);
        let metadata_json = fs::read_to_string(&metadata_file)
            .await
            .map_err(|e| read_error(&metadata_file, e))?;

        let metadata: TemplateMetadata = serde_json::from_str(&metadata_json).map_err(|e| {
            NavileadError::Storage(StorageError::CorruptMetadata {
                id: id.0.clone(),
                reason: e.to_string(),
            })
        })?;

        Ok(OfferTemplate {
            id: metadata.id,
            name: metadata.name,
            content,
            description: metadata.description,
            created_at: metadata.created_at,
            updated_at: metadata.updated_at,
        })
    }

    /// List all templates in storage
    async fn list_templates(&self) -> Result<Vec<OfferTemplate>> {
        let templates_dir = self.templates_dir();

        // Create directory if it doesn't exist
        if !fs::try_exists(&templates_dir).await.unwrap_or(false) {
            fs::create_dir_all(&templates_dir)
                .await
                .map_err(|e| write_error(&templates_dir, e))?;
            return Ok(Vec::new());
        }

        let mut templates = Vec::new();
        let mut entries = fs::read_dir(&templates_dir)
            .await
            .map_err(|e| read_error(&templates_dir, e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| read_error(&templates_dir, e))?
        {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(id) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };

            match self.get_template(&TemplateId(id.to_string())).await {
                Ok(template) => templates.push(template),
                Err(e) => warn!("Error loading template {}: {}", id, e),
            }
        }

        templates.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(templates)
    }

    /// Delete a template from storage
    async fn delete_template(&self, id: &TemplateId) -> Result<()> {
        check_id(id)?;
        let template_dir = self.template_dir(id);

        if fs::try_exists(&template_dir).await.unwrap_or(false) {
            fs::remove_dir_all(&template_dir)
                .await
                .map_err(|e| write_error(&template_dir, e))?;
        }

        Ok(())
    }
}
