//! Merchant-authored offer templates

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::binder::{OfferContext, bind_offer};
use crate::error::{
    DataError, NavileadError, Result, StorageError, TemplateError, missing_placeholders,
};
use crate::placeholders::{ValidationReport, validate_template};

/// Unique identifier for a template
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TemplateId(pub String);

impl From<String> for TemplateId {
    fn from(s: String) -> Self {
        TemplateId(s)
    }
}

impl From<&str> for TemplateId {
    fn from(s: &str) -> Self {
        TemplateId(s.to_string())
    }
}

impl AsRef<str> for TemplateId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TemplateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An HTML offer template authored by a merchant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OfferTemplate {
    /// Unique identifier
    pub id: TemplateId,

    /// Human-readable name
    pub name: String,

    /// HTML with placeholder tokens
    pub content: String,

    /// Optional description
    pub description: Option<String>,

    /// Creation timestamp
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: time::OffsetDateTime,

    /// Last update timestamp
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: time::OffsetDateTime,
}

impl OfferTemplate {
    /// Create a new template
    pub fn new(id: impl Into<TemplateId>, name: impl Into<String>, content: impl Into<String>) -> Self {
        let now = time::OffsetDateTime::now_utc();
        OfferTemplate {
            id: id.into(),
            name: name.into(),
            content: content.into(),
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a new template builder
    pub fn builder(id: impl Into<TemplateId>) -> TemplateBuilder {
        TemplateBuilder::new(id.into())
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check the content against the placeholder vocabulary
    pub fn validate(&self) -> ValidationReport {
        validate_template(&self.content)
    }

    /// Like [`OfferTemplate::validate`], but fails on an invalid template
    pub fn ensure_valid(&self) -> Result<ValidationReport> {
        let report = self.validate();
        if let Some(error) = report.errors.first() {
            return Err(NavileadError::Template(TemplateError::InvalidStructure {
                message: error.clone(),
            }));
        }
        if !report.missing.is_empty() {
            return Err(missing_placeholders(report.missing));
        }
        Ok(report)
    }

    /// Render the template for an offer
    pub fn render(&self, ctx: &OfferContext) -> Result<String> {
        bind_offer(&self.content, ctx)
    }

    /// Load a template from an `.html` file; the file stem becomes the id
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            NavileadError::Storage(StorageError::Read {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
        })?;

        let id = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .ok_or_else(|| {
                NavileadError::Template(TemplateError::InvalidContent {
                    reason: format!("{} has no file name", path.display()),
                })
            })?;

        Ok(OfferTemplate::new(id.clone(), id, content))
    }
}

/// Builder for creating templates with a fluent API
#[derive(Debug)]
pub struct TemplateBuilder {
    id: TemplateId,
    name: Option<String>,
    content: Option<String>,
    description: Option<String>,
}

impl TemplateBuilder {
    /// Create a new template builder
    pub fn new(id: TemplateId) -> Self {
        TemplateBuilder {
            id,
            name: None,
            content: None,
            description: None,
        }
    }

    /// Set the template name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the template content
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Set the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Build the template
    pub fn build(self) -> Result<OfferTemplate> {
        let name = self.name.ok_or_else(|| {
            NavileadError::Data(DataError::MissingField {
                field: "name".to_string(),
            })
        })?;
        let content = self.content.ok_or_else(|| {
            NavileadError::Data(DataError::MissingField {
                field: "content".to_string(),
            })
        })?;

        let now = time::OffsetDateTime::now_utc();
        Ok(OfferTemplate {
            id: self.id,
            name,
            content,
            description: self.description,
            created_at: now,
            updated_at: now,
        })
    }

    /// Build the template with its element layout cached
    pub fn build_cached(self) -> Result<crate::cache::CachedOfferTemplate> {
        use crate::cache::TemplateCache;
        Ok(self.build()?.with_cache())
    }
}
