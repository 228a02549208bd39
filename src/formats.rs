use crate::validator::{validate_custom_format_record, FormatValidation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum FormatStoreError {
    #[error("format failed validation: {}", .errors.join("; "))]
    Invalid { errors: Vec<String> },
    #[error("no custom format with id {0}")]
    NotFound(String),
}

/// A user-authored template. Only valid records enter the store; the
/// validation result rides along so the UI can show warnings after save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomFormat {
    pub id: String,
    pub name: String,
    pub template: String,
    pub created_at: DateTime<Utc>,
    pub validation: FormatValidation,
}

impl CustomFormat {
    pub fn new(name: &str, template: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            template: template.to_string(),
            created_at: Utc::now(),
            validation: validate_custom_format_record(name, template),
        }
    }
}

/// In-memory store of user-defined formats. Persistence lives with the
/// caller; this layer only enforces the validation gate.
#[derive(Debug, Default)]
pub struct CustomFormatStore {
    formats: Vec<CustomFormat>,
}

impl CustomFormatStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &[CustomFormat] {
        &self.formats
    }

    pub fn get(&self, id: &str) -> Option<&CustomFormat> {
        self.formats.iter().find(|f| f.id == id)
    }

    /// Validate and insert. Invalid records are rejected with the full
    /// error list so the authoring UI can show every problem at once.
    pub fn add(&mut self, name: &str, template: &str) -> Result<CustomFormat, FormatStoreError> {
        let record = CustomFormat::new(name, template);
        if !record.validation.is_valid {
            return Err(FormatStoreError::Invalid {
                errors: record.validation.errors,
            });
        }
        log::debug!("stored custom format {} ({})", record.name, record.id);
        self.formats.push(record.clone());
        Ok(record)
    }

    /// Replace name and template of an existing record, re-validating.
    pub fn update(
        &mut self,
        id: &str,
        name: &str,
        template: &str,
    ) -> Result<CustomFormat, FormatStoreError> {
        let position = self
            .formats
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| FormatStoreError::NotFound(id.to_string()))?;

        let validation = validate_custom_format_record(name, template);
        if !validation.is_valid {
            return Err(FormatStoreError::Invalid {
                errors: validation.errors,
            });
        }

        let existing = &mut self.formats[position];
        existing.name = name.to_string();
        existing.template = template.to_string();
        existing.validation = validation;
        Ok(existing.clone())
    }

    /// Copy an existing record under a new id and a "(copy)" name.
    pub fn duplicate(&mut self, id: &str) -> Result<CustomFormat, FormatStoreError> {
        let source = self
            .get(id)
            .ok_or_else(|| FormatStoreError::NotFound(id.to_string()))?;
        let copy = CustomFormat::new(&format!("{} (copy)", source.name), &source.template);
        self.formats.push(copy.clone());
        Ok(copy)
    }

    pub fn remove(&mut self, id: &str) -> Result<CustomFormat, FormatStoreError> {
        let position = self
            .formats
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| FormatStoreError::NotFound(id.to_string()))?;
        let removed = self.formats.remove(position);
        log::debug!("removed custom format {} ({})", removed.name, removed.id);
        Ok(removed)
    }
}
