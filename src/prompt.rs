use crate::formatter::format_prompt_for_model;
use crate::quality::{calculate_prompt_quality, QualityReport};
use crate::scaffold::{normalize_scaffold, scaffold_to_map, update_scaffold_slot, ScaffoldSlot, SlotKey};
use crate::templates::TemplateRegistry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

const PROMPT_SCHEMA_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptMetadata {
    pub created_at: DateTime<Utc>,
    pub model: String,
    pub version: String,
}

/// One assistant turn that produced a scaffold. `formatted_outputs` is a
/// cache keyed by template id, recomputable from the scaffold at any time;
/// the scaffold is the source of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedPrompt {
    pub id: String,
    pub scaffold: Vec<ScaffoldSlot>,
    pub raw_text: String,
    pub formatted_outputs: HashMap<String, String>,
    pub metadata: PromptMetadata,
}

impl GeneratedPrompt {
    pub fn new(
        scaffold: Vec<ScaffoldSlot>,
        raw_text: String,
        model: &str,
        registry: &TemplateRegistry,
    ) -> Self {
        let mut prompt = Self {
            id: Uuid::new_v4().to_string(),
            scaffold: normalize_scaffold(&scaffold),
            raw_text,
            formatted_outputs: HashMap::new(),
            metadata: PromptMetadata {
                created_at: Utc::now(),
                model: model.to_string(),
                version: PROMPT_SCHEMA_VERSION.to_string(),
            },
        };
        prompt.render_outputs(registry);
        prompt
    }

    /// Recompute the per-engine renderings. Call after any scaffold edit.
    pub fn render_outputs(&mut self, registry: &TemplateRegistry) {
        let values = scaffold_to_map(&self.scaffold);
        self.formatted_outputs = registry
            .all()
            .iter()
            .map(|template| {
                (
                    template.id.clone(),
                    format_prompt_for_model(&values, template, None),
                )
            })
            .collect();
    }

    /// Edit one slot and refresh the cached renderings.
    pub fn update_slot(
        &mut self,
        key: SlotKey,
        content: &str,
        weight: Option<f32>,
        registry: &TemplateRegistry,
    ) {
        self.scaffold = update_scaffold_slot(&self.scaffold, key, content, weight);
        self.render_outputs(registry);
    }

    pub fn quality(&self) -> QualityReport {
        calculate_prompt_quality(&self.scaffold)
    }
}
