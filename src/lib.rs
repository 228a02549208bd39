pub mod assistant;
pub mod formats;
pub mod formatter;
pub mod prompt;
pub mod quality;
pub mod scaffold;
pub mod templates;
pub mod validator;

pub use assistant::{AssistantClient, AssistantConfig, AssistantError};
pub use formats::{CustomFormat, CustomFormatStore, FormatStoreError};
pub use formatter::format_prompt_for_model;
pub use prompt::{GeneratedPrompt, PromptMetadata};
pub use quality::{calculate_prompt_quality, QualityReport};
pub use scaffold::{
    create_empty_scaffold, get_empty_slots, get_filled_slots, scaffold_to_map,
    update_scaffold_slot, ScaffoldSlot, SlotKey,
};
pub use templates::{ModelTemplate, TemplateRegistry};
pub use validator::{validate_custom_format, validate_custom_format_record, FormatValidation};
