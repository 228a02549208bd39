use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

/// An engine-specific prompt template. `format` holds `{KEY}` placeholders
/// for the seven scaffold tokens plus optional `{neg}` and `{ar}`.
/// An empty `negative_format` means the engine takes no negative prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelTemplate {
    pub id: String,
    pub name: String,
    pub format: String,
    pub negative_format: String,
    pub parameters: HashMap<String, Value>,
}

/// Immutable catalog of the built-in model templates. Built once at startup
/// and passed by reference; lookups never panic.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: Vec<ModelTemplate>,
}

impl TemplateRegistry {
    pub fn builtin() -> Self {
        Self {
            templates: vec![
                ModelTemplate {
                    id: "stable-diffusion".to_string(),
                    name: "Stable Diffusion".to_string(),
                    format: "{S}, {C}, {St}, {Co}, {L}, {A}, {Q}".to_string(),
                    negative_format: "Negative prompt: {neg}".to_string(),
                    parameters: HashMap::from([
                        ("steps".to_string(), json!(30)),
                        ("cfg_scale".to_string(), json!(7)),
                        ("sampler".to_string(), json!("DPM++ 2M Karras")),
                    ]),
                },
                ModelTemplate {
                    id: "midjourney".to_string(),
                    name: "Midjourney".to_string(),
                    format: "{S}, {C}, {St}, {Co}, {L}, {A}, {Q} --ar {ar} --v 6".to_string(),
                    negative_format: "--no {neg}".to_string(),
                    parameters: HashMap::from([
                        ("ar".to_string(), json!("16:9")),
                        ("stylize".to_string(), json!(100)),
                    ]),
                },
                ModelTemplate {
                    id: "dalle3".to_string(),
                    name: "DALL-E 3".to_string(),
                    format: "A {St} depiction of {S} set against {C}, {Co}, {L}, {A}, {Q}"
                        .to_string(),
                    negative_format: String::new(),
                    parameters: HashMap::from([
                        ("size".to_string(), json!("1024x1024")),
                        ("style".to_string(), json!("vivid")),
                    ]),
                },
                ModelTemplate {
                    id: "imagen3".to_string(),
                    name: "Imagen 3".to_string(),
                    format: concat!(
                        r#"{"text": "{S}, {C}, {St}, {Co}, {L}, {A}, {Q}", "#,
                        r#""aspect_ratio": "{ar}", "#,
                        r#""safety_setting": "block_medium_and_above"}"#
                    )
                    .to_string(),
                    negative_format: String::new(),
                    parameters: HashMap::from([("ar".to_string(), json!("1:1"))]),
                },
                ModelTemplate {
                    id: "flux".to_string(),
                    name: "Flux".to_string(),
                    format: "{S} | {C} | {St} | {Co} | {L} | {A} | {Q}".to_string(),
                    negative_format: "[avoid: {neg}]".to_string(),
                    parameters: HashMap::from([
                        ("guidance".to_string(), json!(3.5)),
                        ("steps".to_string(), json!(28)),
                    ]),
                },
            ],
        }
    }

    pub fn all(&self) -> &[ModelTemplate] {
        &self.templates
    }

    pub fn get(&self, id: &str) -> Option<&ModelTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn default_template(&self) -> &ModelTemplate {
        &self.templates[0]
    }

    pub fn is_valid_template_id(&self, id: &str) -> bool {
        self.get(id).is_some()
    }
}
