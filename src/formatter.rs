use crate::scaffold::SlotKey;
use crate::templates::ModelTemplate;
use serde_json::Value;
use std::collections::HashMap;

/// Render a scaffold into one engine's prompt syntax. Pure: missing slot
/// values substitute as empty strings, so rendering always succeeds even
/// mid-conversation with a partially filled scaffold.
pub fn format_prompt_for_model(
    values: &HashMap<SlotKey, String>,
    template: &ModelTemplate,
    negative_prompt: Option<&str>,
) -> String {
    let mut output = template.format.clone();

    for key in SlotKey::ALL {
        let value = values.get(&key).map(String::as_str).unwrap_or("");
        output = output.replace(&key.placeholder(), value);
    }

    // {neg} is substituted wherever it appears, never left as a literal.
    let negative = negative_prompt.unwrap_or("").trim();
    output = output.replace("{neg}", negative);

    // Engine parameter defaults cover the remaining placeholders, e.g. {ar}.
    for (name, default) in &template.parameters {
        output = output.replace(&format!("{{{}}}", name), &parameter_value(default));
    }

    let mut output = normalize(&output);

    if !negative.is_empty() && !template.negative_format.is_empty() {
        let rendered = normalize(&template.negative_format.replace("{neg}", negative));
        if !rendered.is_empty() {
            output.push(' ');
            output.push_str(&rendered);
        }
    }

    output.trim().to_string()
}

fn parameter_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Clean up artifacts left by empty substitutions: collapse comma runs,
/// strip leading and trailing commas, collapse whitespace, trim.
fn normalize(text: &str) -> String {
    text.split(',')
        .map(collapse_whitespace)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<String>>()
        .join(", ")
}

fn collapse_whitespace(segment: &str) -> String {
    segment.split_whitespace().collect::<Vec<&str>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaffold::{create_empty_scaffold, scaffold_to_map, update_scaffold_slot};
    use crate::templates::TemplateRegistry;

    fn full_scaffold_values() -> HashMap<SlotKey, String> {
        let mut scaffold = create_empty_scaffold();
        for (key, content) in [
            (SlotKey::Subject, "dragon"),
            (SlotKey::Context, "castle"),
            (SlotKey::Style, "fantasy art"),
            (SlotKey::Composition, "wide shot"),
            (SlotKey::Lighting, "sunset"),
            (SlotKey::Atmosphere, "epic"),
            (SlotKey::Quality, "high quality"),
        ] {
            scaffold = update_scaffold_slot(&scaffold, key, content, None);
        }
        scaffold_to_map(&scaffold)
    }

    #[test]
    fn test_stable_diffusion_comma_joined() {
        let registry = TemplateRegistry::builtin();
        let template = registry.get("stable-diffusion").unwrap();
        let output = format_prompt_for_model(&full_scaffold_values(), template, None);
        assert_eq!(
            output,
            "dragon, castle, fantasy art, wide shot, sunset, epic, high quality"
        );
    }

    #[test]
    fn test_midjourney_negative_and_version_flag() {
        let registry = TemplateRegistry::builtin();
        let template = registry.get("midjourney").unwrap();
        let output =
            format_prompt_for_model(&full_scaffold_values(), template, Some("cartoon, anime"));
        assert!(output.contains("--no cartoon"));
        assert!(output.contains("--v 6"));
        assert!(output.contains("--ar 16:9"));
    }

    #[test]
    fn test_imagen_output_is_valid_json() {
        let registry = TemplateRegistry::builtin();
        let template = registry.get("imagen3").unwrap();
        let output = format_prompt_for_model(&full_scaffold_values(), template, None);
        let parsed: Value = serde_json::from_str(&output).unwrap();
        let text = parsed["text"].as_str().unwrap();
        assert!(text.contains("dragon"));
    }

    #[test]
    fn test_missing_values_never_leak_null_or_undefined() {
        let registry = TemplateRegistry::builtin();
        let mut values = HashMap::new();
        values.insert(SlotKey::Subject, "dragon".to_string());
        values.insert(SlotKey::Lighting, String::new());
        for template in registry.all() {
            for negative in [None, Some("blurry")] {
                let output = format_prompt_for_model(&values, template, negative);
                assert!(!output.contains("null"), "{}: {}", template.id, output);
                assert!(!output.contains("undefined"), "{}: {}", template.id, output);
            }
        }
    }

    #[test]
    fn test_mostly_empty_scaffold_has_no_comma_artifacts() {
        let registry = TemplateRegistry::builtin();
        let template = registry.get("stable-diffusion").unwrap();
        let mut values = HashMap::new();
        values.insert(SlotKey::Subject, "dragon".to_string());
        values.insert(SlotKey::Context, "castle".to_string());
        let output = format_prompt_for_model(&values, template, None);
        assert_eq!(output, "dragon, castle");
        assert!(!output.contains(",,"));
        assert!(!output.contains(", ,"));
        assert!(!output.starts_with(','));
        assert!(!output.ends_with(','));
    }

    #[test]
    fn test_negative_prompt_dropped_when_engine_lacks_support() {
        let registry = TemplateRegistry::builtin();
        let template = registry.get("dalle3").unwrap();
        let output =
            format_prompt_for_model(&full_scaffold_values(), template, Some("low resolution"));
        assert!(!output.contains("low resolution"));
        assert!(!output.contains("{neg}"));
    }

    #[test]
    fn test_neg_placeholder_never_leaks_without_negative_prompt() {
        let registry = TemplateRegistry::builtin();
        for template in registry.all() {
            let output = format_prompt_for_model(&full_scaffold_values(), template, None);
            assert!(!output.contains("{neg}"), "{}: {}", template.id, output);
        }
    }

    #[test]
    fn test_flux_pipe_delimited() {
        let registry = TemplateRegistry::builtin();
        let template = registry.get("flux").unwrap();
        let output = format_prompt_for_model(&full_scaffold_values(), template, Some("text"));
        assert!(output.starts_with("dragon | castle"));
        assert!(output.ends_with("[avoid: text]"));
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        let mut values = full_scaffold_values();
        values.insert(SlotKey::Subject, "a   red    dragon".to_string());
        let registry = TemplateRegistry::builtin();
        let template = registry.get("stable-diffusion").unwrap();
        let output = format_prompt_for_model(&values, template, None);
        assert!(output.starts_with("a red dragon, castle"));
    }
}
