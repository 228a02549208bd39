use crate::scaffold::SlotKey;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Templates past this length risk downstream engine limits.
pub const MAX_TEMPLATE_LENGTH: usize = 2000;

/// Placeholders the formatter substitutes beyond the seven slot tokens.
const EXTRA_TOKENS: [&str; 2] = ["neg", "ar"];

/// Outcome of validating a user-authored template. Authoring mistakes are
/// an expected path, so this is a normal return value, not an error type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Check a custom template string: all seven slot placeholders must appear
/// at least once, braces must balance. Unknown placeholders and excessive
/// length only warn.
pub fn validate_custom_format(template: &str) -> FormatValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if template.trim().is_empty() {
        errors.push("Template is empty".to_string());
        return FormatValidation {
            is_valid: false,
            errors,
            warnings,
        };
    }

    if !braces_balanced(template) {
        errors.push("Template has unbalanced braces".to_string());
    }

    let found = placeholder_tokens(template);

    for key in SlotKey::ALL {
        if !found.iter().any(|token| token == key.token()) {
            errors.push(format!(
                "Missing required placeholder {{{}}} ({})",
                key.token(),
                key.display_name()
            ));
        }
    }

    let unknown: Vec<&str> = found
        .iter()
        .map(String::as_str)
        .filter(|token| SlotKey::from_token(token).is_none() && !EXTRA_TOKENS.contains(token))
        .collect();
    if !unknown.is_empty() {
        warnings.push(format!(
            "Unknown placeholder(s) will not be substituted: {}",
            unknown.join(", ")
        ));
    }

    if template.len() > MAX_TEMPLATE_LENGTH {
        warnings.push(format!(
            "Template is longer than {} characters and may exceed engine limits",
            MAX_TEMPLATE_LENGTH
        ));
    }

    FormatValidation {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// Validate a full custom format record: the template rules plus a
/// non-empty name.
pub fn validate_custom_format_record(name: &str, template: &str) -> FormatValidation {
    let mut result = validate_custom_format(template);
    if name.trim().is_empty() {
        result.errors.insert(0, "Name is empty".to_string());
        result.is_valid = false;
    }
    result
}

/// Distinct placeholder tokens in first-appearance order.
fn placeholder_tokens(template: &str) -> Vec<String> {
    let pattern = Regex::new(r"\{([A-Za-z][A-Za-z0-9_]*)\}").expect("placeholder pattern");
    let mut tokens = Vec::new();
    for capture in pattern.captures_iter(template) {
        let token = capture[1].to_string();
        if !tokens.contains(&token) {
            tokens.push(token);
        }
    }
    tokens
}

fn braces_balanced(template: &str) -> bool {
    let mut depth: i32 = 0;
    for c in template.chars() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}
