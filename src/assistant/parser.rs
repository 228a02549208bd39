use crate::scaffold::{create_empty_scaffold, ScaffoldSlot, SlotKey};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Deserialize)]
struct SlotsEnvelope {
    slots: HashMap<String, Option<String>>,
}

/// Pull a scaffold out of raw model output. Tries the instructed JSON shape
/// first, then falls back to "Token: content" lines for models that ignore
/// the format instruction. Always yields a full seven-slot scaffold.
pub fn parse_scaffold_response(response: &str) -> Result<Vec<ScaffoldSlot>, String> {
    if let Some(json) = extract_json(response) {
        if let Ok(envelope) = serde_json::from_str::<SlotsEnvelope>(&json) {
            return Ok(scaffold_from_entries(envelope.slots));
        }
        log::debug!("assistant JSON did not match the slots shape, trying line parse");
    }

    let entries = parse_slot_lines(response);
    if entries.is_empty() {
        return Err(format!(
            "no scaffold found in response: {}",
            truncate(response, 200)
        ));
    }
    Ok(scaffold_from_entries(entries))
}

/// Merge parsed entries onto an empty scaffold. Unknown keys are dropped,
/// missing keys stay empty, JSON nulls become empty content.
fn scaffold_from_entries(entries: HashMap<String, Option<String>>) -> Vec<ScaffoldSlot> {
    let mut scaffold = create_empty_scaffold();
    for (label, content) in entries {
        if let Some(key) = key_for_label(&label) {
            if let Some(slot) = scaffold.iter_mut().find(|s| s.key == key) {
                slot.content = content.unwrap_or_default().trim().to_string();
            }
        }
    }
    scaffold
}

/// Accept canonical tokens and full slot names, case-insensitively.
fn key_for_label(label: &str) -> Option<SlotKey> {
    if let Some(key) = SlotKey::from_token(label) {
        return Some(key);
    }
    let lowered = label.trim().to_lowercase();
    SlotKey::ALL.iter().copied().find(|key| {
        key.token().to_lowercase() == lowered || key.display_name().to_lowercase() == lowered
    })
}

/// Extract the first brace-balanced JSON object from free-form text.
fn extract_json(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let mut depth: usize = 0;

    for (i, c) in text[start..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(text[start..start + i + 1].to_string());
                }
            }
            _ => {}
        }
    }

    None
}

/// Fallback: one "Token: content" pair per line.
fn parse_slot_lines(response: &str) -> HashMap<String, Option<String>> {
    let pattern = Regex::new(r"^\s*([A-Za-z]{1,12})\s*[:\-]\s*(.+)$").expect("slot line pattern");
    let mut entries = HashMap::new();

    for line in response.lines() {
        if let Some(caps) = pattern.captures(line) {
            let content = caps[2].trim().to_string();
            if let Some(key) = key_for_label(&caps[1]) {
                // First occurrence of a slot wins
                entries
                    .entry(key.token().to_string())
                    .or_insert(Some(content));
            }
        }
    }

    entries
}

fn truncate(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaffold::get_filled_slots;

    #[test]
    fn test_parses_instructed_json_shape() {
        let response = r#"{"slots":{"S":"a red dragon","C":"a ruined castle","St":"fantasy art","Co":"","L":"sunset","A":"","Q":""}}"#;
        let scaffold = parse_scaffold_response(response).unwrap();
        assert_eq!(scaffold.len(), 7);
        assert_eq!(scaffold[0].content, "a red dragon");
        assert_eq!(get_filled_slots(&scaffold).len(), 4);
    }

    #[test]
    fn test_parses_json_wrapped_in_prose() {
        let response = concat!(
            "Sure, here is the breakdown:\n",
            r#"{"slots":{"S":"a fox","C":"snowy forest","St":"","Co":"","L":"","A":"","Q":""}}"#,
            "\nLet me know if you want changes."
        );
        let scaffold = parse_scaffold_response(response).unwrap();
        assert_eq!(scaffold[0].content, "a fox");
    }

    #[test]
    fn test_null_slot_content_becomes_empty() {
        let response = r#"{"slots":{"S":"a fox","C":null,"St":null,"Co":null,"L":null,"A":null,"Q":null}}"#;
        let scaffold = parse_scaffold_response(response).unwrap();
        assert_eq!(get_filled_slots(&scaffold).len(), 1);
        for slot in &scaffold[1..] {
            assert!(slot.content.is_empty());
        }
    }

    #[test]
    fn test_unknown_keys_are_dropped() {
        let response = r#"{"slots":{"S":"a fox","Mood":"somber","X":"ignored"}}"#;
        let scaffold = parse_scaffold_response(response).unwrap();
        assert_eq!(scaffold.len(), 7);
        assert_eq!(get_filled_slots(&scaffold).len(), 1);
    }

    #[test]
    fn test_line_fallback_with_tokens() {
        let response = "S: a lighthouse on a cliff\nC: stormy northern coast\nL: lightning";
        let scaffold = parse_scaffold_response(response).unwrap();
        assert_eq!(scaffold[0].content, "a lighthouse on a cliff");
        assert_eq!(get_filled_slots(&scaffold).len(), 3);
    }

    #[test]
    fn test_line_fallback_with_full_names() {
        let response = "Subject: a lighthouse\nLighting: lightning\nStyle: oil painting";
        let scaffold = parse_scaffold_response(response).unwrap();
        assert_eq!(scaffold[0].content, "a lighthouse");
        assert_eq!(scaffold[2].content, "oil painting");
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(parse_scaffold_response("I cannot help with that.").is_err());
        assert!(parse_scaffold_response("").is_err());
    }
}
