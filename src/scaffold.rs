use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// The seven dimensions of a structured image prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotKey {
    #[serde(rename = "S")]
    Subject,
    #[serde(rename = "C")]
    Context,
    #[serde(rename = "St")]
    Style,
    #[serde(rename = "Co")]
    Composition,
    #[serde(rename = "L")]
    Lighting,
    #[serde(rename = "A")]
    Atmosphere,
    #[serde(rename = "Q")]
    Quality,
}

impl SlotKey {
    /// Canonical slot order, used everywhere a scaffold is built or rendered.
    pub const ALL: [SlotKey; 7] = [
        SlotKey::Subject,
        SlotKey::Context,
        SlotKey::Style,
        SlotKey::Composition,
        SlotKey::Lighting,
        SlotKey::Atmosphere,
        SlotKey::Quality,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            SlotKey::Subject => "S",
            SlotKey::Context => "C",
            SlotKey::Style => "St",
            SlotKey::Composition => "Co",
            SlotKey::Lighting => "L",
            SlotKey::Atmosphere => "A",
            SlotKey::Quality => "Q",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SlotKey::Subject => "Subject",
            SlotKey::Context => "Context",
            SlotKey::Style => "Style",
            SlotKey::Composition => "Composition",
            SlotKey::Lighting => "Lighting",
            SlotKey::Atmosphere => "Atmosphere",
            SlotKey::Quality => "Quality",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SlotKey::Subject => "The main subject or focal point of the image",
            SlotKey::Context => "The setting, environment, or background",
            SlotKey::Style => "Art style, medium, or visual reference",
            SlotKey::Composition => "Framing, camera angle, or shot type",
            SlotKey::Lighting => "Light source, direction, and intensity",
            SlotKey::Atmosphere => "Mood, emotion, or overall feeling",
            SlotKey::Quality => "Quality boosters and rendering detail",
        }
    }

    /// The `{KEY}` placeholder this slot occupies in a template string.
    pub fn placeholder(&self) -> String {
        format!("{{{}}}", self.token())
    }

    pub fn from_token(token: &str) -> Option<SlotKey> {
        SlotKey::ALL.iter().copied().find(|k| k.token() == token)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaffoldSlot {
    pub key: SlotKey,
    pub name: String,
    pub description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f32>,
}

/// Absorb JSON `null` content at the boundary so it can never surface
/// as a literal "null" in rendered output.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

impl ScaffoldSlot {
    pub fn empty(key: SlotKey) -> Self {
        Self {
            key,
            name: key.display_name().to_string(),
            description: key.description().to_string(),
            content: String::new(),
            weight: None,
        }
    }

    pub fn is_filled(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

/// Fresh scaffold with all seven slots present and empty.
pub fn create_empty_scaffold() -> Vec<ScaffoldSlot> {
    SlotKey::ALL.iter().map(|k| ScaffoldSlot::empty(*k)).collect()
}

/// Rebuild a scaffold into canonical shape: exactly the seven keys, in
/// canonical order. Missing slots come back empty, duplicates keep their
/// first occurrence, anything else is discarded.
pub fn normalize_scaffold(scaffold: &[ScaffoldSlot]) -> Vec<ScaffoldSlot> {
    SlotKey::ALL
        .iter()
        .map(|key| {
            scaffold
                .iter()
                .find(|s| s.key == *key)
                .cloned()
                .unwrap_or_else(|| ScaffoldSlot::empty(*key))
        })
        .collect()
}

pub fn get_filled_slots(scaffold: &[ScaffoldSlot]) -> Vec<&ScaffoldSlot> {
    scaffold.iter().filter(|s| s.is_filled()).collect()
}

pub fn get_empty_slots(scaffold: &[ScaffoldSlot]) -> Vec<&ScaffoldSlot> {
    scaffold.iter().filter(|s| !s.is_filled()).collect()
}

/// Functional update: returns a new scaffold with the one matching slot
/// replaced. The input is never mutated.
pub fn update_scaffold_slot(
    scaffold: &[ScaffoldSlot],
    key: SlotKey,
    content: &str,
    weight: Option<f32>,
) -> Vec<ScaffoldSlot> {
    let mut next = normalize_scaffold(scaffold);
    if let Some(slot) = next.iter_mut().find(|s| s.key == key) {
        slot.content = content.to_string();
        slot.weight = weight;
    }
    next
}

/// Project a scaffold into a key-to-content map for template substitution.
pub fn scaffold_to_map(scaffold: &[ScaffoldSlot]) -> HashMap<SlotKey, String> {
    normalize_scaffold(scaffold)
        .into_iter()
        .map(|s| (s.key, s.content))
        .collect()
}
