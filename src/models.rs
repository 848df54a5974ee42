use std::collections::BTreeMap;

use serde::{Serialize, Deserialize, Deserializer};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Price per square meter used for the fit-out estimate, in AED.
pub const COST_PER_SQUARE_METER: f64 = 2000.0;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct DesignInputs {
    pub style: String,
    pub property_type: String,
    pub room_type: String,
    #[serde(deserialize_with = "text_or_number")]
    pub size: String, // square meters, entered as text
    pub color_palette: String,
    pub materials: String,
    pub lighting: String,
    pub details: String,
}

/// Field name -> message, for every required field the visitor left blank.
pub type FieldErrors = BTreeMap<&'static str, &'static str>;

impl DesignInputs {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let required: [(&'static str, &str, &'static str); 7] = [
            ("style", self.style.as_str(), "Please select a style"),
            ("property_type", self.property_type.as_str(), "Please select a property type"),
            ("room_type", self.room_type.as_str(), "Please select a room type"),
            ("size", self.size.as_str(), "Please enter the room size"),
            ("color_palette", self.color_palette.as_str(), "Please select a palette"),
            ("materials", self.materials.as_str(), "Please select materials"),
            ("lighting", self.lighting.as_str(), "Please select lighting"),
        ];
        let mut errors: FieldErrors = required
            .into_iter()
            .filter(|(_, value, _)| value.trim().is_empty())
            .map(|(field, _, message)| (field, message))
            .collect();
        if !errors.contains_key("size") && self.size_m2() < 0.0 {
            errors.insert("size", "Room size cannot be negative");
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    pub fn has_details(&self) -> bool {
        !self.details.trim().is_empty()
    }

    /// Numeric room size, 0 when the text is not a number.
    pub fn size_m2(&self) -> f64 {
        self.size.trim().parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0)
    }
}

fn text_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw { Text(String), Number(serde_json::Number) }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

/// Prompt emphasis used to diversify the three concepts of a batch.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Variation { Light, Texture, Contrast }

impl Variation {
    pub const ALL: [Variation; 3] = [Variation::Light, Variation::Texture, Variation::Contrast];
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Concept {
    pub id: Uuid,
    pub image_url: String, // data:<mime>;base64,<payload>
    pub title: String,
    pub description: String,
    pub inputs: DesignInputs,
    pub variation: Variation,
    pub created_at: DateTime<Utc>,
}

impl Concept {
    pub fn estimated_cost(&self) -> f64 {
        self.inputs.size_m2() * COST_PER_SQUARE_METER
    }

    /// e.g. "From 50,000 AED". Never prices below zero.
    pub fn cost_label(&self) -> String {
        format!("From {} AED", group_thousands(self.estimated_cost().max(0.0).round() as u64))
    }

    pub fn download_name(&self, extension: &str) -> String {
        let id = self.id.simple().to_string();
        format!("bamx-belmore-concept-{}.{}", &id[..8], extension)
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadingState {
    #[default]
    Idle,
    Generating,
    Complete,
    Error,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LeadRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Lead {
    pub name: String,
    pub email: String,
    pub concept_ids: Vec<Uuid>,
    pub submitted_at: DateTime<Utc>,
}

#[cfg(test)]
pub(crate) fn sample_inputs() -> DesignInputs {
    DesignInputs {
        style: "Scandinavian".into(),
        property_type: "Apartment".into(),
        room_type: "Living room".into(),
        size: "25".into(),
        color_palette: "Warm Neutrals (Beige, Cream, Taupe)".into(),
        materials: "Natural Wood & Linen".into(),
        lighting: "Flooded with Natural Daylight".into(),
        details: String::new(),
    }
}
