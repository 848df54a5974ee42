use serde::Serialize;

pub const STYLES: &[&str] = &[
    "Modern", "Minimalist", "Scandinavian", "Industrial", "Japandi",
    "Mid-century modern", "Classic / Neoclassical", "Luxury / High-end",
    "Contemporary", "Rustic", "Mediterranean", "Boho", "Art Deco",
    "Wabi-sabi", "Eclectic", "Surprise me",
];

pub const PROPERTY_TYPES: &[&str] = &[
    "Apartment", "Villa", "Office", "Retail / Shop", "Restaurant / Café",
];

pub const ROOM_TYPES: &[&str] = &[
    "Living room", "Bedroom", "Kitchen", "Dining room", "Bathroom",
    "Home office / Study", "Lobby / Reception", "Meeting room",
    "Open workspace", "Hallway / Entrance", "Terrace / Balcony",
];

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PaletteOption {
    pub label: &'static str,
    pub value: &'static str,
    pub colors: [&'static str; 3],
}

pub const COLOR_PALETTES: &[PaletteOption] = &[
    PaletteOption { label: "Warm Neutrals", value: "Warm Neutrals (Beige, Cream, Taupe)", colors: ["#F5F5F0", "#D6CFC7", "#A89F91"] },
    PaletteOption { label: "Cool Neutrals", value: "Cool Neutrals (Crisp White, Grey)", colors: ["#FFFFFF", "#E5E7EB", "#9CA3AF"] },
    PaletteOption { label: "Earth Tones", value: "Earth Tones (Terracotta, Sage, Brown)", colors: ["#C07A5F", "#94A384", "#6B5B4E"] },
    PaletteOption { label: "Dark & Moody", value: "Dark & Moody (Charcoal, Navy, Deep Green)", colors: ["#2D3748", "#1E3A8A", "#1C4532"] },
    PaletteOption { label: "Monochrome", value: "Black & White Monochrome", colors: ["#000000", "#737373", "#FFFFFF"] },
    PaletteOption { label: "Pastel & Soft", value: "Pastel & Soft", colors: ["#FDE2E4", "#E0F2FE", "#F3E8FF"] },
    PaletteOption { label: "Vibrant", value: "Vibrant & Bold Accents", colors: ["#F59E0B", "#EF4444", "#10B981"] },
];

pub const MATERIALS: &[&str] = &[
    "Natural Wood & Linen",
    "Marble, Brass & Velvet",
    "Concrete & Raw Steel",
    "Glass, Chrome & Leather",
    "Natural Stone & Rattan",
    "Dark Wood & Tweed",
    "Polished Plaster & Travertine",
];

pub const LIGHTING_PREFERENCES: &[&str] = &[
    "Flooded with Natural Daylight",
    "Warm & Cozy Evening Ambience",
    "Dramatic Architectural Spots",
    "Soft & Diffused (Cloudy Day)",
    "Bright & Clinical",
];

/// Word list for concept titles.
pub const CONCEPT_ADJECTIVES: &[&str] = &[
    "Serene", "Bold", "Elegant", "Timeless", "Airy", "Grounded",
    "Functional", "Artistic", "Cozy", "Radiant", "Polished", "Organic",
];

/// Everything the design form needs to render its selects.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub styles: &'static [&'static str],
    pub property_types: &'static [&'static str],
    pub room_types: &'static [&'static str],
    pub color_palettes: &'static [PaletteOption],
    pub materials: &'static [&'static str],
    pub lighting: &'static [&'static str],
}

pub fn catalog() -> Catalog {
    Catalog {
        styles: STYLES,
        property_types: PROPERTY_TYPES,
        room_types: ROOM_TYPES,
        color_palettes: COLOR_PALETTES,
        materials: MATERIALS,
        lighting: LIGHTING_PREFERENCES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lists_every_option_group() {
        let c = catalog();
        assert_eq!(c.styles.len(), 16);
        assert_eq!(c.property_types.len(), 5);
        assert_eq!(c.room_types.len(), 11);
        assert_eq!(c.color_palettes.len(), 7);
        assert_eq!(c.materials.len(), 7);
        assert_eq!(c.lighting.len(), 5);
    }

    #[test]
    fn palette_serializes_label_value_and_swatches() {
        let json = serde_json::to_value(COLOR_PALETTES[0]).unwrap();
        assert_eq!(json["label"], "Warm Neutrals");
        assert_eq!(json["value"], "Warm Neutrals (Beige, Cream, Taupe)");
        assert_eq!(json["colors"].as_array().unwrap().len(), 3);
    }
}
