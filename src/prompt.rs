use crate::models::{DesignInputs, Variation};

const QUALITY_SUFFIX: &str = "High resolution, architectural digest style, 8k, extremely detailed.";

fn twist(variation: Variation) -> &'static str {
    match variation {
        Variation::Light => "Emphasis on the specified lighting atmosphere, capturing the mood and airiness.",
        Variation::Texture => "Close attention to the tactile nature of the specified materials, focusing on finishes and fabric details.",
        Variation::Contrast => "A more dramatic composition focusing on the interplay between the color palette and the architectural form.",
    }
}

pub fn build_prompt(inputs: &DesignInputs, variation: Variation) -> String {
    let base = format!(
        "Photorealistic interior design photography of a {} square meter {} in a {}.",
        inputs.size, inputs.room_type, inputs.property_type
    );
    let specifics = format!(
        "Style: {}. Color Palette: {}. Key Materials: {}. Lighting: {}.",
        inputs.style, inputs.color_palette, inputs.materials, inputs.lighting
    );
    let details = if inputs.has_details() {
        format!(" Specific requirements: {}.", inputs.details.trim())
    } else {
        String::new()
    };
    format!("{base} {specifics}{details} {} {QUALITY_SUFFIX}", twist(variation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_inputs;

    #[test]
    fn prompt_carries_every_input_verbatim() {
        let inputs = sample_inputs();
        let prompt = build_prompt(&inputs, Variation::Light);
        assert!(prompt.starts_with("Photorealistic interior design photography"));
        for value in [
            &inputs.size, &inputs.room_type, &inputs.property_type, &inputs.style,
            &inputs.color_palette, &inputs.materials, &inputs.lighting,
        ] {
            assert!(prompt.contains(value.as_str()), "missing {value:?} in {prompt}");
        }
        assert!(prompt.ends_with(QUALITY_SUFFIX));
    }

    #[test]
    fn details_sentence_only_when_present() {
        let without = build_prompt(&sample_inputs(), Variation::Texture);
        assert!(!without.contains("Specific requirements"));

        let inputs = DesignInputs { details: "Reading nook by the window".into(), ..sample_inputs() };
        let with = build_prompt(&inputs, Variation::Texture);
        assert!(with.contains(" Specific requirements: Reading nook by the window."));
    }

    #[test]
    fn whitespace_details_count_as_absent() {
        let inputs = DesignInputs { details: "   ".into(), ..sample_inputs() };
        assert!(!build_prompt(&inputs, Variation::Light).contains("Specific requirements"));
    }

    #[test]
    fn each_variation_gets_its_own_twist() {
        let inputs = sample_inputs();
        let prompts: Vec<String> = Variation::ALL.iter().map(|v| build_prompt(&inputs, *v)).collect();
        assert_ne!(prompts[0], prompts[1]);
        assert_ne!(prompts[1], prompts[2]);
        assert_ne!(prompts[0], prompts[2]);
        for (prompt, v) in prompts.iter().zip(Variation::ALL) {
            assert!(prompt.contains(twist(v)));
        }
    }

    #[test]
    fn prompt_is_deterministic() {
        let inputs = sample_inputs();
        assert_eq!(build_prompt(&inputs, Variation::Contrast), build_prompt(&inputs, Variation::Contrast));
    }
}
