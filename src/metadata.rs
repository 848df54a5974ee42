use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::CONCEPT_ADJECTIVES;
use crate::models::DesignInputs;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptMeta {
    pub title: String,
    pub description: String,
}

/// Title and copy for the concept at `index` (0, 1 or 2) of a batch.
///
/// The title adjective is drawn from `rng`, so titles only repeat across runs
/// when the caller seeds it.
pub fn synthesize<R: Rng + ?Sized>(inputs: &DesignInputs, index: usize, rng: &mut R) -> ConceptMeta {
    let adjective = CONCEPT_ADJECTIVES.choose(rng).copied().unwrap_or("Timeless");
    let title = format!("Concept {} – {} {} {}", index + 1, adjective, inputs.style, inputs.room_type);

    let description = match index {
        0 => format!(
            "A {} approach prioritizing the {} and an open flow suited for a {}.",
            inputs.style.to_lowercase(),
            inputs.lighting.to_lowercase(),
            inputs.property_type.to_lowercase()
        ),
        1 => format!(
            "Highlighted by {} and curated pieces, this layout maximizes the {}m² footprint in {} tones.",
            inputs.materials.to_lowercase(),
            inputs.size,
            inputs.color_palette.to_lowercase()
        ),
        _ => format!(
            "A balanced composition focusing on functionality and mood, integrating your request for {} with {}.",
            if inputs.has_details() { "specific details" } else { "a unique look" },
            inputs.materials.to_lowercase()
        ),
    };

    ConceptMeta { title, description }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_inputs;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn title_numbers_from_one() {
        let inputs = sample_inputs();
        let mut rng = StdRng::seed_from_u64(1);
        for index in 0..3 {
            let meta = synthesize(&inputs, index, &mut rng);
            assert!(meta.title.starts_with(&format!("Concept {} – ", index + 1)));
            assert!(meta.title.ends_with("Scandinavian Living room"));
        }
    }

    #[test]
    fn title_adjective_comes_from_word_list() {
        // Adjective choice is random; only membership is stable without a seed.
        let meta = synthesize(&sample_inputs(), 0, &mut rand::thread_rng());
        let adjective = meta.title.split(' ').nth(3).unwrap();
        assert!(CONCEPT_ADJECTIVES.contains(&adjective));
    }

    #[test]
    fn seeded_rng_reproduces_titles() {
        let inputs = sample_inputs();
        let a = synthesize(&inputs, 2, &mut StdRng::seed_from_u64(42));
        let b = synthesize(&inputs, 2, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);

        let expected = CONCEPT_ADJECTIVES.choose(&mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a.title, format!("Concept 3 – {expected} Scandinavian Living room"));
    }

    #[test]
    fn descriptions_differ_per_index() {
        let inputs = sample_inputs();
        let mut rng = StdRng::seed_from_u64(3);
        let first = synthesize(&inputs, 0, &mut rng).description;
        let second = synthesize(&inputs, 1, &mut rng).description;
        let third = synthesize(&inputs, 2, &mut rng).description;

        assert_eq!(first, "A scandinavian approach prioritizing the flooded with natural daylight and an open flow suited for a apartment.");
        assert!(second.contains("natural wood & linen"));
        assert!(second.contains("25m²"));
        assert!(second.contains("warm neutrals (beige, cream, taupe) tones"));
        assert!(third.contains("a unique look"));
    }

    #[test]
    fn third_description_mentions_details_when_given() {
        let inputs = DesignInputs { details: "Hidden storage".into(), ..sample_inputs() };
        let meta = synthesize(&inputs, 2, &mut StdRng::seed_from_u64(0));
        assert!(meta.description.contains("specific details"));
    }
}
