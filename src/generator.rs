use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, error};
use uuid::Uuid;

use crate::gemini::{head, GeminiError, ImageBackend, InlineImage};
use crate::metadata::synthesize;
use crate::models::{Concept, DesignInputs, Variation};
use crate::prompt::build_prompt;

pub type IdSupplier = Arc<dyn Fn() -> Uuid + Send + Sync>;

/// Produces one batch of three concepts per brief, one per [`Variation`].
pub struct ConceptGenerator {
    backend: Arc<dyn ImageBackend>,
    rng: Mutex<StdRng>,
    next_id: IdSupplier,
}

impl ConceptGenerator {
    pub fn new(backend: Arc<dyn ImageBackend>) -> Self {
        Self {
            backend,
            rng: Mutex::new(StdRng::from_entropy()),
            next_id: Arc::new(Uuid::new_v4),
        }
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    pub fn with_ids<F>(mut self, next_id: F) -> Self
    where
        F: Fn() -> Uuid + Send + Sync + 'static,
    {
        self.next_id = Arc::new(next_id);
        self
    }

    /// Requests all three images concurrently. Either every image arrives and
    /// three concepts come back in variation order, or the first failure is
    /// returned and the other in-flight requests are dropped.
    pub async fn generate(&self, inputs: &DesignInputs) -> Result<[Concept; 3], GeminiError> {
        self.backend.ensure_ready()?;

        let [light, texture, contrast] = Variation::ALL;
        info!("🚀 Generating concepts: {} {} in a {}", inputs.style, inputs.room_type, inputs.property_type);

        let images = tokio::try_join!(
            self.request_image(inputs, light),
            self.request_image(inputs, texture),
            self.request_image(inputs, contrast),
        );
        let (first, second, third) = match images {
            Ok(images) => images,
            Err(e) => {
                error!("❌ Concept batch aborted: {}", e);
                return Err(e);
            }
        };

        let created_at = Utc::now();
        let mut rng = self.rng.lock();
        let mut index = 0;
        let concepts = [(light, first), (texture, second), (contrast, third)].map(|(variation, image)| {
            let meta = synthesize(inputs, index, &mut *rng);
            index += 1;
            Concept {
                id: (self.next_id)(),
                image_url: image.data_uri(),
                title: meta.title,
                description: meta.description,
                inputs: inputs.clone(),
                variation,
                created_at,
            }
        });
        info!("✅ Concept batch ready: {}", concepts.iter().map(|c| c.title.as_str()).collect::<Vec<_>>().join(" | "));
        Ok(concepts)
    }

    async fn request_image(&self, inputs: &DesignInputs, variation: Variation) -> Result<InlineImage, GeminiError> {
        let prompt = build_prompt(inputs, variation);
        info!("🎯 Requesting {:?} variation: {}", variation, head(&prompt, 100));
        self.backend.generate_image(&prompt).await
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use super::stub::{image_for, variation_of, Fault, StubBackend};
    use crate::models::sample_inputs;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::sync::Notify;

    fn sequential_ids() -> impl Fn() -> Uuid + Send + Sync + 'static {
        let counter = AtomicU64::new(0);
        move || Uuid::from_u128(u128::from(counter.fetch_add(1, Ordering::SeqCst) + 1))
    }

    /// Settles contrast first, then texture, then light.
    #[derive(Default)]
    struct ReversedBackend {
        texture_done: Notify,
        contrast_done: Notify,
        settled: Mutex<Vec<Variation>>,
    }

    #[async_trait]
    impl ImageBackend for ReversedBackend {
        async fn generate_image(&self, prompt: &str) -> Result<InlineImage, GeminiError> {
            let variation = variation_of(prompt);
            match variation {
                Variation::Light => self.texture_done.notified().await,
                Variation::Texture => self.contrast_done.notified().await,
                Variation::Contrast => {}
            }
            self.settled.lock().push(variation);
            match variation {
                Variation::Texture => self.texture_done.notify_one(),
                Variation::Contrast => self.contrast_done.notify_one(),
                Variation::Light => {}
            }
            Ok(image_for(variation))
        }
    }

    #[tokio::test]
    async fn batch_has_three_concepts_in_variation_order() {
        let backend = Arc::new(StubBackend::default());
        let generator = ConceptGenerator::new(backend.clone());
        let inputs = sample_inputs();

        let concepts = generator.generate(&inputs).await.unwrap();

        assert_eq!(concepts.iter().map(|c| c.variation).collect::<Vec<_>>(), Variation::ALL.to_vec());
        for (index, concept) in concepts.iter().enumerate() {
            assert!(concept.title.starts_with(&format!("Concept {} – ", index + 1)));
            assert_eq!(concept.inputs, inputs);
            assert_eq!(concept.image_url, image_for(Variation::ALL[index]).data_uri());
        }
        assert_eq!(backend.calls.lock().len(), 3);
    }

    #[tokio::test]
    async fn results_are_placed_by_index_not_arrival() {
        let backend = Arc::new(ReversedBackend::default());
        let generator = ConceptGenerator::new(backend.clone());

        let concepts = generator.generate(&sample_inputs()).await.unwrap();

        assert_eq!(*backend.settled.lock(), vec![Variation::Contrast, Variation::Texture, Variation::Light]);
        assert_eq!(concepts[0].variation, Variation::Light);
        assert_eq!(concepts[0].image_url, image_for(Variation::Light).data_uri());
        assert_eq!(concepts[2].image_url, image_for(Variation::Contrast).data_uri());
    }

    #[tokio::test]
    async fn one_failed_call_fails_the_batch() {
        let generator = ConceptGenerator::new(Arc::new(StubBackend::failing(Variation::Texture, Fault::Transport)));
        let err = generator.generate(&sample_inputs()).await.unwrap_err();
        assert!(matches!(err, GeminiError::Http(_)));
    }

    #[tokio::test]
    async fn response_without_image_fails_the_batch() {
        let generator = ConceptGenerator::new(Arc::new(StubBackend::failing(Variation::Contrast, Fault::Empty)));
        let err = generator.generate(&sample_inputs()).await.unwrap_err();
        assert!(matches!(err, GeminiError::EmptyImage));
    }

    #[tokio::test]
    async fn missing_credential_sends_nothing() {
        let backend = Arc::new(StubBackend::without_key());
        let generator = ConceptGenerator::new(backend.clone());

        let err = generator.generate(&sample_inputs()).await.unwrap_err();

        assert!(matches!(err, GeminiError::MissingCredential));
        assert!(backend.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn accented_catalog_values_survive_prompt_logging() {
        // Log arguments are only formatted while a subscriber is listening.
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_test_writer()
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let inputs = DesignInputs { size: "2500".into(), property_type: "Restaurant / Café".into(), ..sample_inputs() };
        let prompt = build_prompt(&inputs, Variation::Light);
        assert!(!prompt.is_char_boundary(100), "fixture should put a multibyte char across byte 100");

        let concepts = ConceptGenerator::new(Arc::new(StubBackend::default())).generate(&inputs).await.unwrap();
        assert_eq!(concepts[0].inputs.property_type, "Restaurant / Café");
    }

    #[tokio::test]
    async fn seeded_sources_make_batches_reproducible() {
        let build = || {
            ConceptGenerator::new(Arc::new(StubBackend::default()))
                .with_rng(StdRng::seed_from_u64(7))
                .with_ids(sequential_ids())
        };
        let a = build().generate(&sample_inputs()).await.unwrap();
        let b = build().generate(&sample_inputs()).await.unwrap();

        assert_eq!(a.iter().map(|c| c.id).collect::<Vec<_>>(), vec![Uuid::from_u128(1), Uuid::from_u128(2), Uuid::from_u128(3)]);
        assert_eq!(a.map(|c| c.title), b.map(|c| c.title));
    }
}
