pub mod narakeet_synthesis_repository;
pub mod openai_variation_repository;
pub mod polly_synthesis_repository;
pub mod synthesis_repository;
pub mod variation_repository;

pub use narakeet_synthesis_repository::NarakeetSynthesisRepository;
pub use openai_variation_repository::OpenAiVariationRepository;
pub use polly_synthesis_repository::PollySynthesisRepository;
pub use synthesis_repository::{SynthesisError, SynthesisRepository};
pub use variation_repository::{GenerationError, VariationRepository};
