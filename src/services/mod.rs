pub mod explanation;
pub mod llm_service;
pub mod output_writer;
pub mod preference_store;
pub mod prompt;

pub use explanation::ExplanationService;
pub use llm_service::LlmService;
pub use output_writer::{BundleMode, OutputPaths};
pub use preference_store::PreferenceStore;
pub use prompt::PromptVariant;
