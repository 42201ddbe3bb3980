pub mod loaders;
pub mod normalizer;
pub mod question;

pub use loaders::{load_records, InputFile};
pub use question::{ExtractedQuestion, Letter, QuestionRecord};
