pub mod question_ctx;
pub mod question_flow;
pub mod scheduling;

pub use question_ctx::QuestionCtx;
pub use question_flow::{ProcessResult, QuestionFlow};
pub use scheduling::{Pacer, RetryPolicy};
