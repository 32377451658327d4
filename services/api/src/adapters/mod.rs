pub mod grading_llm;
pub mod mock;
pub mod pdf;
pub mod quiz_llm;

pub use grading_llm::OpenAiGradingAdapter;
pub use mock::MockQuizAdapter;
pub use pdf::LopdfTextAdapter;
pub use quiz_llm::OpenAiQuizAdapter;
