pub mod domain;
pub mod generation;
pub mod grading;
pub mod ports;
pub mod session;

pub use domain::{Feedback, GenerateQuizOptions, Question, QuestionKind, Remark, ScoreSummary};
pub use grading::{answers_match, LocalAnswerEvaluator};
pub use ports::{
    AnswerEvaluationService, DocumentTextService, PortError, PortResult, QuizGenerationService,
};
pub use session::{EvaluationRequest, Phase, Progress, QuizSession, SessionError, Submission};
