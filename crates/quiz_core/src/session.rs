//! crates/quiz_core/src/session.rs
//!
//! The quiz session state machine.
//!
//! Per question the session moves `Unanswered -> Graded -> Unanswered(next)`, or
//! `Unanswered -> Evaluating -> Graded -> ...` for open answers, and ends in
//! `Finished` after the last question is advanced past. The delay between
//! `Graded` and the advance is owned by the caller; the session only refuses
//! re-submission while feedback is shown. Resetting means dropping the session.

use uuid::Uuid;

use crate::domain::{Feedback, Question, QuestionKind, ScoreSummary};
use crate::grading::option_matches;
use crate::ports::PortResult;

/// Where the session is within the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unanswered,
    /// An open answer is out for evaluation.
    Evaluating,
    /// Feedback is displayed and the advance is pending.
    Graded(Feedback),
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("a quiz needs at least one question")]
    NoQuestions,
    #[error("the quiz is already finished")]
    Finished,
    #[error("answers cannot be changed right now")]
    InputLocked,
    #[error("the current question is already graded")]
    AwaitingAdvance,
    #[error("the current answer is still being evaluated")]
    EvaluationPending,
    #[error("no answer has been given")]
    EmptyAnswer,
    #[error("no evaluation is pending")]
    NotEvaluating,
    #[error("the current question has not been graded")]
    NotGraded,
}

/// What an `AnswerEvaluationService` needs to grade an open answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationRequest {
    pub question_index: usize,
    pub question_text: String,
    pub correct_answer: String,
    pub user_answer: String,
}

/// The immediate result of `QuizSession::submit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Graded locally; feedback is already applied.
    Graded(Feedback),
    /// Must be graded by an evaluator and fed back through `record_evaluation`.
    NeedsEvaluation(EvaluationRequest),
}

/// The result of `QuizSession::advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Next { index: usize },
    Finished(ScoreSummary),
}

/// One run of a generated quiz. Owned by exactly one caller.
#[derive(Debug, Clone)]
pub struct QuizSession {
    id: Uuid,
    questions: Vec<Question>,
    current_index: usize,
    score: usize,
    pending_answer: String,
    phase: Phase,
}

impl QuizSession {
    pub fn new(questions: Vec<Question>) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::NoQuestions);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            questions,
            current_index: 0,
            score: 0,
            pending_answer: String::new(),
            phase: Phase::Unanswered,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The question being answered, `None` once finished.
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn pending_answer(&self) -> &str {
        &self.pending_answer
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn feedback(&self) -> Option<Feedback> {
        match self.phase {
            Phase::Graded(feedback) => Some(feedback),
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn summary(&self) -> ScoreSummary {
        ScoreSummary::new(self.score, self.total())
    }

    /// Records the user's in-progress answer for the current question.
    pub fn select_answer(&mut self, value: impl Into<String>) -> Result<(), SessionError> {
        match self.phase {
            Phase::Unanswered => {
                self.pending_answer = value.into();
                Ok(())
            }
            Phase::Finished => Err(SessionError::Finished),
            Phase::Evaluating | Phase::Graded(_) => Err(SessionError::InputLocked),
        }
    }

    /// Whether `submit` would be accepted right now.
    pub fn can_submit(&self) -> bool {
        self.phase == Phase::Unanswered
            && self
                .current_question()
                .is_some_and(|question| has_answer(question, &self.pending_answer))
    }

    /// Grades the pending answer, or hands it out for evaluation.
    ///
    /// Nothing changes when the submission is refused.
    pub fn submit(&mut self) -> Result<Submission, SessionError> {
        match self.phase {
            Phase::Unanswered => {}
            Phase::Finished => return Err(SessionError::Finished),
            Phase::Evaluating => return Err(SessionError::EvaluationPending),
            Phase::Graded(_) => return Err(SessionError::AwaitingAdvance),
        }

        let question = self
            .questions
            .get(self.current_index)
            .ok_or(SessionError::Finished)?;
        if !has_answer(question, &self.pending_answer) {
            return Err(SessionError::EmptyAnswer);
        }

        match &question.kind {
            QuestionKind::MultipleChoice { .. } => {
                let correct = option_matches(&question.correct_answer, &self.pending_answer);
                Ok(Submission::Graded(self.grade(correct)))
            }
            QuestionKind::OpenAnswer => {
                let request = EvaluationRequest {
                    question_index: self.current_index,
                    question_text: question.text.clone(),
                    correct_answer: question.correct_answer.clone(),
                    user_answer: self.pending_answer.clone(),
                };
                self.phase = Phase::Evaluating;
                Ok(Submission::NeedsEvaluation(request))
            }
        }
    }

    /// Applies an evaluator verdict to the pending open answer.
    ///
    /// A failed evaluation counts as incorrect.
    pub fn record_evaluation(&mut self, verdict: PortResult<bool>) -> Result<Feedback, SessionError> {
        if self.phase != Phase::Evaluating {
            return Err(SessionError::NotEvaluating);
        }
        Ok(self.grade(matches!(verdict, Ok(true))))
    }

    /// Clears the feedback and moves past the graded question.
    pub fn advance(&mut self) -> Result<Progress, SessionError> {
        match self.phase {
            Phase::Graded(_) => {}
            Phase::Finished => return Err(SessionError::Finished),
            Phase::Unanswered | Phase::Evaluating => return Err(SessionError::NotGraded),
        }

        self.pending_answer.clear();
        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
            self.phase = Phase::Unanswered;
            Ok(Progress::Next {
                index: self.current_index,
            })
        } else {
            self.current_index = self.questions.len();
            self.phase = Phase::Finished;
            Ok(Progress::Finished(self.summary()))
        }
    }

    fn grade(&mut self, correct: bool) -> Feedback {
        if correct {
            self.score += 1;
        }
        let feedback = Feedback::from_correct(correct);
        self.phase = Phase::Graded(feedback);
        feedback
    }
}

fn has_answer(question: &Question, answer: &str) -> bool {
    match question.kind {
        QuestionKind::MultipleChoice { .. } => !answer.is_empty(),
        QuestionKind::OpenAnswer => !answer.trim().is_empty(),
    }
}
