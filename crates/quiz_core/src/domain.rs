//! crates/quiz_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any transport or serialization format.

/// How a question is answered and graded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    /// A closed set of options, graded by exact string match.
    MultipleChoice { options: Vec<String> },
    /// Free text, graded by an `AnswerEvaluationService`.
    OpenAnswer,
}

/// A single generated quiz question. Immutable once generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub text: String,
    pub kind: QuestionKind,
    pub correct_answer: String,
}

impl Question {
    pub fn multiple_choice(
        text: impl Into<String>,
        options: Vec<String>,
        correct_answer: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            kind: QuestionKind::MultipleChoice { options },
            correct_answer: correct_answer.into(),
        }
    }

    pub fn open_answer(text: impl Into<String>, correct_answer: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: QuestionKind::OpenAnswer,
            correct_answer: correct_answer.into(),
        }
    }

    /// The options of a multiple-choice question, `None` for open answers.
    pub fn options(&self) -> Option<&[String]> {
        match &self.kind {
            QuestionKind::MultipleChoice { options } => Some(options),
            QuestionKind::OpenAnswer => None,
        }
    }

    pub fn is_open_answer(&self) -> bool {
        matches!(self.kind, QuestionKind::OpenAnswer)
    }
}

/// Options passed to a `QuizGenerationService`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateQuizOptions {
    /// Mix open-answer questions in with the multiple-choice ones.
    pub include_open_answer: bool,
}

/// The grading outcome shown to the user while the advance delay is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Correct,
    Incorrect,
}

impl Feedback {
    pub fn from_correct(correct: bool) -> Self {
        if correct {
            Feedback::Correct
        } else {
            Feedback::Incorrect
        }
    }

    pub fn is_correct(self) -> bool {
        self == Feedback::Correct
    }
}

/// A short verdict on the final score, as shown on the results screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remark {
    Perfect,
    Great,
    KeepPracticing,
}

/// The final result of a finished (or in-progress) quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreSummary {
    pub score: usize,
    pub total: usize,
    pub remark: Remark,
}

impl ScoreSummary {
    pub fn new(score: usize, total: usize) -> Self {
        // score >= 70% of total, kept in integers.
        let remark = if score == total {
            Remark::Perfect
        } else if score * 10 >= total * 7 {
            Remark::Great
        } else {
            Remark::KeepPracticing
        };
        Self { score, total, remark }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remark_follows_score_ratio() {
        assert_eq!(ScoreSummary::new(5, 5).remark, Remark::Perfect);
        assert_eq!(ScoreSummary::new(4, 5).remark, Remark::Great);
        assert_eq!(ScoreSummary::new(7, 10).remark, Remark::Great);
        assert_eq!(ScoreSummary::new(6, 10).remark, Remark::KeepPracticing);
        assert_eq!(ScoreSummary::new(0, 5).remark, Remark::KeepPracticing);
    }

    #[test]
    fn options_only_for_multiple_choice() {
        let mc = Question::multiple_choice("Q", vec!["a".into(), "b".into()], "a");
        let open = Question::open_answer("Q", "a");
        assert_eq!(mc.options().map(|o| o.len()), Some(2));
        assert!(open.options().is_none());
        assert!(open.is_open_answer());
    }
}
