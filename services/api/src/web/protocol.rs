//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the browser client and the API server
//! for the interactive quiz.

use quiz_core::domain::{Feedback, Question, QuestionKind, Remark, ScoreSummary};
use serde::{Deserialize, Serialize};

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================
// NOTE: The uploaded PDF is sent as raw Binary frames between `begin_upload` and
// `end_upload`, not as part of this enum.
//=========================================================================================

/// Represents the structured text messages a client can send to the server.
#[derive(Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Discards any current quiz and starts buffering a new document.
    BeginUpload {
        #[serde(default)]
        include_open_answer: bool,
    },

    /// The document is complete; the server should generate a quiz from it.
    EndUpload,

    /// Updates the in-progress answer for the current question.
    SelectAnswer { value: String },

    /// Submits the in-progress answer for grading.
    SubmitAnswer,

    /// Discards the current quiz.
    Reset,
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The server is extracting the document and waiting on the generator.
    GeneratingQuiz,

    /// The question the user should answer now. The correct answer is not included.
    Question {
        index: usize,
        total: usize,
        score: usize,
        question: QuestionView,
    },

    /// An open answer is being graded. The UI should show a loading state.
    Evaluating,

    /// The grading outcome, displayed until the next question arrives.
    Feedback { result: FeedbackView, score: usize },

    /// The last question has been graded and the delay elapsed.
    Finished {
        score: usize,
        total: usize,
        remark: RemarkView,
    },

    /// Confirms that the quiz was discarded.
    SessionReset,

    /// Reports an error to the client, which should display it as a notification.
    Error { message: String },
}

/// A question as shown to the user.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub text: String,
    pub kind: QuestionKindView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKindView {
    MultipleChoice,
    OpenAnswer,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackView {
    Correct,
    Incorrect,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RemarkView {
    Perfect,
    Great,
    KeepPracticing,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        let (kind, options) = match &question.kind {
            QuestionKind::MultipleChoice { options } => {
                (QuestionKindView::MultipleChoice, Some(options.clone()))
            }
            QuestionKind::OpenAnswer => (QuestionKindView::OpenAnswer, None),
        };
        Self {
            text: question.text.clone(),
            kind,
            options,
        }
    }
}

impl From<Feedback> for FeedbackView {
    fn from(feedback: Feedback) -> Self {
        match feedback {
            Feedback::Correct => FeedbackView::Correct,
            Feedback::Incorrect => FeedbackView::Incorrect,
        }
    }
}

impl From<Remark> for RemarkView {
    fn from(remark: Remark) -> Self {
        match remark {
            Remark::Perfect => RemarkView::Perfect,
            Remark::Great => RemarkView::Great,
            Remark::KeepPracticing => RemarkView::KeepPracticing,
        }
    }
}

impl From<ScoreSummary> for ServerMessage {
    fn from(summary: ScoreSummary) -> Self {
        ServerMessage::Finished {
            score: summary.score,
            total: summary.total,
            remark: summary.remark.into(),
        }
    }
}
