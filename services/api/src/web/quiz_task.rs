//! services/api/src/web/quiz_task.rs
//!
//! This module contains the asynchronous "worker" functions that grade a submitted
//! answer and perform the delayed advance to the next question.

use crate::web::{
    protocol::{QuestionView, ServerMessage},
    state::{send, AppState, ConnectionState, Outbox},
};
use quiz_core::session::{EvaluationRequest, Progress, QuizSession, Submission};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// The message describing the current question, `None` once the quiz is finished.
pub fn question_message(session: &QuizSession) -> Option<ServerMessage> {
    session.current_question().map(|question| ServerMessage::Question {
        index: session.current_index(),
        total: session.total(),
        score: session.score(),
        question: QuestionView::from(question),
    })
}

/// Grades the pending answer of the connection's quiz.
///
/// Multiple-choice answers are graded under the connection lock before this returns,
/// so later messages on the socket see the graded state. Open answers are sent to the
/// evaluator on a spawned task, whose handle is returned; a reset can arrive meanwhile
/// and the verdict is then dropped. Either way the delayed advance is scheduled.
pub async fn submit_answer(
    app_state: &Arc<AppState>,
    conn_lock: &Arc<Mutex<ConnectionState>>,
    outbox: &Outbox,
) -> Option<JoinHandle<()>> {
    let (epoch, request) = {
        let mut conn = conn_lock.lock().await;
        start_submission(app_state, &mut conn, conn_lock, outbox)?
    };
    Some(tokio::spawn(evaluation_process(
        app_state.clone(),
        conn_lock.clone(),
        outbox.clone(),
        epoch,
        request,
    )))
}

/// Returns the epoch and request for an open answer that still needs grading.
fn start_submission(
    app_state: &AppState,
    conn: &mut ConnectionState,
    conn_lock: &Arc<Mutex<ConnectionState>>,
    outbox: &Outbox,
) -> Option<(u64, EvaluationRequest)> {
    let epoch = conn.epoch;
    let Some(quiz) = conn.quiz.as_mut() else {
        warn!("SubmitAnswer received without an active quiz.");
        return None;
    };
    match quiz.submit() {
        Ok(Submission::Graded(_)) => {
            info!("Question {} graded locally.", quiz.current_index() + 1);
            schedule_advance(conn, conn_lock, outbox, app_state.config.advance_delay);
            None
        }
        Ok(Submission::NeedsEvaluation(request)) => {
            send(outbox, ServerMessage::Evaluating);
            Some((epoch, request))
        }
        Err(e) => {
            warn!("Submission ignored: {}", e);
            None
        }
    }
}

/// Waits on the evaluator for an open answer and applies the verdict.
///
/// A failed or timed out evaluation counts as incorrect.
async fn evaluation_process(
    app_state: Arc<AppState>,
    conn_lock: Arc<Mutex<ConnectionState>>,
    outbox: Outbox,
    epoch: u64,
    request: EvaluationRequest,
) {
    let verdict = app_state
        .evaluate_answer(
            &request.question_text,
            &request.correct_answer,
            &request.user_answer,
        )
        .await;
    if let Err(e) = &verdict {
        warn!(
            "Grading question {} failed, marking it incorrect: {}",
            request.question_index + 1,
            e
        );
    }

    let mut conn = conn_lock.lock().await;
    if conn.epoch != epoch {
        info!("Discarding evaluation result for a quiz that was reset.");
        return;
    }
    let Some(quiz) = conn.quiz.as_mut() else {
        return;
    };
    if let Err(e) = quiz.record_evaluation(verdict) {
        warn!("Evaluation result not applied: {}", e);
        return;
    }
    schedule_advance(&mut conn, &conn_lock, &outbox, app_state.config.advance_delay);
}

/// Announces the feedback of a freshly graded question and starts the advance timer.
fn schedule_advance(
    conn: &mut ConnectionState,
    conn_lock: &Arc<Mutex<ConnectionState>>,
    outbox: &Outbox,
    delay: Duration,
) {
    let Some(quiz) = conn.quiz.as_ref() else {
        return;
    };
    let Some(feedback) = quiz.feedback() else {
        return;
    };
    send(
        outbox,
        ServerMessage::Feedback {
            result: feedback.into(),
            score: quiz.score(),
        },
    );

    let epoch = conn.epoch;
    let token = conn.advance_token.clone();
    tokio::spawn(advance_process(
        conn_lock.clone(),
        outbox.clone(),
        token,
        epoch,
        delay,
    ));
}

/// Waits out the feedback delay, then moves to the next question or finishes.
///
/// Ends silently when cancelled by a reset.
pub async fn advance_process(
    conn_lock: Arc<Mutex<ConnectionState>>,
    outbox: Outbox,
    cancellation_token: CancellationToken,
    epoch: u64,
    delay: Duration,
) {
    tokio::select! {
        _ = cancellation_token.cancelled() => {
            info!("Pending advance cancelled.");
            return;
        }
        _ = tokio::time::sleep(delay) => {}
    }

    let mut conn = conn_lock.lock().await;
    if conn.epoch != epoch {
        return;
    }
    let Some(quiz) = conn.quiz.as_mut() else {
        return;
    };
    match quiz.advance() {
        Ok(Progress::Next { .. }) => {
            if let Some(message) = question_message(quiz) {
                send(&outbox, message);
            }
        }
        Ok(Progress::Finished(summary)) => {
            info!(
                "Quiz {} finished with {}/{}.",
                quiz.id(),
                summary.score,
                summary.total
            );
            send(&outbox, summary.into());
        }
        Err(e) => warn!("Advance skipped: {}", e),
    }
}
