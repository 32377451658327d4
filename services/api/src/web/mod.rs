pub mod generation_task;
pub mod protocol;
pub mod quiz_task;
pub mod rest;
pub mod state;
pub mod ws_handler;

#[cfg(test)]
mod test_support;

// Re-export the handlers the binary mounts on the router.
pub use rest::{create_quiz_handler, evaluate_answer_handler};
pub use ws_handler::ws_handler;
