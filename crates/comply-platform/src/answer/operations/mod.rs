//! Answer use cases.

pub mod submit;

pub use submit::{SubmitAnswer, SubmitAnswerCommand};
