//! # ShieldChat Agent
//! Turns a question into a grounded answer.
//!
//! One call = one retrieval + at most one completion request. There is no
//! conversation state: every question is answered on its own.

pub mod composer;

pub use composer::{
    AnswerComposer, EMPTY_QUERY_MESSAGE, FALLBACK_EXCERPT_CHARS, MISSING_CREDENTIAL_MESSAGE,
    NO_CONTEXT_PLACEHOLDER,
};
