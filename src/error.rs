use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

pub type ReplayResult<T> = Result<T, ReplayError>;

#[derive(Debug, Error, Diagnostic)]
pub enum ReplayError {
    #[error("script validation failed: {0}")]
    #[diagnostic(code("replay.invalid_script"))]
    InvalidScript(String),
    #[error("message {index} references unknown sender '{sender_id}'")]
    #[diagnostic(
        code("replay.unknown_sender"),
        help("every message senderId must match a participant id")
    )]
    UnknownSender { index: usize, sender_id: String },
    #[error("invalid delay for {field}: {value} ms")]
    #[diagnostic(
        code("replay.invalid_delay"),
        help("delays must be zero or positive milliseconds")
    )]
    InvalidDelay { field: String, value: i64 },
    #[error("resource limit exceeded: {0}")]
    #[diagnostic(code("replay.resource_limit"))]
    ResourceLimit(String),
    #[error("invalid playback config: {0}")]
    #[diagnostic(code("replay.invalid_config"))]
    InvalidConfig(String),
    #[error("invalid scheduler transition: {0}")]
    #[diagnostic(code("replay.invalid_transition"))]
    InvalidTransition(String),
    #[error("playback session closed")]
    #[diagnostic(code("replay.session_closed"))]
    SessionClosed,
    #[error("serialization error: {message}")]
    #[diagnostic(code("replay.serialization"))]
    Serialization {
        message: String,
        #[source_code]
        src: String,
        #[label("here")]
        span: SourceSpan,
    },
}
