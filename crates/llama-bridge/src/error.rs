//! Error types surfaced by the session facade.

use std::path::PathBuf;

use thiserror::Error;

/// An error raised by the underlying inference engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine's process-wide state could not be initialized.
    #[error("backend initialization failed: {0}")]
    BackendInit(String),
    /// The model file could not be loaded.
    #[error("could not load model from {path:?}: {reason}")]
    ModelLoad {
        /// The path the load was attempted from.
        path: PathBuf,
        /// The engine's description of the failure.
        reason: String,
    },
    /// An execution context could not be created for the loaded model.
    #[error("could not create an execution context: {0}")]
    ContextCreation(String),
    /// The prompt could not be converted to tokens.
    #[error("could not tokenize the prompt: {0}")]
    Tokenization(String),
    /// The engine failed while evaluating tokens or sampling.
    #[error("decoding failed: {0}")]
    Decode(String),
}

/// An error raised while constructing a session.
///
/// When construction fails, no session exists at all: the model and the
/// execution context are only ever allocated together.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The model file does not exist.
    #[error("the model file {0:?} does not exist")]
    FileDoesNotExist(PathBuf),
    /// The engine rejected the model or the context parameters.
    #[error("{0}")]
    Engine(#[from] EngineError),
}

/// An error raised by a generation request.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The session has been unloaded; no model or context is held.
    #[error("the session is not loaded")]
    NotLoaded,
    /// A sampling parameter was outside its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// The engine failed partway through the request.
    #[error("{0}")]
    Engine(#[from] EngineError),
}
