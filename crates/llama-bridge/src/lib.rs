//! A small, safe facade over a native large-language-model inference engine.
//!
//! The engine itself — tokenization, sampling, the transformer evaluation —
//! is an opaque external collaborator reached through the
//! [`InferenceEngine`] trait. This crate owns the session lifecycle around
//! it: loading a model together with its execution context, running
//! synchronous generation requests against the pair, and releasing both
//! deterministically.
//!
//! The production engine is [`LlamaEngine`] (feature `cpp`), which wraps the
//! llama.cpp C API via `llama-bridge-sys`.
//!
//! # Example
//!
//! ```no_run
//! use llama_bridge::{ContextConfig, GenerationRequest, InferenceEngine, InferenceSession};
//!
//! fn run(engine: impl InferenceEngine) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session =
//!         InferenceSession::load(engine, "/path/to/model.gguf", ContextConfig::default())?;
//!
//!     let response = session.generate(&GenerationRequest::new("Hello"))?;
//!     println!("{response}");
//!
//!     // Optional; dropping the session releases the model and context too.
//!     session.unload();
//!     Ok(())
//! }
//! ```
#![deny(missing_docs)]

mod engine;
mod error;
mod session;

pub mod util;

#[cfg(feature = "cpp")]
mod cpp;

pub use engine::{ContextConfig, InferenceEngine, SamplingParams, TokenId};
pub use error::{EngineError, GenerationError, LoadError};
pub use session::{GenerationRequest, InferenceSession};

#[cfg(feature = "cpp")]
pub use cpp::{LlamaContext, LlamaEngine, LlamaModel};
