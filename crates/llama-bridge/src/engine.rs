//! The capability seam between the session facade and the inference engine.

use std::path::Path;

use crate::EngineError;

/// An index into the model's vocabulary.
pub type TokenId = i32;

/// Sizing for the execution context created alongside a loaded model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextConfig {
    /// Number of tokens the context window can hold.
    pub context_size: usize,
    /// How many prompt tokens to feed to the engine at a time.
    pub batch_size: usize,
    /// Number of threads the engine may evaluate with.
    pub threads: usize,
    /// Seed for the engine's sampler.
    pub seed: u64,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            context_size: 512,
            batch_size: 8,
            threads: 4,
            seed: 42,
        }
    }
}

/// The sampling-related parameters of a generation request, as handed to
/// [`InferenceEngine::decode`].
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingParams {
    /// Upper bound on the number of tokens generated by one request.
    pub max_tokens: usize,
    /// Sampling randomness; `0.0` selects greedy decoding.
    pub temperature: f32,
    /// Nucleus sampling cutoff.
    pub top_p: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            max_tokens: 128,
            temperature: 0.80,
            top_p: 0.95,
        }
    }
}

/// The set of capabilities a session requires from an inference engine.
///
/// An engine hands out two kinds of resource: a [`Model`](Self::Model)
/// (immutable weights and vocabulary) and a [`Context`](Self::Context)
/// (mutable evaluation state for one session). Both are released by
/// dropping them.
pub trait InferenceEngine {
    /// Loaded model weights and vocabulary.
    type Model;
    /// Mutable runtime state (cache, scratch buffers) tied to one model.
    type Context;

    /// Initializes the engine's process-wide state. Must be safe to call
    /// more than once; the session calls it before every load.
    fn backend_init(&self) -> Result<(), EngineError>;

    /// Loads model weights from a file.
    fn load_model(&self, path: &Path) -> Result<Self::Model, EngineError>;

    /// Creates an execution context for `model`, sized by `config`.
    fn create_context(
        &self,
        model: &Self::Model,
        config: &ContextConfig,
    ) -> Result<Self::Context, EngineError>;

    /// Converts text to vocabulary indices.
    fn tokenize(&self, model: &Self::Model, text: &str) -> Result<Vec<TokenId>, EngineError>;

    /// Feeds `prompt` through `context` and samples up to
    /// `params.max_tokens` continuation tokens, stopping early if the
    /// engine emits its end-of-sequence token. Mutates the context's
    /// evaluation state, so consecutive calls on the same context see the
    /// accumulated history.
    fn decode(
        &self,
        model: &Self::Model,
        context: &mut Self::Context,
        prompt: &[TokenId],
        params: &SamplingParams,
    ) -> Result<Vec<TokenId>, EngineError>;

    /// Converts tokens back to text.
    fn detokenize(&self, model: &Self::Model, tokens: &[TokenId]) -> String;
}
