//! The inference session: one loaded model and its execution context.

use std::path::{Path, PathBuf};

use crate::{
    ContextConfig, GenerationError, InferenceEngine, LoadError, SamplingParams,
};

/// A prompt together with the sampling parameters for one
/// [`generate`](InferenceSession::generate) call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest<'a> {
    /// The text to continue. May be empty.
    pub prompt: &'a str,
    /// Upper bound on the number of generated tokens. Must be nonzero.
    pub max_tokens: usize,
    /// Sampling randomness. Must be finite and non-negative; `0.0`
    /// requests greedy decoding.
    pub temperature: f32,
    /// Nucleus sampling cutoff. Must be within `[0, 1]`.
    pub top_p: f32,
}

impl<'a> GenerationRequest<'a> {
    /// Creates a request for `prompt` with the default sampling parameters.
    pub fn new(prompt: &'a str) -> Self {
        let defaults = SamplingParams::default();
        Self {
            prompt,
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature,
            top_p: defaults.top_p,
        }
    }

    fn validate(&self) -> Result<(), GenerationError> {
        if self.max_tokens == 0 {
            return Err(GenerationError::InvalidParameter(
                "max_tokens must be nonzero".to_string(),
            ));
        }
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(GenerationError::InvalidParameter(format!(
                "temperature must be a finite non-negative number, got {}",
                self.temperature
            )));
        }
        if !self.top_p.is_finite() || !(0.0..=1.0).contains(&self.top_p) {
            return Err(GenerationError::InvalidParameter(format!(
                "top_p must be within [0, 1], got {}",
                self.top_p
            )));
        }
        Ok(())
    }

    fn sampling_params(&self) -> SamplingParams {
        SamplingParams {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
        }
    }
}

// The context is declared before the model so that it is dropped first;
// it must not outlive the model it was created from.
struct LoadedState<E: InferenceEngine> {
    context: E::Context,
    model: E::Model,
}

/// A facade over one loaded model and one execution context.
///
/// A session is either loaded or unloaded, never in between: a failed
/// [`load`](Self::load) yields no session at all, and
/// [`unload`](Self::unload) releases the model and context together.
/// Requests run synchronously and take `&mut self`, so a session never
/// evaluates two requests at once.
pub struct InferenceSession<E: InferenceEngine> {
    engine: E,
    path: PathBuf,
    state: Option<LoadedState<E>>,
}

impl<E: InferenceEngine> InferenceSession<E> {
    /// Loads the model at `path` and creates an execution context for it.
    ///
    /// The two resources are acquired as a unit: if context creation
    /// fails, the freshly loaded model is released before this returns.
    pub fn load(
        engine: E,
        path: impl AsRef<Path>,
        config: ContextConfig,
    ) -> Result<Self, LoadError> {
        let path = path.as_ref();

        engine.backend_init()?;

        if !path.is_file() {
            return Err(LoadError::FileDoesNotExist(path.to_owned()));
        }

        let model = engine.load_model(path)?;
        let context = engine.create_context(&model, &config)?;
        log::info!("loaded model from {path:?}");

        Ok(Self {
            engine,
            path: path.to_owned(),
            state: Some(LoadedState { context, model }),
        })
    }

    /// Whether the session currently holds a model and context.
    pub fn is_loaded(&self) -> bool {
        self.state.is_some()
    }

    /// Runs one synchronous generation request and returns the generated
    /// text (the prompt is not included).
    ///
    /// Consecutive calls share the execution context, so each request sees
    /// the engine state left behind by the previous one. An error leaves
    /// the session loaded and usable.
    pub fn generate(
        &mut self,
        request: &GenerationRequest<'_>,
    ) -> Result<String, GenerationError> {
        request.validate()?;
        let state = self.state.as_mut().ok_or(GenerationError::NotLoaded)?;

        let prompt_tokens = self.engine.tokenize(&state.model, request.prompt)?;
        log::debug!("prompt tokenized to {} tokens", prompt_tokens.len());

        let generated = self.engine.decode(
            &state.model,
            &mut state.context,
            &prompt_tokens,
            &request.sampling_params(),
        )?;
        log::debug!("generated {} tokens", generated.len());

        Ok(self.engine.detokenize(&state.model, &generated))
    }

    /// Releases the model and execution context. Idempotent; unloading a
    /// session that holds nothing does nothing.
    pub fn unload(&mut self) {
        if self.state.take().is_some() {
            log::info!("unloaded model from {:?}", self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_match_sampling_defaults() {
        let request = GenerationRequest::new("hello");
        assert_eq!(request.sampling_params(), SamplingParams::default());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn request_rejects_out_of_range_parameters() {
        let mut request = GenerationRequest::new("hello");
        request.max_tokens = 0;
        assert!(request.validate().is_err());

        let mut request = GenerationRequest::new("hello");
        request.temperature = f32::NAN;
        assert!(request.validate().is_err());

        let mut request = GenerationRequest::new("hello");
        request.top_p = 1.5;
        assert!(request.validate().is_err());
    }
}
