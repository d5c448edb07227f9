//! A deterministic stand-in engine, so the session facade can be exercised
//! without a native inference library.

use std::path::Path;

use llama_bridge::{ContextConfig, EngineError, InferenceEngine, SamplingParams, TokenId};

/// Magic header expected at the start of stub model files.
pub const MODEL_MAGIC: &[u8] = b"tinylm\n";

/// The token the stub treats as end-of-sequence (`.`).
pub const END_TOKEN: TokenId = b'.' as TokenId;

pub struct StubModel;

/// Evaluation state for the stub. Prompts and generated tokens accumulate
/// in `history`, so earlier requests visibly affect later ones.
pub struct StubContext {
    history: Vec<TokenId>,
    generated_count: usize,
    seed: u64,
}

/// An engine whose "models" are text files starting with [`MODEL_MAGIC`]
/// and whose vocabulary is plain ASCII. Greedy decoding replays the
/// accumulated history, which makes its output a pure function of the
/// requests that produced it.
pub struct StubEngine;

impl InferenceEngine for StubEngine {
    type Model = StubModel;
    type Context = StubContext;

    fn backend_init(&self) -> Result<(), EngineError> {
        Ok(())
    }

    fn load_model(&self, path: &Path) -> Result<StubModel, EngineError> {
        let bytes = std::fs::read(path).map_err(|err| EngineError::ModelLoad {
            path: path.to_owned(),
            reason: err.to_string(),
        })?;
        if !bytes.starts_with(MODEL_MAGIC) {
            return Err(EngineError::ModelLoad {
                path: path.to_owned(),
                reason: "not a tinylm model file".to_string(),
            });
        }
        Ok(StubModel)
    }

    fn create_context(
        &self,
        _model: &StubModel,
        config: &ContextConfig,
    ) -> Result<StubContext, EngineError> {
        Ok(StubContext {
            history: Vec::new(),
            generated_count: 0,
            seed: config.seed,
        })
    }

    fn tokenize(&self, _model: &StubModel, text: &str) -> Result<Vec<TokenId>, EngineError> {
        if !text.is_ascii() {
            return Err(EngineError::Tokenization(
                "the stub vocabulary is ASCII-only".to_string(),
            ));
        }
        Ok(text.bytes().map(TokenId::from).collect())
    }

    fn decode(
        &self,
        _model: &StubModel,
        context: &mut StubContext,
        prompt: &[TokenId],
        params: &SamplingParams,
    ) -> Result<Vec<TokenId>, EngineError> {
        context.history.extend_from_slice(prompt);
        if context.history.is_empty() {
            return Ok(Vec::new());
        }

        // Replay the history starting where the previous request left off;
        // a nonzero temperature shifts the replay by the sampler seed.
        let start = context.generated_count
            + if params.temperature > 0.0 {
                context.seed as usize
            } else {
                0
            };

        let window = context.history.clone();
        let mut generated = Vec::new();
        for i in 0..params.max_tokens {
            let token = window[(start + i) % window.len()];
            if token == END_TOKEN {
                break;
            }
            generated.push(token);
            context.history.push(token);
            context.generated_count += 1;
        }
        Ok(generated)
    }

    fn detokenize(&self, _model: &StubModel, tokens: &[TokenId]) -> String {
        tokens.iter().map(|&t| (t as u8) as char).collect()
    }
}
