//! The llama.cpp-backed engine. Compiled only with the `cpp` feature, as it
//! needs a native `libllama` to link against.

use std::{ffi::CString, os::raw::c_char, path::Path, ptr::NonNull, sync::Once};

use llama_bridge_sys as sys;

use crate::{
    util::TokenUtf8Buffer, ContextConfig, EngineError, InferenceEngine, SamplingParams, TokenId,
};

static BACKEND_INIT: Once = Once::new();

/// Loaded llama.cpp model weights. Frees the underlying `llama_model` on
/// drop.
pub struct LlamaModel {
    ptr: NonNull<sys::llama_model>,
}

// The weights are immutable once loaded and llama.cpp does not tie a model
// to the thread that created it.
unsafe impl Send for LlamaModel {}

impl Drop for LlamaModel {
    fn drop(&mut self) {
        unsafe { sys::llama_free_model(self.ptr.as_ptr()) };
    }
}

/// Execution state for one session: the KV cache plus the current decode
/// position. Frees the underlying `llama_context` on drop.
pub struct LlamaContext {
    ptr: NonNull<sys::llama_context>,
    n_batch: i32,
    /// Number of positions already occupied in the KV cache.
    n_past: i32,
}

unsafe impl Send for LlamaContext {}

impl Drop for LlamaContext {
    fn drop(&mut self) {
        unsafe { sys::llama_free(self.ptr.as_ptr()) };
    }
}

/// An [`InferenceEngine`] backed by the llama.cpp C API.
#[derive(Debug, Default, Clone, Copy)]
pub struct LlamaEngine;

impl LlamaEngine {
    /// Feeds `tokens` through the context in `n_batch`-sized chunks and
    /// returns the logits row index of the last evaluated token.
    fn eval(&self, context: &mut LlamaContext, tokens: &mut [TokenId]) -> Result<i32, EngineError> {
        let mut last_len = 0;
        for chunk in tokens.chunks_mut(context.n_batch as usize) {
            let batch = unsafe {
                sys::llama_batch_get_one(chunk.as_mut_ptr(), chunk.len() as i32, context.n_past, 0)
            };
            let ret = unsafe { sys::llama_decode(context.ptr.as_ptr(), batch) };
            if ret != 0 {
                return Err(EngineError::Decode(format!("llama_decode returned {ret}")));
            }
            context.n_past += chunk.len() as i32;
            last_len = chunk.len();
        }
        Ok(last_len as i32 - 1)
    }

    fn sample(
        &self,
        model: &LlamaModel,
        context: &mut LlamaContext,
        params: &SamplingParams,
        logits_ith: i32,
    ) -> TokenId {
        let n_vocab = unsafe { sys::llama_n_vocab(model.ptr.as_ptr()) } as usize;
        let logits = unsafe {
            std::slice::from_raw_parts(
                sys::llama_get_logits_ith(context.ptr.as_ptr(), logits_ith),
                n_vocab,
            )
        };

        let mut candidates: Vec<sys::llama_token_data> = logits
            .iter()
            .enumerate()
            .map(|(id, &logit)| sys::llama_token_data {
                id: id as TokenId,
                logit,
                p: 0.0,
            })
            .collect();
        let mut array = sys::llama_token_data_array {
            data: candidates.as_mut_ptr(),
            size: candidates.len(),
            sorted: false,
        };

        unsafe {
            if params.temperature <= 0.0 {
                sys::llama_sample_token_greedy(context.ptr.as_ptr(), &mut array)
            } else {
                sys::llama_sample_top_p(context.ptr.as_ptr(), &mut array, params.top_p, 1);
                sys::llama_sample_temp(context.ptr.as_ptr(), &mut array, params.temperature);
                sys::llama_sample_token(context.ptr.as_ptr(), &mut array)
            }
        }
    }

    fn token_piece(&self, model: &LlamaModel, token: TokenId) -> Vec<u8> {
        let mut buf = vec![0u8; 8];
        let n = unsafe {
            sys::llama_token_to_piece(
                model.ptr.as_ptr(),
                token,
                buf.as_mut_ptr() as *mut c_char,
                buf.len() as i32,
            )
        };
        if n < 0 {
            buf.resize((-n) as usize, 0);
            let n = unsafe {
                sys::llama_token_to_piece(
                    model.ptr.as_ptr(),
                    token,
                    buf.as_mut_ptr() as *mut c_char,
                    buf.len() as i32,
                )
            };
            buf.truncate(n.max(0) as usize);
        } else {
            buf.truncate(n as usize);
        }
        buf
    }
}

impl InferenceEngine for LlamaEngine {
    type Model = LlamaModel;
    type Context = LlamaContext;

    fn backend_init(&self) -> Result<(), EngineError> {
        // llama.cpp must only see this once per process.
        BACKEND_INIT.call_once(|| unsafe { sys::llama_backend_init(false) });
        Ok(())
    }

    fn load_model(&self, path: &Path) -> Result<LlamaModel, EngineError> {
        let c_path = CString::new(path.to_string_lossy().as_bytes()).map_err(|_| {
            EngineError::ModelLoad {
                path: path.to_owned(),
                reason: "path contains an interior NUL byte".to_string(),
            }
        })?;

        let params = unsafe { sys::llama_model_default_params() };
        let raw = unsafe { sys::llama_load_model_from_file(c_path.as_ptr(), params) };
        match NonNull::new(raw) {
            Some(ptr) => {
                log::debug!("llama.cpp accepted model at {path:?}");
                Ok(LlamaModel { ptr })
            }
            None => Err(EngineError::ModelLoad {
                path: path.to_owned(),
                reason: "llama.cpp could not parse the file as a model".to_string(),
            }),
        }
    }

    fn create_context(
        &self,
        model: &LlamaModel,
        config: &ContextConfig,
    ) -> Result<LlamaContext, EngineError> {
        let mut params = unsafe { sys::llama_context_default_params() };
        params.seed = config.seed as u32;
        params.n_ctx = config.context_size as u32;
        params.n_batch = config.batch_size as u32;
        params.n_threads = config.threads as u32;
        params.n_threads_batch = config.threads as u32;

        let raw = unsafe { sys::llama_new_context_with_model(model.ptr.as_ptr(), params) };
        match NonNull::new(raw) {
            Some(ptr) => Ok(LlamaContext {
                ptr,
                n_batch: config.batch_size.max(1) as i32,
                n_past: 0,
            }),
            None => Err(EngineError::ContextCreation(
                "llama_new_context_with_model returned null".to_string(),
            )),
        }
    }

    fn tokenize(&self, model: &LlamaModel, text: &str) -> Result<Vec<TokenId>, EngineError> {
        // Worst case is one token per byte, plus BOS.
        let mut tokens = vec![0 as TokenId; text.len() + 1];
        let mut n = unsafe {
            sys::llama_tokenize(
                model.ptr.as_ptr(),
                text.as_ptr() as *const c_char,
                text.len() as i32,
                tokens.as_mut_ptr(),
                tokens.len() as i32,
                true,
                false,
            )
        };
        if n < 0 {
            tokens.resize((-n) as usize, 0);
            n = unsafe {
                sys::llama_tokenize(
                    model.ptr.as_ptr(),
                    text.as_ptr() as *const c_char,
                    text.len() as i32,
                    tokens.as_mut_ptr(),
                    tokens.len() as i32,
                    true,
                    false,
                )
            };
            if n < 0 {
                return Err(EngineError::Tokenization(format!(
                    "llama_tokenize returned {n}"
                )));
            }
        }
        tokens.truncate(n as usize);
        Ok(tokens)
    }

    fn decode(
        &self,
        model: &LlamaModel,
        context: &mut LlamaContext,
        prompt: &[TokenId],
        params: &SamplingParams,
    ) -> Result<Vec<TokenId>, EngineError> {
        let eos = unsafe { sys::llama_token_eos(model.ptr.as_ptr()) };

        // llama.cpp rejects empty batches; an empty prompt starts from BOS.
        let mut input = if prompt.is_empty() {
            vec![unsafe { sys::llama_token_bos(model.ptr.as_ptr()) }]
        } else {
            prompt.to_vec()
        };

        let mut logits_ith = self.eval(context, &mut input)?;

        let mut generated = Vec::with_capacity(params.max_tokens);
        while generated.len() < params.max_tokens {
            let token = self.sample(model, context, params, logits_ith);
            if token == eos {
                log::debug!("end of sequence after {} tokens", generated.len());
                break;
            }
            generated.push(token);

            // Feed the sampled token back so the cache stays consistent
            // with the text returned to the caller.
            let mut step = [token];
            logits_ith = self.eval(context, &mut step)?;
        }

        Ok(generated)
    }

    fn detokenize(&self, model: &LlamaModel, tokens: &[TokenId]) -> String {
        let mut out = String::new();
        let mut buffer = TokenUtf8Buffer::new();
        for &token in tokens {
            if let Some(text) = buffer.push(&self.token_piece(model, token)) {
                out.push_str(&text);
            }
        }
        if let Some(rest) = buffer.flush_lossy() {
            out.push_str(&rest);
        }
        out
    }
}
