//! Hand-written declarations for the subset of the llama.cpp C API that
//! `llama-bridge` consumes: backend lifecycle, model/context lifecycle,
//! tokenization, decoding and sampling. Field layouts follow the upstream
//! `llama.h` header at the pinned library revision.
#![allow(non_camel_case_types)]

use std::os::raw::{c_char, c_float, c_int, c_void};

pub type llama_token = i32;
pub type llama_pos = i32;
pub type llama_seq_id = i32;

/// Opaque; only ever handled behind a pointer.
pub type llama_model = c_void;
/// Opaque; only ever handled behind a pointer.
pub type llama_context = c_void;

pub type llama_progress_callback =
    Option<unsafe extern "C" fn(progress: c_float, user_data: *mut c_void)>;

pub type llama_rope_scaling_type = i8;
pub const LLAMA_ROPE_SCALING_UNSPECIFIED: llama_rope_scaling_type = -1;
pub const LLAMA_ROPE_SCALING_NONE: llama_rope_scaling_type = 0;
pub const LLAMA_ROPE_SCALING_LINEAR: llama_rope_scaling_type = 1;
pub const LLAMA_ROPE_SCALING_YARN: llama_rope_scaling_type = 2;

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct llama_model_params {
    pub n_gpu_layers: i32,
    pub main_gpu: i32,
    pub tensor_split: *const c_float,
    pub progress_callback: llama_progress_callback,
    pub progress_callback_user_data: *mut c_void,
    pub vocab_only: bool,
    pub use_mmap: bool,
    pub use_mlock: bool,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct llama_context_params {
    pub seed: u32,
    pub n_ctx: u32,
    pub n_batch: u32,
    pub n_threads: u32,
    pub n_threads_batch: u32,
    pub rope_scaling_type: llama_rope_scaling_type,
    pub rope_freq_base: c_float,
    pub rope_freq_scale: c_float,
    pub yarn_ext_factor: c_float,
    pub yarn_attn_factor: c_float,
    pub yarn_beta_fast: c_float,
    pub yarn_beta_slow: c_float,
    pub yarn_orig_ctx: u32,
    pub mul_mat_q: bool,
    pub logits_all: bool,
    pub embedding: bool,
    pub offload_kqv: bool,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct llama_token_data {
    pub id: llama_token,
    pub logit: c_float,
    pub p: c_float,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct llama_token_data_array {
    pub data: *mut llama_token_data,
    pub size: usize,
    pub sorted: bool,
}

/// Input batch for `llama_decode`. Either `token` or `embd` is populated,
/// never both.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct llama_batch {
    pub n_tokens: i32,
    pub token: *mut llama_token,
    pub embd: *mut c_float,
    pub pos: *mut llama_pos,
    pub n_seq_id: *mut i32,
    pub seq_id: *mut *mut llama_seq_id,
    pub logits: *mut i8,
    pub all_pos_0: llama_pos,
    pub all_pos_1: llama_pos,
    pub all_seq_id: llama_seq_id,
}

extern "C" {
    pub fn llama_backend_init(numa: bool);

    pub fn llama_backend_free();

    pub fn llama_model_default_params() -> llama_model_params;

    pub fn llama_context_default_params() -> llama_context_params;

    pub fn llama_load_model_from_file(
        path_model: *const c_char,
        params: llama_model_params,
    ) -> *mut llama_model;

    pub fn llama_free_model(model: *mut llama_model);

    pub fn llama_new_context_with_model(
        model: *mut llama_model,
        params: llama_context_params,
    ) -> *mut llama_context;

    pub fn llama_free(ctx: *mut llama_context);

    pub fn llama_n_ctx(ctx: *const llama_context) -> c_int;

    pub fn llama_n_vocab(model: *const llama_model) -> c_int;

    pub fn llama_token_bos(model: *const llama_model) -> llama_token;

    pub fn llama_token_eos(model: *const llama_model) -> llama_token;

    /// Returns the number of tokens written, or the negated required buffer
    /// size if `n_max_tokens` was too small.
    pub fn llama_tokenize(
        model: *const llama_model,
        text: *const c_char,
        text_len: c_int,
        tokens: *mut llama_token,
        n_max_tokens: c_int,
        add_bos: bool,
        special: bool,
    ) -> c_int;

    /// Returns the number of bytes written, or the negated required buffer
    /// size if `length` was too small.
    pub fn llama_token_to_piece(
        model: *const llama_model,
        token: llama_token,
        buf: *mut c_char,
        length: c_int,
    ) -> c_int;

    pub fn llama_batch_get_one(
        tokens: *mut llama_token,
        n_tokens: i32,
        pos_0: llama_pos,
        seq_id: llama_seq_id,
    ) -> llama_batch;

    /// 0 on success, 1 if no KV slot was available, < 0 on hard failure.
    pub fn llama_decode(ctx: *mut llama_context, batch: llama_batch) -> c_int;

    pub fn llama_get_logits_ith(ctx: *mut llama_context, i: i32) -> *mut c_float;

    pub fn llama_sample_top_p(
        ctx: *mut llama_context,
        candidates: *mut llama_token_data_array,
        p: c_float,
        min_keep: usize,
    );

    pub fn llama_sample_temp(
        ctx: *mut llama_context,
        candidates: *mut llama_token_data_array,
        temp: c_float,
    );

    pub fn llama_sample_token(
        ctx: *mut llama_context,
        candidates: *mut llama_token_data_array,
    ) -> llama_token;

    pub fn llama_sample_token_greedy(
        ctx: *mut llama_context,
        candidates: *mut llama_token_data_array,
    ) -> llama_token;
}
