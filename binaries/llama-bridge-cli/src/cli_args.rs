use std::path::PathBuf;

use clap::Parser;
use llama_bridge::{ContextConfig, GenerationRequest};
use rand::Rng;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Path to the model file to load.
    pub model_path: PathBuf,

    /// The prompt to feed the model.
    #[arg(long, short = 'p')]
    pub prompt: String,

    /// Sets how many tokens to predict.
    #[arg(long, short = 'n', default_value_t = 128)]
    pub num_predict: usize,

    /// The sampling temperature; 0 selects greedy decoding.
    #[arg(long, default_value_t = 0.80)]
    pub temperature: f32,

    /// The cumulative probability after which no more tokens are kept
    /// for sampling.
    #[arg(long, default_value_t = 0.95)]
    pub top_p: f32,

    /// Size of the context window, in tokens.
    #[arg(long, default_value_t = 512)]
    pub context_size: usize,

    /// How many prompt tokens at a time to feed the model.
    #[arg(long, default_value_t = 8)]
    pub batch_size: usize,

    /// Sets the number of threads to use. Defaults to the number of
    /// physical cores.
    #[arg(long, short = 't')]
    pub num_threads: Option<usize>,

    /// Specifies the seed to use during sampling. Note that, depending on
    /// hardware, the same seed may lead to different results on two
    /// separate machines.
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Args {
    pub fn context_config(&self) -> ContextConfig {
        ContextConfig {
            context_size: self.context_size,
            batch_size: self.batch_size,
            threads: self.num_threads.unwrap_or_else(num_cpus::get_physical),
            seed: self.seed.unwrap_or_else(|| rand::thread_rng().gen()),
        }
    }

    pub fn generation_request(&self) -> GenerationRequest<'_> {
        GenerationRequest {
            prompt: &self.prompt,
            max_tokens: self.num_predict,
            temperature: self.temperature,
            top_p: self.top_p,
        }
    }
}
