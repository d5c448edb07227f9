use clap::Parser;
use color_eyre::eyre::{self, WrapErr};
use llama_bridge::{InferenceSession, LlamaEngine};

mod cli_args;

use cli_args::Args;

fn main() -> eyre::Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let args = Args::parse();

    let now = std::time::Instant::now();
    let mut session = InferenceSession::load(LlamaEngine, &args.model_path, args.context_config())
        .wrap_err_with(|| format!("failed to load model from {:?}", args.model_path))?;
    log::info!("model fully loaded, elapsed {}ms", now.elapsed().as_millis());

    let response = session
        .generate(&args.generation_request())
        .wrap_err("generation failed")?;

    println!("{}{response}", args.prompt);

    session.unload();
    Ok(())
}
