use llama_bridge::{ContextConfig, GenerationRequest, InferenceSession, LlamaEngine};

fn main() {
    let mut args = std::env::args().skip(1);
    let model_path = args.next().expect("usage: generate <model-path> [prompt]");
    let prompt = args
        .next()
        .unwrap_or_else(|| "Rust is a cool programming language because".to_string());

    let mut session = InferenceSession::load(LlamaEngine, &model_path, ContextConfig::default())
        .unwrap_or_else(|err| panic!("Failed to load model from {model_path}: {err}"));

    match session.generate(&GenerationRequest::new(&prompt)) {
        Ok(response) => println!("{prompt}{response}"),
        Err(err) => eprintln!("generation failed: {err}"),
    }

    session.unload();
}
