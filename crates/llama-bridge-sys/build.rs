use std::env;

fn main() {
    // llama.cpp is supplied as a prebuilt library rather than vendored and
    // compiled here. Point `LLAMA_CPP_LIB_DIR` at the directory containing
    // `libllama` to link against it; without it, the declarations still
    // compile, which is all the default (stub-engine) workspace build needs.
    println!("cargo:rerun-if-env-changed=LLAMA_CPP_LIB_DIR");
    println!("cargo:rerun-if-env-changed=LLAMA_CPP_STATIC");

    if let Ok(dir) = env::var("LLAMA_CPP_LIB_DIR") {
        println!("cargo:rustc-link-search=native={dir}");

        let kind = if env::var("LLAMA_CPP_STATIC").is_ok() {
            "static"
        } else {
            "dylib"
        };
        println!("cargo:rustc-link-lib={kind}=llama");

        let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap();
        match target_os.as_str() {
            "macos" => {
                println!("cargo:rustc-link-lib=framework=Accelerate");
                println!("cargo:rustc-link-lib=framework=Metal");
                println!("cargo:rustc-link-lib=framework=MetalKit");
            }
            "linux" => {
                println!("cargo:rustc-link-lib=dylib=stdc++");
            }
            _ => {}
        }
    }
}
