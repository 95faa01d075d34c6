//! Build script for proto compilation.
//!
//! The generated operation service code is committed to the repository, so
//! this only does work when the proto file changes.
//!
//! To regenerate: `cargo build --features regenerate-proto`
//!
//! The generated file will be placed in `src/generated.rs`.

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "regenerate-proto")]
    {
        let out_dir = std::path::PathBuf::from("src");
        tonic_prost_build::configure()
            .build_server(false)
            .enable_type_names()
            .type_name_domain(["."], "type.googleapis.com")
            .out_dir(&out_dir)
            .compile_protos(&["proto/operation.proto"], &["proto"])?;

        let generated = out_dir.join("cloud.operation.v1.rs");
        let target = out_dir.join("generated.rs");
        if generated.exists() {
            std::fs::rename(generated, target)?;
        }
    }

    println!("cargo:rerun-if-changed=proto/operation.proto");

    Ok(())
}
