//! Build script compiling the petstore manifest into the binder module.

use std::path::PathBuf;

use apigen_core::{compile, Config, Manifest};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=petstore.yaml");

    let manifest = Manifest::parse_content(&std::fs::read_to_string("petstore.yaml")?)?;
    let artifacts = compile(&manifest, &Config::default())?;

    // `include!` rejects inner attributes at file level, so the source goes inside a module
    let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);
    std::fs::write(
        out_dir.join("routes.rs"),
        format!("pub mod routes {{\n{}}}\n", artifacts.source),
    )?;
    Ok(())
}
