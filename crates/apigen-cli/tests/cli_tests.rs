//! End-to-end tests for the apigen CLI

use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Command, Output};

const MANIFEST: &str = r#"
endpoints:
  - method: GET
    path: /pets/{id}
    handler: { package: "crate::handlers::pets", name: get_pet }
    shape: ReqResp
    reqType: crate::models::GetPet
    respType: crate::models::Pet
    bindings:
      path: [{ field: id, tag: id, kind: int64 }]
  - method: GET
    path: /health
    handler: { package: "crate::handlers::ops", name: health }
    shape: NoReqNoResp
types:
  crate::models::GetPet:
    kind: struct
    fields: [{ name: id, type: int64 }]
  crate::models::Pet:
    kind: struct
    fields: [{ name: id, jsonName: id, type: int64, required: true }]
"#;

fn apigen(args: &[&str]) -> Result<Output> {
    Command::new(env!("CARGO_BIN_EXE_apigen"))
        .args(args)
        .output()
        .context("Failed to run apigen")
}

fn write_manifest(dir: &Path) -> Result<String> {
    let path = dir.join("manifest.yaml");
    std::fs::write(&path, MANIFEST)?;
    Ok(path.to_string_lossy().to_string())
}

#[test]
fn test_generate_source_only() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let manifest = write_manifest(dir.path())?;
    let out = dir.path().join("out");

    let output = apigen(&[
        "generate",
        "--manifest",
        &manifest,
        "--output-dir",
        &out.to_string_lossy(),
    ])?;
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let source = std::fs::read_to_string(out.join("routes.rs"))?;
    assert!(source.contains("fn parse_int64("));
    assert!(source.contains("pub fn routes() -> Router"));
    assert!(!out.join("openapi.json").exists());
    assert!(!out.join("docs.rs").exists());
    Ok(())
}

#[test]
fn test_generate_with_docs_writes_every_artifact() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let manifest = write_manifest(dir.path())?;
    let config = dir.path().join("apigen.toml");
    std::fs::write(&config, "openapi_title = \"Pets\"\nopenapi_output = \"pets.json\"\n")?;
    let out = dir.path().join("out");

    let output = apigen(&[
        "generate",
        "--manifest",
        &manifest,
        "--config",
        &config.to_string_lossy(),
        "--output-dir",
        &out.to_string_lossy(),
        "--source-file",
        "api.rs",
        "--docs",
    ])?;
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    assert!(out.join("api.rs").exists());
    let doc: serde_json::Value = serde_json::from_slice(&std::fs::read(out.join("pets.json"))?)?;
    assert_eq!(doc["info"]["title"], "Pets");
    assert_eq!(doc["paths"]["/pets/{id}"]["get"]["parameters"][0]["schema"]["format"], "int64");

    let shim = std::fs::read_to_string(out.join("docs.rs"))?;
    assert!(shim.contains("include_str!(\"pets.json\")"));
    for asset in ["index.html", "viewer.css", "viewer.js"] {
        assert!(out.join("docs_assets").join(asset).exists(), "missing {asset}");
    }
    Ok(())
}

#[test]
fn test_invalid_manifest_exits_non_zero() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let manifest = dir.path().join("manifest.yaml");
    std::fs::write(
        &manifest,
        "endpoints:\n  - method: GET\n    path: /pets/{id}\n    handler: { package: \"crate::pets\", name: get }\n    shape: NoReqNoResp\n",
    )?;
    let out = dir.path().join("out");

    let output = apigen(&[
        "generate",
        "--manifest",
        &manifest.to_string_lossy(),
        "--output-dir",
        &out.to_string_lossy(),
    ])?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("path parameter 'id' has no path binding"));
    assert!(!out.join("routes.rs").exists());
    Ok(())
}
