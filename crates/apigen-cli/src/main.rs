//! apigen CLI entrypoint
//! Loads a manifest and config, runs the compiler and writes the artifacts.

// Internal imports (std, crate)
use std::path::{Path, PathBuf};

// External imports (alphabetized)
use anyhow::Context;
use apigen_core::{compile, Artifacts, Config, Manifest};
use clap::Parser;
use tokio::fs;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "apigen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Compile an API manifest into binders, an OpenAPI document and docs UI
    Generate {
        /// Path to the API manifest (YAML or JSON)
        #[arg(long)]
        manifest: PathBuf,
        /// Path to the generator config (YAML, TOML or JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output directory for generated files
        #[arg(long)]
        output_dir: PathBuf,
        /// File name of the generated binder module
        #[arg(long, default_value = "routes.rs")]
        source_file: String,
        /// Emit the OpenAPI document even if the config leaves it off
        #[arg(long)]
        openapi: bool,
        /// Emit the docs UI bundle (implies --openapi)
        #[arg(long)]
        docs: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Generate {
            manifest,
            config,
            output_dir,
            source_file,
            openapi,
            docs,
        } => {
            tracing::info!("Loading manifest from: {}", manifest.display());
            let manifest_obj = Manifest::from_file(manifest)
                .await
                .with_context(|| format!("Failed to load manifest {}", manifest.display()))?;

            let mut config_obj = match config {
                Some(path) => Config::from_file(path)
                    .await
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
                None => Config::default(),
            };
            config_obj.openapi_enabled |= *openapi;
            config_obj.docs_ui_enabled |= *docs;

            let artifacts = compile(&manifest_obj, &config_obj)
                .with_context(|| format!("Failed to compile {}", manifest.display()))?;

            write_artifacts(output_dir, source_file, &config_obj, &artifacts).await?;
            tracing::info!("Generated API sources in: {}", output_dir.display());
        }
    }
    Ok(())
}

async fn write_artifacts(
    output_dir: &Path,
    source_file: &str,
    config: &Config,
    artifacts: &Artifacts,
) -> anyhow::Result<()> {
    write_file(&output_dir.join(source_file), artifacts.source.as_bytes()).await?;

    if let Some(openapi) = &artifacts.openapi {
        write_file(&output_dir.join(&config.openapi_output), openapi).await?;
    }

    if let Some(bundle) = &artifacts.docs {
        for file in &bundle.files {
            write_file(&output_dir.join(&file.path), file.contents.as_bytes()).await?;
        }
    }
    Ok(())
}

async fn write_file(path: &Path, contents: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, contents)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}
