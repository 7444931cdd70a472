//! Load a schema, scaler or model artifact and print what it contains.

use anyhow::Context;
use clap::Parser;
use inference_engine::describe_artifact;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "inspect-artifact", version, about = "Check that a model artifact loads")]
struct Args {
    /// Artifact file (.json or .onnx)
    path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let summary = describe_artifact(&args.path).with_context(|| format!("failed to load {}", args.path.display()))?;
    println!("Successfully loaded {}", args.path.display());
    println!("{summary:#?}");
    Ok(())
}
