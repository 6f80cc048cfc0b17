// src/cli/commands.rs
use crate::application::services::factory::create_resolver;
use crate::cli::error::{CliError, CliResult};
use crate::domain::embedding::{cosine_similarity, save_embedding};
use crate::domain::specifier::EmbedSpec;
use crate::infrastructure::embeddings::registry::{BackendFamily, BackendRegistry};
use itertools::Itertools;
use ndarray::Array1;
use std::io::Read;
use std::path::PathBuf;
use tracing::instrument;

#[instrument(skip_all)]
pub fn embed(
    text: Option<String>,
    backend: Option<String>,
    image: Option<PathBuf>,
    output: Option<PathBuf>,
    is_json: bool,
) -> CliResult<()> {
    let resolver = create_resolver();
    let embedder = resolver.resolve(backend.map(EmbedSpec::Descriptor))?;

    let embedding = match image {
        Some(path) => embedder.embed_image(&path)?,
        None => {
            let text = match text {
                Some(text) => text,
                None => read_stdin()?,
            };
            if text.trim().is_empty() {
                return Err(CliError::InvalidInput(
                    "nothing to embed: pass TEXT, --image, or pipe text on stdin".to_string(),
                ));
            }
            embedder.embed(&text)?
        }
    };

    match output {
        Some(path) => {
            save_embedding(&embedding, &path)?;
            eprintln!(
                "Wrote {} dimensions ({} backend) to {}",
                embedding.len(),
                embedder.backend(),
                path.display()
            );
        }
        None if is_json => {
            println!(
                "{}",
                serde_json::to_string(&embedding)
                    .map_err(|e| CliError::Other(format!("Failed to serialize embedding: {}", e)))?
            );
        }
        None => {
            println!("{}", embedding.iter().map(|x| x.to_string()).join(","));
        }
    }

    Ok(())
}

#[instrument(skip_all)]
pub fn similarity(text1: String, text2: String, backend: Option<String>) -> CliResult<()> {
    let resolver = create_resolver();
    let embedder = resolver.resolve(backend.map(EmbedSpec::Descriptor))?;

    let vec1 = Array1::from(embedder.embed(&text1)?);
    let vec2 = Array1::from(embedder.embed(&text2)?);

    println!("{}", cosine_similarity(&vec1, &vec2));
    Ok(())
}

#[instrument(skip_all)]
pub fn backends() -> CliResult<()> {
    let registry = BackendRegistry::probe();

    for family in BackendFamily::ALL {
        let status = if registry.is_available(family) {
            "available".to_string()
        } else {
            format!("not compiled in (rebuild with --features {})", family.feature())
        };
        println!("{:<14} {}", family.label(), status);
    }
    println!("{:<14} available (requires AZURE_OPENAI_API_KEY)", "azure-openai");
    println!("{:<14} available", "mock");

    Ok(())
}

fn read_stdin() -> CliResult<String> {
    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}
