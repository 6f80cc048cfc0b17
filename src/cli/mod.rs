// src/cli/mod.rs
use crate::cli::args::{Cli, Commands};
use crate::cli::error::CliResult;

pub mod args;
pub mod commands;
pub mod completion;
pub mod error;

pub fn execute_command(cli: Cli) -> CliResult<()> {
    if cli.generate_config {
        println!("{}", crate::config::generate_default_config());
        return Ok(());
    }
    match cli.command {
        Some(Commands::Embed {
            text,
            backend,
            image,
            output,
            is_json,
        }) => commands::embed(text, backend, image, output, is_json),
        Some(Commands::Similarity {
            text1,
            text2,
            backend,
        }) => commands::similarity(text1, text2, backend),
        Some(Commands::Backends) => commands::backends(),
        Some(Commands::Completion { shell }) => handle_completion(shell),
        None => Ok(()),
    }
}

fn handle_completion(shell: String) -> CliResult<()> {
    match completion::generate_completion(&shell) {
        Ok(_) => Ok(()),
        Err(e) => Err(error::CliError::CommandFailed(format!(
            "Failed to generate completion script: {}",
            e
        ))),
    }
}
