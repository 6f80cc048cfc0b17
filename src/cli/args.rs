// src/cli/args.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Embedding backends for the terminal
pub struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Turn debugging information on
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub debug: u8,

    #[arg(long = "generate-config", help = "print default configuration as TOML")]
    pub generate_config: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Embed text or an image with the selected backend
    Embed {
        /// Text to embed; read from stdin when omitted
        text: Option<String>,

        #[arg(
            short = 'b',
            long = "backend",
            help = "backend specifier: default | local[:<model>] | clip[:<model>] | azure-openai:<endpoint>:<model>:<api-version>"
        )]
        backend: Option<String>,

        #[arg(long = "image", help = "embed an image file instead of text")]
        image: Option<PathBuf>,

        #[arg(short = 'o', long = "output", help = "write the embedding to a file")]
        output: Option<PathBuf>,

        #[arg(long = "json", help = "output the embedding as json")]
        is_json: bool,
    },
    /// Cosine similarity between two texts
    Similarity {
        text1: String,
        text2: String,

        #[arg(short = 'b', long = "backend", help = "backend specifier")]
        backend: Option<String>,
    },
    /// Show backend families and their availability
    Backends,
    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for: bash, zsh, or fish
        shell: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_cli_command_when_verify_then_debug_asserts_pass() {
        use clap::CommandFactory;
        Cli::command().debug_assert()
    }
}
