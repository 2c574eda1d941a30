use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sentiwatch")]
#[command(author, version, about = "Score sentiment as you type")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the interactive editor; each input line is appended to the document
    Watch {
        #[command(flatten)]
        model: ModelArgs,

        /// Quiet period before analysis, in milliseconds
        #[arg(long)]
        debounce_ms: Option<u64>,

        /// Drop results for text that was edited while it was being scored
        #[arg(long)]
        discard_stale: bool,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Score a single text and exit
    Analyze {
        /// Text to score
        text: String,

        #[command(flatten)]
        model: ModelArgs,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },
}

/// Model selection shared by all subcommands
#[derive(Args, Debug, Clone, Default)]
pub struct ModelArgs {
    /// Config file path (defaults to the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Hugging Face model id
    #[arg(long)]
    pub model: Option<String>,

    /// Local model directory (config.json, model.safetensors, tokenizer)
    #[arg(long, conflicts_with = "lexicon")]
    pub local: Option<PathBuf>,

    /// Use the built-in keyword lexicon instead of a neural model
    #[arg(long)]
    pub lexicon: bool,

    /// Inference device: cpu, cuda, or metal
    #[arg(long)]
    pub device: Option<String>,

    /// Number of labels to show per analysis (0 = all)
    #[arg(long)]
    pub top_k: Option<usize>,
}
