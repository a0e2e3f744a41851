use std::path::PathBuf;

use clap::{ArgGroup, Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Analyze one image or text once.
    Analyze(AnalyzeArgs),
    /// Continuously analyze a frames directory or text file.
    Scan(ScanArgs),
    /// Highlight villain terms in text.
    Highlight(HighlightArgs),
    /// List the persona catalog.
    Personas,
    /// Dump the JSON schema of the analysis verdict.
    Schema,
}

/// Arguments for `lens analyze`.
#[derive(Clone, Debug, Args)]
#[command(group(ArgGroup::new("input").required(true).args(["image", "text", "text_file"])))]
pub struct AnalyzeArgs {
    /// Image of a product label (jpg, png, webp, heic).
    #[arg(long)]
    pub image: Option<PathBuf>,
    /// Ingredient list or product description.
    #[arg(long)]
    pub text: Option<String>,
    /// File containing the ingredient list.
    #[arg(long)]
    pub text_file: Option<PathBuf>,
    /// Persona id from the catalog.
    #[arg(long)]
    pub persona: Option<String>,
    /// Sub-option id of the persona.
    #[arg(long, requires = "persona")]
    pub sub_option: Option<String>,
}

/// Arguments for `lens scan`.
#[derive(Clone, Debug, Args)]
#[command(group(ArgGroup::new("source").required(true).args(["frames", "text_file"])))]
pub struct ScanArgs {
    /// Directory whose newest image is analyzed on each attempt.
    #[arg(long)]
    pub frames: Option<PathBuf>,
    /// Text file whose current content is analyzed on each attempt.
    #[arg(long)]
    pub text_file: Option<PathBuf>,
    /// Persona id from the catalog.
    #[arg(long)]
    pub persona: Option<String>,
    /// Sub-option id of the persona.
    #[arg(long, requires = "persona")]
    pub sub_option: Option<String>,
    /// Command that receives each verdict's audio script on stdin.
    #[arg(long)]
    pub speak_with: Option<String>,
    /// Command that receives each verdict's share blurb on stdin.
    #[arg(long)]
    pub share_with: Option<String>,
}

/// Arguments for `lens highlight`.
#[derive(Clone, Debug, Args)]
pub struct HighlightArgs {
    /// Villain name to highlight (repeatable).
    #[arg(long = "term", value_name = "NAME")]
    pub terms: Vec<String>,
    /// Text to scan (reads stdin when omitted).
    pub text: Option<String>,
}
