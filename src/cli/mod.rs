//! Command-line interface.

mod commands;

use clap::{Parser, Subcommand};

use crate::answer::AnswerFormat;
use crate::extract::ExtractionMode;

/// PDF question answering with OCR fallback.
#[derive(Parser)]
#[command(name = "docask", version, about)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the web server
    Serve {
        /// Bind host (overrides HOST)
        #[arg(long)]
        host: Option<String>,
        /// Bind port (overrides PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Ask a question about a document
    Ask {
        /// Registry name or path of the PDF
        pdf: String,
        /// The question to answer
        question: String,
        /// Extraction mode
        #[arg(long, value_enum, default_value_t = ExtractionMode::OcrPrimary)]
        mode: ExtractionMode,
        /// Answer format
        #[arg(long, value_enum, default_value_t = AnswerFormat::Structured)]
        format: AnswerFormat,
    },
    /// Show a document's page count and previews
    Inspect {
        /// Registry name or path of the PDF
        pdf: String,
    },
    /// List the document registry
    Pdfs,
    /// Report availability of the external extraction tools
    Check,
}

/// Whether verbose logging was requested. Checked before clap parsing so
/// logging can be initialized first.
pub fn is_verbose() -> bool {
    std::env::args().any(|a| a == "-v" || a == "--verbose")
}

/// Parse arguments and dispatch.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = crate::config::Settings::from_env();

    match cli.command {
        Command::Serve { host, port } => commands::serve(settings, host, port).await,
        Command::Ask {
            pdf,
            question,
            mode,
            format,
        } => commands::ask(settings, &pdf, &question, mode, format).await,
        Command::Inspect { pdf } => commands::inspect(settings, &pdf).await,
        Command::Pdfs => commands::pdfs(settings),
        Command::Check => commands::check(),
    }
}
