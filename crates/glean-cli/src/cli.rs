//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Glean - Pull structured facts out of contract documents with a local LLM.
#[derive(Debug, Parser)]
#[command(name = "glean")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Ollama base URL
    #[arg(long, env = "OLLAMA_BASE_URL", global = true)]
    pub ollama_url: Option<String>,

    /// LLM model name
    #[arg(short, long, env = "LLM_MODEL", global = true)]
    pub model: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (ids and paths only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract clauses and summaries and write a JSON report
    Process(ProcessArgs),

    /// Extract the contract taxonomy from the head of a document
    Extract(ExtractArgs),

    /// Ask one question about a document
    Ask(AskArgs),

    /// Show how a document is chunked
    Chunks(ChunksArgs),

    /// Chat about one document interactively
    Chat(ChatArgs),

    /// Show or edit the configuration file
    Config(ConfigArgs),
}

/// Arguments for the process command.
#[derive(Debug, Parser)]
pub struct ProcessArgs {
    /// Input document (pdf, docx, xlsx, txt, md, csv)
    pub input: PathBuf,

    /// Output directory for the JSON report
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Input document (pdf, docx, xlsx, txt, md, csv)
    pub input: PathBuf,

    /// Number of leading chunks sent to the model
    #[arg(long)]
    pub max_chunks: Option<usize>,
}

/// Arguments for the ask command.
#[derive(Debug, Parser)]
pub struct AskArgs {
    /// Input document (pdf, docx, xlsx, txt, md, csv)
    pub input: PathBuf,

    /// Question text
    #[arg(required = true, num_args = 1..)]
    pub question: Vec<String>,

    /// Number of chunks used as context
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,
}

/// Arguments for the chunks command.
#[derive(Debug, Parser)]
pub struct ChunksArgs {
    /// Input document (pdf, docx, xlsx, txt, md, csv)
    pub input: PathBuf,

    /// Maximum number of chunks to show
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Rank chunks against this query instead of listing them in order
    #[arg(short, long)]
    pub query: Option<String>,
}

/// Arguments for the chat command.
#[derive(Debug, Parser)]
pub struct ChatArgs {
    /// Input document (pdf, docx, xlsx, txt, md, csv)
    pub input: PathBuf,
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Set one value (e.g. `llm.model`, `pipeline.chunk_size`)
    Set {
        /// Dotted key
        key: String,
        /// New value
        value: String,
    },
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_command() {
        let cli = Cli::parse_from(["glean", "process", "msa.pdf", "--out", "reports"]);
        match cli.command {
            Command::Process(args) => {
                assert_eq!(args.input, PathBuf::from("msa.pdf"));
                assert_eq!(args.out, Some(PathBuf::from("reports")));
            }
            _ => panic!("Expected Process command"),
        }
    }

    #[test]
    fn test_ask_joins_question_words() {
        let cli = Cli::parse_from(["glean", "ask", "msa.txt", "what", "are", "the", "payment", "terms?"]);
        match cli.command {
            Command::Ask(args) => {
                assert_eq!(args.question.join(" "), "what are the payment terms?");
                assert!(args.top_k.is_none());
            }
            _ => panic!("Expected Ask command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "glean",
            "extract",
            "msa.txt",
            "--format",
            "json",
            "--model",
            "mistral",
            "--ollama-url",
            "http://gpu-box:11434",
        ]);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        assert_eq!(cli.model.as_deref(), Some("mistral"));
        assert_eq!(cli.ollama_url.as_deref(), Some("http://gpu-box:11434"));
    }

    #[test]
    fn test_config_set() {
        let cli = Cli::parse_from(["glean", "config", "set", "llm.model", "mistral"]);
        match cli.command {
            Command::Config(ConfigArgs {
                action: ConfigAction::Set { key, value },
            }) => {
                assert_eq!(key, "llm.model");
                assert_eq!(value, "mistral");
            }
            _ => panic!("Expected Config Set command"),
        }
    }

    #[test]
    fn test_ask_requires_question() {
        assert!(Cli::try_parse_from(["glean", "ask", "msa.txt"]).is_err());
    }
}
