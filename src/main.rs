use clap::{Parser, Subcommand};
use docqa::Result;
use docqa::commands::{ask_document, ingest_document, search_document, show_status};
use docqa::config::{run_interactive_config, show_config};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docqa")]
#[command(about = "Document question answering with document-scoped semantic retrieval")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure the embedding server and answer generation settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Ingest a pre-extracted text document into the index
    Ingest {
        /// Path to a plain text file
        file: PathBuf,
        /// Document id to index under; a UUID is issued when omitted
        #[arg(long)]
        document_id: Option<String>,
    },
    /// Search one document for the chunks most similar to a query
    Search {
        /// Document id to search within
        document_id: String,
        /// Query text
        query: String,
        /// Maximum number of chunks to return
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Ask a question about one document and generate a grounded answer
    Ask {
        /// Document id to ask about
        document_id: String,
        /// Question text
        question: String,
        /// Number of retrieved chunks to ground the answer on
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Show store contents and embedding server health
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                run_interactive_config()?;
            }
        }
        Commands::Ingest { file, document_id } => {
            ingest_document(&file, document_id).await?;
        }
        Commands::Search {
            document_id,
            query,
            top_k,
        } => {
            search_document(&document_id, &query, top_k).await?;
        }
        Commands::Ask {
            document_id,
            question,
            top_k,
        } => {
            ask_document(&document_id, &question, top_k).await?;
        }
        Commands::Status => {
            show_status().await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn cli_parsing() {
        let cli = Cli::try_parse_from(["docqa", "status"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            matches!(parsed.command, Commands::Status);
        }
    }

    #[test]
    fn ingest_command_with_file() {
        let cli = Cli::try_parse_from(["docqa", "ingest", "notes.txt"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Ingest { file, document_id } = parsed.command {
                assert_eq!(file, PathBuf::from("notes.txt"));
                assert_eq!(document_id, None);
            }
        }
    }

    #[test]
    fn ingest_command_with_document_id() {
        let cli = Cli::try_parse_from([
            "docqa",
            "ingest",
            "notes.txt",
            "--document-id",
            "doc-42",
        ]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Ingest { file, document_id } = parsed.command {
                assert_eq!(file, PathBuf::from("notes.txt"));
                assert_eq!(document_id, Some("doc-42".to_string()));
            }
        }
    }

    #[test]
    fn search_command_with_top_k() {
        let cli = Cli::try_parse_from([
            "docqa", "search", "doc-42", "refund policy", "--top-k", "3",
        ]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Search {
                document_id,
                query,
                top_k,
            } = parsed.command
            {
                assert_eq!(document_id, "doc-42");
                assert_eq!(query, "refund policy");
                assert_eq!(top_k, Some(3));
            }
        }
    }

    #[test]
    fn ask_command() {
        let cli = Cli::try_parse_from(["docqa", "ask", "doc-42", "What is covered?"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Ask {
                document_id,
                question,
                top_k,
            } = parsed.command
            {
                assert_eq!(document_id, "doc-42");
                assert_eq!(question, "What is covered?");
                assert_eq!(top_k, None);
            }
        }
    }

    #[test]
    fn config_show_flag() {
        let cli = Cli::try_parse_from(["docqa", "config", "--show"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Config { show } = parsed.command {
                assert!(show);
            }
        }
    }

    #[test]
    fn invalid_command() {
        let cli = Cli::try_parse_from(["docqa", "invalid"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
        }
    }

    #[test]
    fn help_message() {
        let cli = Cli::try_parse_from(["docqa", "--help"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        }
    }
}
