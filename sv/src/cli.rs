//! CLI argument parsing for snippetvault

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::SnippetId;

#[derive(Parser, Debug)]
#[command(name = "sv")]
#[command(author, version, about = "Local code snippet vault", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the store directory from config
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new snippet (code from --code, --file, or stdin)
    Add {
        /// Snippet title
        #[arg(required = true)]
        title: String,

        /// Language label (default from config)
        #[arg(short, long)]
        language: Option<String>,

        /// Comma-separated tags
        #[arg(short, long)]
        tags: Option<String>,

        /// Snippet code
        #[arg(long, conflicts_with = "file")]
        code: Option<String>,

        /// Read snippet code from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Change fields of an existing snippet
    Edit {
        /// Snippet ID
        #[arg(required = true)]
        id: SnippetId,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New language label
        #[arg(short, long)]
        language: Option<String>,

        /// New comma-separated tags (empty string clears them)
        #[arg(short, long)]
        tags: Option<String>,

        /// New code
        #[arg(long, conflicts_with = "file")]
        code: Option<String>,

        /// Read new code from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Delete a snippet
    #[command(alias = "delete")]
    Rm {
        /// Snippet ID
        #[arg(required = true)]
        id: SnippetId,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List snippets, optionally filtered
    #[command(alias = "ls")]
    List {
        /// Case-insensitive text to find in title or code
        #[arg(short, long)]
        search: Option<String>,

        /// Exact language label
        #[arg(short, long)]
        language: Option<String>,

        /// Case-insensitive text to find in any tag
        #[arg(short, long)]
        tag: Option<String>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show one snippet with its metadata
    Show {
        /// Snippet ID
        #[arg(required = true)]
        id: SnippetId,
    },

    /// Print a snippet's code verbatim
    Code {
        /// Snippet ID
        #[arg(required = true)]
        id: SnippetId,
    },

    /// Export all snippets as pretty JSON
    Export {
        /// Output path (default: snippets-YYYY-MM-DD.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace all snippets with the contents of a JSON export
    Import {
        /// JSON file to import
        #[arg(required = true)]
        file: PathBuf,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List language labels in use
    Languages,
}

/// Output format for list output
#[derive(Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use text or json", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add() {
        let cli = Cli::parse_from(["sv", "add", "Sort", "-l", "python", "-t", "algo, sort", "--code", "def s(): pass"]);
        match cli.command {
            Command::Add {
                title,
                language,
                tags,
                code,
                file,
            } => {
                assert_eq!(title, "Sort");
                assert_eq!(language.as_deref(), Some("python"));
                assert_eq!(tags.as_deref(), Some("algo, sort"));
                assert_eq!(code.as_deref(), Some("def s(): pass"));
                assert!(file.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_code_and_file_conflict() {
        let result = Cli::try_parse_from(["sv", "add", "T", "--code", "x", "--file", "a.txt"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_list_format() {
        let cli = Cli::parse_from(["sv", "--store", "/tmp/v", "list", "--format", "json", "-t", "cli"]);
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/v")));
        assert!(matches!(
            cli.command,
            Command::List {
                format: OutputFormat::Json,
                ..
            }
        ));
    }

    #[test]
    fn test_output_format_rejects_unknown() {
        assert!("yaml".parse::<OutputFormat>().is_err());
        assert!(matches!("PLAIN".parse::<OutputFormat>(), Ok(OutputFormat::Text)));
    }

    #[test]
    fn test_delete_alias() {
        let cli = Cli::parse_from(["sv", "delete", "42", "-y"]);
        assert!(matches!(cli.command, Command::Rm { id: 42, yes: true }));
    }
}
