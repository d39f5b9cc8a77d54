//! Command-line interface for mongo-classify
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and validation
//! - Reading raw reply documents from files or stdin
//! - Dispatching the `classify`, `transport`, `kinds` and `completion` subcommands

pub mod completion;

use bson::{Bson, Document};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::{Config, OutputFormat};
use crate::error::{Result, ToolError};
use crate::formatter::Formatter;
use crate::taxonomy::{
    Classifier, ErrorReport, RawReply, ReplySource, ServerReply, TransportFailure,
};

/// Classify MongoDB server error replies
#[derive(Parser, Debug)]
#[command(
    name = "mongo-classify",
    version,
    about = "Classify MongoDB server error replies",
    long_about = "Reads raw server error replies and shows the error kind a MongoDB client
would raise for each one, with its ancestors, diagnostics and retry policy."
)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Output format (json, json-pretty, text)
    #[arg(long, value_name = "FORMAT", global = true)]
    pub format: Option<String>,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv", global = true)]
    pub very_verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands for mongo-classify
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify reply documents (a JSON object or an array of objects)
    Classify {
        /// Input file; reads stdin when omitted or `-`
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Treat each reply as the outcome of a bulk write
        #[arg(long, conflicts_with_all = ["write_concern", "write"])]
        batch: bool,

        /// Treat each reply as a writeConcernError sub-document
        #[arg(long, conflicts_with = "write")]
        write_concern: bool,

        /// Treat each reply as one entry of a writeErrors array
        #[arg(long)]
        write: bool,
    },

    /// Classify a failure where no reply was received
    Transport {
        /// Error message reported by the transport
        #[arg(long, value_name = "MESSAGE")]
        message: String,

        /// The socket time budget expired
        #[arg(long)]
        timed_out: bool,

        /// Underlying cause (repeatable)
        #[arg(long = "cause", value_name = "CAUSE")]
        causes: Vec<String>,
    },

    /// Show every error kind with its parent and policy
    Kinds,

    /// Generate shell completion script
    Completion {
        /// Shell type (bash, zsh, fish)
        #[arg(value_name = "SHELL")]
        shell: String,
    },
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Create a new CLI interface
    ///
    /// # Returns
    /// * `Result<Self>` - New CLI interface or error
    pub fn new() -> Result<Self> {
        let args = CliArgs::parse();
        let config = Self::load_config(&args)?;

        Ok(Self { args, config })
    }

    /// Load configuration from file and merge with arguments
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load_from_file(args.config_file.as_deref())?;

        if let Err(e) = config.validate() {
            eprintln!("Warning: Configuration validation failed: {}", e);
            eprintln!("Using default configuration instead.");
            config = Config::default();
        }

        Self::apply_args_to_config(&mut config, args)?;

        Ok(config)
    }

    /// Override configuration values with CLI arguments where provided
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) -> Result<()> {
        if let Some(name) = &args.format {
            config.display.format = OutputFormat::parse(name).ok_or_else(|| {
                ToolError::InvalidInput(format!(
                    "unknown format '{name}' (expected json, json-pretty or text)"
                ))
            })?;
        }

        if args.no_color {
            config.display.color_output = false;
        }

        Ok(())
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the CLI arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Run the selected subcommand
    pub fn run(&self) -> Result<()> {
        let formatter = Formatter::from_config(&self.config.display);

        match &self.args.command {
            Commands::Classify {
                file,
                batch,
                write_concern,
                write,
            } => {
                let source = if *batch {
                    ReplySource::Batch
                } else if *write_concern {
                    ReplySource::WriteConcern
                } else if *write {
                    ReplySource::Write
                } else {
                    ReplySource::Command
                };
                let docs = read_documents(file.as_deref())?;
                info!("Classifying {} reply document(s)", docs.len());

                let classifier = self.config.classifier.build_classifier();
                for report in classify_documents(&classifier, &docs, source) {
                    println!("{}", formatter.format_report(&report)?);
                }
                Ok(())
            }
            Commands::Transport {
                message,
                timed_out,
                causes,
            } => {
                let failure = TransportFailure {
                    message: message.clone(),
                    timed_out: *timed_out,
                    causes: causes.clone(),
                };
                let classifier = self.config.classifier.build_classifier();
                let error = classifier.classify(&RawReply::Transport(failure));
                println!("{}", formatter.format_report(&ErrorReport::from_error(&error))?);
                Ok(())
            }
            Commands::Kinds => {
                println!("{}", formatter.format_kinds());
                Ok(())
            }
            Commands::Completion { shell } => completion::generate_completion(shell),
        }
    }
}

/// Classify each document as a reply found at `source`
pub fn classify_documents(
    classifier: &Classifier,
    docs: &[Document],
    source: ReplySource,
) -> Vec<ErrorReport> {
    docs.iter()
        .map(|doc| {
            let mut reply = ServerReply::from_document(doc);
            if source != ReplySource::Command {
                reply.source = source;
            }
            let error = classifier.classify(&RawReply::Server(reply));
            ErrorReport::from_error(&error)
        })
        .collect()
}

/// Read reply documents from `path`, or stdin when `path` is `None` or `-`
fn read_documents(path: Option<&Path>) -> Result<Vec<Document>> {
    let content = match path {
        Some(p) if p != Path::new("-") => {
            debug!("Reading replies from {}", p.display());
            std::fs::read_to_string(p)?
        }
        _ => {
            debug!("Reading replies from stdin");
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    parse_documents(&content)
}

/// Parse a JSON object or an array of objects; Extended JSON is accepted
pub fn parse_documents(content: &str) -> Result<Vec<Document>> {
    let value: serde_json::Value = serde_json::from_str(content)?;

    let values = match value {
        serde_json::Value::Array(values) => values,
        other => vec![other],
    };

    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| match Bson::try_from(value)? {
            Bson::Document(doc) => Ok(doc),
            other => Err(ToolError::InvalidInput(format!(
                "reply #{index} is not a document: {other}"
            ))),
        })
        .collect()
}
