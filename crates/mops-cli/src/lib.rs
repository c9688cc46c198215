//! Media Ops CLI Library
//!
//! Command-line access to the media-ops service clients:
//!
//! - **Job status**: publish and inspect per-asset job status (`mops status`)
//! - **Job dispatch**: drive container jobs on Mapsor (`mops job`)
//! - **Configuration**: pack and unpack configuration blobs (`mops config`)
//!
//! Every command prints JSON on stdout; logs go to stderr.

pub mod commands;
pub mod config;
pub mod error;

pub use config::{ConfigSource, ServiceConfig};
pub use error::{CliError, Result};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// mops - media operations service client
#[derive(Parser, Debug)]
#[command(name = "mops")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Service configuration: a JSON file path or an s3://bucket/key location
    #[arg(short, long, env = "MOPS_CONFIG", global = true)]
    pub config: Option<String>,

    /// Encoded configuration blob, used when --config is not given
    #[arg(long, env = "MOPS_CONFIG_BLOB", global = true, hide_env_values = true)]
    pub config_blob: Option<String>,

    /// Print the command reference as markdown
    #[arg(long, hide = true)]
    pub markdown_help: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Publish and read job status
    Status {
        #[command(subcommand)]
        command: StatusCommand,
    },

    /// Manage container jobs on Mapsor
    Job {
        #[command(subcommand)]
        command: JobCommand,
    },

    /// Encode, decode and check configuration documents
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Job status subcommands
#[derive(Subcommand, Debug)]
pub enum StatusCommand {
    /// Publish a status for an asset
    Publish {
        /// Asset identifier
        asset_id: String,

        /// State to record (e.g. "started", "done")
        state: String,

        /// Mark the job complete
        #[arg(long)]
        complete: bool,

        /// Content digest to attach
        #[arg(long, conflicts_with = "digest_file")]
        digest: Option<String>,

        /// Attach the SHA-256 of this file as the digest
        #[arg(long)]
        digest_file: Option<PathBuf>,

        /// Only refresh the timestamp (and digest) of the stored record
        #[arg(long)]
        refresh: bool,
    },

    /// Show the latest status of an asset
    Last {
        /// Asset identifier
        asset_id: String,
    },

    /// List every known status for the configured job type
    List,
}

/// Mapsor job subcommands
#[derive(Subcommand, Debug)]
pub enum JobCommand {
    /// Schedule a container job
    Submit {
        #[arg(long)]
        customer: String,

        #[arg(long)]
        cloud: String,

        #[arg(long)]
        region: String,

        /// Job identifier
        #[arg(long)]
        id: String,

        /// Extra payload fields as a JSON object
        #[arg(long)]
        extra: Option<String>,
    },

    /// Show the status of a submitted job
    Status { id: String },

    /// Cancel a submitted job
    Cancel { id: String },

    /// Retry a submitted job
    Retry { id: String },

    /// Print the logs of a job
    Logs { id: String },
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Encode a JSON configuration file into a blob
    Encode {
        /// Path to the JSON document
        path: PathBuf,
    },

    /// Decode a blob back into JSON
    Decode {
        /// Blob to decode (defaults to MOPS_CONFIG_BLOB)
        blob: Option<String>,
    },

    /// Load the configuration and report which services it configures
    Validate,

    /// Check a JSON configuration file and store it in S3
    Upload {
        /// Path to the JSON document
        path: PathBuf,

        /// Destination, s3://bucket/key
        location: String,

        /// Replace an existing object
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_status_publish() {
        let cli = Cli::try_parse_from([
            "mops", "status", "publish", "42", "done", "--complete", "--digest", "abc",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Status {
                command:
                    StatusCommand::Publish {
                        asset_id,
                        state,
                        complete,
                        digest,
                        refresh,
                        ..
                    },
            }) => {
                assert_eq!(asset_id, "42");
                assert_eq!(state, "done");
                assert!(complete);
                assert_eq!(digest.as_deref(), Some("abc"));
                assert!(!refresh);
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_digest_and_digest_file_conflict() {
        let result = Cli::try_parse_from([
            "mops",
            "status",
            "publish",
            "42",
            "done",
            "--digest",
            "abc",
            "--digest-file",
            "x.mxf",
        ]);
        assert!(result.is_err());
    }
}
