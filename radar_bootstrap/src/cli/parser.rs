// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # CLI Parser
//!
//! Command-line interface parsing using clap.
//!
//! This module defines the CLI structure and handles argument parsing.
//! Security validation happens in the validator module after parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Main CLI structure
#[derive(Parser, Debug, Clone)]
#[command(name = "radar")]
#[command(about = concat!("Resource-version radar and build tracker, v", env!("CARGO_PKG_VERSION")))]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the radar scanners and build tracker runner
    Run {
        /// Database connection string (e.g. sqlite://./radar.db)
        #[arg(long, default_value = "sqlite::memory:")]
        database_url: String,

        /// Default check interval when a resource doesn't set check_every (e.g. "1m")
        #[arg(long)]
        check_every: Option<String>,

        /// Build tracker tick interval, in seconds
        #[arg(long, default_value = "10")]
        tracker_interval_secs: u64,

        /// Worker name used in get-step lock names
        #[arg(long, default_value = "default-worker")]
        worker_name: String,
    },

    /// Trigger an immediate manual scan of a single resource
    Scan {
        /// Pipeline name
        pipeline: String,

        /// Resource name
        resource: String,

        /// Optional version to scan "from", as a JSON object (e.g. '{"ref":"abc"}')
        #[arg(long)]
        from_version: Option<String>,
    },

    /// Initialize the database schema
    Migrate {
        /// Database connection string
        #[arg(long, default_value = "sqlite::memory:")]
        database_url: String,
    },
}

/// Parse CLI arguments.
///
/// Clap will exit the process with an appropriate error message if parsing
/// fails, or on `--help`/`--version`.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_with_defaults() {
        let cli = Cli::parse_from(["radar", "run"]);
        match cli.command {
            Commands::Run {
                database_url,
                tracker_interval_secs,
                ..
            } => {
                assert_eq!(database_url, "sqlite::memory:");
                assert_eq!(tracker_interval_secs, 10);
            }
            _ => panic!("expected Run command"),
        }
    }

    #[test]
    fn parses_scan_command() {
        let cli = Cli::parse_from(["radar", "scan", "my-pipeline", "my-resource"]);
        match cli.command {
            Commands::Scan { pipeline, resource, .. } => {
                assert_eq!(pipeline, "my-pipeline");
                assert_eq!(resource, "my-resource");
            }
            _ => panic!("expected Scan command"),
        }
    }
}
