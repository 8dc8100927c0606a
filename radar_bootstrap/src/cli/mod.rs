// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Command-Line Interface Module
//!
//! Bootstrap-layer CLI handling with security-first design.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │  1. parser::parse()                 │  Parse CLI with clap
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  2. validator::validate()           │  Security validation
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  3. ValidatedConfig                 │  Safe, validated config
//! └─────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `parser` - CLI structure and clap parsing
//! - `validator` - Security validation layer
//! - `commands` - Validated command parameters

pub mod parser;
pub mod validator;

pub use parser::{parse_cli, Cli, Commands};
pub use validator::{ParseError, SecureArgParser};

/// Validated CLI configuration.
///
/// Holds all CLI arguments after security validation: paths canonicalized,
/// numeric values range-checked.
#[derive(Debug, Clone)]
pub struct ValidatedCli {
    pub command: ValidatedCommand,
    pub verbose: bool,
    pub config: Option<std::path::PathBuf>,
}

/// Validated command variants.
#[derive(Debug, Clone)]
pub enum ValidatedCommand {
    Run {
        database_url: String,
        check_every: Option<String>,
        tracker_interval_secs: u64,
        worker_name: String,
    },
    Scan {
        pipeline: String,
        resource: String,
        from_version: Option<String>,
    },
    Migrate {
        database_url: String,
    },
}

/// Parse and validate CLI arguments: parse with clap, then run every
/// string/number through `SecureArgParser`.
pub fn parse_and_validate() -> Result<ValidatedCli, ParseError> {
    let cli = parse_cli();
    validate_cli(cli)
}

fn validate_cli(cli: Cli) -> Result<ValidatedCli, ParseError> {
    let config = match &cli.config {
        Some(path) => {
            SecureArgParser::validate_argument(&path.to_string_lossy())?;
            Some(path.clone())
        }
        None => None,
    };

    let command = match cli.command {
        Commands::Run {
            database_url,
            check_every,
            tracker_interval_secs,
            worker_name,
        } => {
            SecureArgParser::validate_argument(&database_url)?;
            if let Some(ref ce) = check_every {
                SecureArgParser::validate_argument(ce)?;
            }
            SecureArgParser::validate_argument(&worker_name)?;

            if tracker_interval_secs == 0 {
                return Err(ParseError::InvalidValue {
                    arg: "tracker-interval-secs".to_string(),
                    reason: "must be greater than 0".to_string(),
                });
            }

            ValidatedCommand::Run {
                database_url,
                check_every,
                tracker_interval_secs,
                worker_name,
            }
        }
        Commands::Scan {
            pipeline,
            resource,
            from_version,
        } => {
            SecureArgParser::validate_argument(&pipeline)?;
            SecureArgParser::validate_argument(&resource)?;
            if let Some(ref v) = from_version {
                SecureArgParser::validate_argument(v)?;
            }

            ValidatedCommand::Scan {
                pipeline,
                resource,
                from_version,
            }
        }
        Commands::Migrate { database_url } => {
            SecureArgParser::validate_argument(&database_url)?;
            ValidatedCommand::Migrate { database_url }
        }
    };

    Ok(ValidatedCli {
        command,
        verbose: cli.verbose,
        config,
    })
}
