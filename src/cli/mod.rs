//! CLI module for shiftswap
//!
//! Provides the command-line interface using clap.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::schemas::Role;

/// Shiftswap - Shift scheduling and substitution service for store operations
#[derive(Parser, Debug)]
#[command(name = "shiftswap")]
#[command(version)]
#[command(about = "Shift scheduling and substitution service for store operations")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress info-level output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the config file (default: ./shiftswap.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the working directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API
    Serve,

    /// Manage the staff directory
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Add a user or replace an existing one
    Add {
        /// User ID, as forwarded by the gateway in x-user-id
        #[arg(long)]
        id: String,

        /// Display name
        #[arg(long)]
        name: String,

        /// Role (owner, staff)
        #[arg(long)]
        role: Role,
    },

    /// List directory entries
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_add() {
        let cli = Cli::parse_from([
            "shiftswap", "user", "add", "--id", "s1", "--name", "Sam", "--role", "staff",
        ]);
        match cli.command {
            Commands::User {
                command: UserCommands::Add { id, name, role },
            } => {
                assert_eq!(id, "s1");
                assert_eq!(name, "Sam");
                assert_eq!(role, Role::Staff);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_role() {
        let result = Cli::try_parse_from([
            "shiftswap", "user", "add", "--id", "s1", "--name", "Sam", "--role", "manager",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["shiftswap", "serve", "--verbose", "--config", "/etc/s.json"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/s.json")));
        assert!(matches!(cli.command, Commands::Serve));
    }
}
