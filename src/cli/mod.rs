//! CLI module - Command-line interface for Marquee
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// Marquee - curated movie recommendations on top of TMDB
#[derive(Parser)]
#[command(name = "marquee")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    #[command(alias = "web")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Create an additional admin account
    CreateAdmin {
        /// Login name
        username: String,
        /// Initial password (at least 8 characters)
        password: String,
    },

    /// List active recommendations
    #[command(alias = "ls")]
    Recommendations,
}

pub use commands::*;
