// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! ReedART CLI Tool
//!
//! Command-line interface for exercising the in-memory index: an
//! interactive shell, script execution, a quick concurrent benchmark
//! and a node-growth demonstration.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod formatters;

use commands::{bench, exec, shell, stats_demo};

#[derive(Parser)]
#[command(name = "reedart")]
#[command(author = "Vivian Voss <ask@vvoss.dev>")]
#[command(version = "0.1.0")]
#[command(about = "ReedART CLI - in-memory ordered index operations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open an interactive shell over a fresh index
    Shell {
        /// Output format: table|json|csv
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Run a newline-separated command script
    Exec {
        /// Path to the script file
        script: PathBuf,

        /// Output format: table|json|csv
        #[arg(short, long, default_value = "table")]
        format: String,

        /// Only print command errors, not results
        #[arg(short, long)]
        quiet: bool,
    },

    /// Quick insert/get/scan benchmark of the concurrent index
    Bench {
        /// Keys per thread
        #[arg(short, long, default_value_t = 100_000)]
        keys: u64,

        /// Worker threads
        #[arg(short, long, default_value_t = 4)]
        threads: u64,
    },

    /// Walk one node through the whole growth chain and print stats
    StatsDemo {
        /// Print stats as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Shell { format } => shell::run(&format),
        Commands::Exec {
            script,
            format,
            quiet,
        } => exec::run(&script, &format, quiet),
        Commands::Bench { keys, threads } => bench::run(keys, threads),
        Commands::StatsDemo { json } => stats_demo::run(json),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
