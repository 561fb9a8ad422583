// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Interactive shell (REPL) implementation.

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::commands::{Output, Session};
use crate::formatters;

pub fn run(format: &str) -> Result<()> {
    let mut session = Session::new();
    let mut format = format.to_string();

    println!("ReedART Shell v0.1.0");
    println!("In-memory index; contents are discarded on exit.");
    println!("Type .help for help, .exit to quit\n");

    let mut rl = DefaultEditor::new()?;

    loop {
        let readline = rl.readline("reedart> ");

        match readline {
            Ok(line) => {
                let trimmed = line.trim();

                if trimmed.is_empty() {
                    continue;
                }

                // Add to history
                let _ = rl.add_history_entry(trimmed);

                // Handle dot-commands that configure the shell itself
                if trimmed == ".help" {
                    print_help();
                    continue;
                }
                if let Some(fmt) = trimmed.strip_prefix(".format") {
                    let fmt = fmt.trim();
                    match fmt {
                        "table" | "json" | "csv" => {
                            format = fmt.to_string();
                            println!("Output format: {}", format);
                        }
                        _ => eprintln!("Error: unknown format '{}' (table|json|csv)", fmt),
                    }
                    continue;
                }

                match session.execute(trimmed) {
                    Ok(Output::Exit) => {
                        println!("Goodbye!");
                        break;
                    }
                    Ok(output) => print!("{}", formatters::format_output(&output, &format)),
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  put <key> <value>   Insert an entry");
    println!("  get <key>           Look up a key");
    println!("  del <key>           Remove a key");
    println!("  scan [n]            First n entries ascending (default all)");
    println!("  rscan [n]           First n entries descending");
    println!("  range <from> <to>   Half-open range scan");
    println!("  count               Number of entries");
    println!("  stats               Tree structure counters");
    println!("  dump                Tree structure dump");
    println!("  clear               Remove everything");
    println!("Special commands:");
    println!("  .format table|json|csv   Switch output format");
    println!("  .help                    This help");
    println!("  .exit                    Quit");
    println!("Keys: decimal u64 literals or \"quoted strings\".");
}
