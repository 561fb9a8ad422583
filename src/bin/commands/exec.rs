// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Script execution: run a newline-separated command file.

use anyhow::{Context, Result};
use std::path::Path;

use crate::commands::{Output, Session};
use crate::formatters;

pub fn run(script: &Path, format: &str, quiet: bool) -> Result<()> {
    let content = std::fs::read_to_string(script)
        .with_context(|| format!("Failed to read script {}", script.display()))?;

    let mut session = Session::new();

    for (number, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        // Blank lines and comments
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match session.execute(trimmed) {
            Ok(Output::Exit) => break,
            Ok(output) => {
                if !quiet {
                    print!("{}", formatters::format_output(&output, format));
                }
            }
            Err(e) => {
                anyhow::bail!("{}:{}: {}", script.display(), number + 1, e);
            }
        }
    }

    Ok(())
}
