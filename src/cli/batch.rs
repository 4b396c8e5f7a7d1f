//! Batch command - score a JSON-Lines stream of messages

use anyhow::{Context, Result};
use console::style;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::info;

use aegis::{analyze_batch, FittedModel, Message};

/// Run the batch command
pub fn run(model: &FittedModel, input: &Path, format: &str) -> Result<()> {
    let messages = if input.as_os_str() == "-" {
        read_messages(std::io::stdin().lock()).context("Failed to read messages from stdin")?
    } else {
        let file = std::fs::File::open(input)
            .with_context(|| format!("Failed to open {}", input.display()))?;
        read_messages(file).with_context(|| format!("Failed to read messages from {}", input.display()))?
    };

    info!("Scoring {} messages", messages.len());
    let results = analyze_batch(model, &messages);

    for (message, result) in messages.iter().zip(&results) {
        if format == "json" {
            println!("{}", serde_json::to_string(result).context("Failed to serialize verdict")?);
        } else {
            println!(
                "{:>3}  {:<8}  {}  {}",
                result.score,
                super::styled_level(result.risk_level),
                style(&message.sender).cyan(),
                style(&message.subject).dim()
            );
        }
    }
    Ok(())
}

/// Parse one message per non-blank line
fn read_messages(reader: impl Read) -> Result<Vec<Message>> {
    let mut messages = Vec::new();
    for (idx, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let message: Message =
            serde_json::from_str(&line).with_context(|| format!("Invalid message on line {}", idx + 1))?;
        messages.push(message);
    }
    Ok(messages)
}
