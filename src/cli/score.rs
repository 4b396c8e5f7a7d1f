//! Score command - verdict for a single message

use anyhow::{Context, Result};
use console::style;

use aegis::{analyze, AnalysisResult, FittedModel};

/// Run the score command
pub fn run(model: &FittedModel, sender: &str, subject: &str, snippet: &str, format: &str) -> Result<()> {
    let result = analyze(model, sender, subject, snippet);

    if format == "json" {
        let json = serde_json::to_string_pretty(&result).context("Failed to serialize verdict")?;
        println!("{}", json);
    } else {
        print_text(&result);
    }
    Ok(())
}

fn print_text(result: &AnalysisResult) {
    println!();
    println!(
        "  Risk: {} {}",
        super::styled_level(result.risk_level),
        style(format!("({}/100)", result.score)).bold()
    );
    println!("  {}", result.explanation);

    if let Some(b) = &result.breakdown {
        println!();
        println!(
            "  {} forest {:.3}  boosted {:.3}  ensemble {:.3}  calibrated {:.3}  final {:.3}",
            style("Probabilities:").dim(),
            b.forest,
            b.boosted,
            b.ensemble,
            b.calibrated,
            b.adjusted
        );
    }
    println!();
}
