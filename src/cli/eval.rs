//! Eval command - cross-validated accuracy on the training corpus

use anyhow::{Context, Result};
use console::style;

use aegis::{evaluate, Corpus, EngineConfig, EvaluationReport};

/// Run the eval command
pub fn run(corpus: &Corpus, config: &EngineConfig, folds: usize, format: &str) -> Result<()> {
    let report = evaluate(corpus, config, folds).context("Cross-validation failed")?;

    if format == "json" {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        print_text(&report);
    }
    Ok(())
}

fn print_text(report: &EvaluationReport) {
    let pct = |v: f64| style(format!("{:.1}%", v * 100.0)).cyan();
    let c = &report.confusion;

    println!("\nAegis Cross-Validation\n");
    println!(
        "  {} examples, {} stratified folds",
        style(report.examples).cyan(),
        style(report.folds).cyan()
    );
    println!();
    println!("  Accuracy:  {}", pct(report.accuracy));
    println!("  Precision: {}", pct(report.precision));
    println!("  Recall:    {}", pct(report.recall));
    println!("  F1:        {}", pct(report.f1));
    println!("  Brier:     {}", style(format!("{:.4}", report.brier)).cyan());
    println!();
    println!("  {}", style("Confusion (flagged = High or Critical)").dim());
    println!(
        "    phishing    flagged {:>4}   missed {:>4}",
        style(c.true_positive).green(),
        style(c.false_negative).red()
    );
    println!(
        "    legitimate  flagged {:>4}   passed {:>4}",
        style(c.false_positive).red(),
        style(c.true_negative).green()
    );
    println!();
}
