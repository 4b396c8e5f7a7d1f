//! Inspect command - model summary, scoring policy and vocabulary

use anyhow::{Context, Result};
use console::style;

use aegis::classifier::FEATURE_NAMES;
use aegis::FittedModel;

/// Run the inspect command
pub fn run(model: &FittedModel, format: &str) -> Result<()> {
    let info = model.info();
    let policy = model.policy();

    if format == "json" {
        let doc = serde_json::json!({
            "model": info,
            "features": FEATURE_NAMES,
            "policy": policy,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&doc).context("Failed to serialize model summary")?
        );
        return Ok(());
    }

    println!("\nAegis Model\n");
    println!("  Corpus: {}", style(&info.corpus_fingerprint).dim());
    println!(
        "      {} examples ({} phishing, {} legitimate)",
        style(info.examples).cyan(),
        style(info.phishing).cyan(),
        style(info.legitimate).cyan()
    );
    println!(
        "  Features: {} engineered + {} text",
        style(info.engineered_features).cyan(),
        style(info.text_features).cyan()
    );
    println!(
        "  Training accuracy: {}",
        style(format!("{:.1}%", info.training_accuracy * 100.0)).cyan()
    );
    println!();

    let e = &info.ensemble;
    println!("  {}", style("Ensemble").bold());
    println!(
        "    {} calibration folds, blend {:.0}% boosted / {:.0}% forest",
        e.calibration_folds,
        e.boosted_weight * 100.0,
        e.forest_weight * 100.0
    );
    println!(
        "    forest: {} trees per fold, deepest tree {}",
        e.forest_trees, e.forest_max_depth
    );
    println!("    boosted: {} iterations per fold", e.boosting_iterations);
    println!(
        "    isotonic knots: forest {:?}, boosted {:?}",
        e.forest_knots, e.boosted_knots
    );
    println!();

    let (low, high) = policy.calibrator.range();
    println!("  {}", style("Scoring policy").bold());
    println!(
        "    sensitivity {:.2}, output range [{:.3}, {:.3}]",
        policy.calibrator.sensitivity, low, high
    );
    println!(
        "    High from {:.2}, Critical from {:.2}",
        policy.thresholds.high, policy.thresholds.critical
    );
    println!("    failure mode: {}", policy.failure_mode);
    println!();

    println!("  {}", style("Vocabulary").bold());
    for term in &info.vocabulary {
        let idf = model.vectorizer().idf(term).unwrap_or(0.0);
        println!("    {:<28} {}", term, style(format!("idf {:.3}", idf)).dim());
    }
    println!();
    Ok(())
}
