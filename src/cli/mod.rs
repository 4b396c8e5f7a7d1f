//! CLI command definitions and handlers

mod batch;
mod eval;
mod inspect;
mod score;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use std::path::{Path, PathBuf};

use aegis::{Corpus, EngineConfig, FittedModel, RiskLevel};

/// Parse and validate sensitivity (0.0-1.0)
fn parse_sensitivity(s: &str) -> Result<f64, String> {
    let v: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if (0.0..=1.0).contains(&v) {
        Ok(v)
    } else {
        Err("sensitivity must be between 0.0 and 1.0".to_string())
    }
}

/// Parse and validate the cross-validation fold count (2-20)
fn parse_folds(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n < 2 {
        Err("folds must be at least 2".to_string())
    } else if n > 20 {
        Err("folds cannot exceed 20".to_string())
    } else {
        Ok(n)
    }
}

/// Aegis - calibrated phishing risk scoring
#[derive(Parser, Debug)]
#[command(name = "aegis")]
#[command(
    version,
    about = "Calibrated phishing risk scoring for email metadata",
    long_about = "Aegis trains a calibrated forest + boosted-trees ensemble on a labelled corpus \
at startup and scores messages by sender, subject and snippet. Scores run 0-100 with \
Low / High / Critical risk levels.",
    after_help = "\
Examples:
  aegis score --sender security@gmail.com --subject 'Unusual sign-in' --snippet 'Verify now'
  aegis batch messages.jsonl --format json     One verdict per input line
  aegis eval --folds 5                         Cross-validate on the corpus
  aegis inspect                                Model summary and vocabulary"
)]
pub struct Cli {
    /// Config file (default: ./aegis.toml, then ~/.config/aegis/config.toml)
    #[arg(long, global = true, env = "AEGIS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Training corpus (.json or .jsonl); defaults to the built-in reference corpus
    #[arg(long, global = true, env = "AEGIS_CORPUS")]
    pub corpus: Option<PathBuf>,

    /// Sensitivity override (0.0-1.0); higher catches more phishing
    #[arg(long, global = true, value_parser = parse_sensitivity)]
    pub sensitivity: Option<f64>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score a single message
    Score {
        /// Sender, e.g. "PayPal <service@paypal.com>"
        #[arg(long, default_value = "")]
        sender: String,

        #[arg(long, default_value = "")]
        subject: String,

        /// Body preview
        #[arg(long, default_value = "")]
        snippet: String,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Score JSON-Lines messages ({"sender", "subject", "snippet"} per line)
    Batch {
        /// Input file, or - for stdin
        #[arg(default_value = "-")]
        input: PathBuf,

        /// Output format: json (one verdict per line), text
        #[arg(long, short = 'f', default_value = "json", value_parser = ["text", "json"])]
        format: String,
    },

    /// Cross-validate the pipeline on the training corpus
    Eval {
        /// Number of stratified folds (2-20)
        #[arg(long, default_value = "5", value_parser = parse_folds)]
        folds: usize,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Show model summary, scoring policy and vocabulary
    Inspect {
        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let corpus = load_corpus(cli.corpus.as_deref())?;

    match cli.command {
        Commands::Score {
            sender,
            subject,
            snippet,
            format,
        } => {
            let model = train_model(&corpus, &config)?;
            score::run(&model, &sender, &subject, &snippet, &format)
        }
        Commands::Batch { input, format } => {
            let model = train_model(&corpus, &config)?;
            batch::run(&model, &input, &format)
        }
        Commands::Eval { folds, format } => eval::run(&corpus, &config, folds, &format),
        Commands::Inspect { format } => {
            let model = train_model(&corpus, &config)?;
            inspect::run(&model, &format)
        }
    }
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = EngineConfig::discover(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(sensitivity) = cli.sensitivity {
        config.calibration.sensitivity = sensitivity;
    }
    Ok(config)
}

fn load_corpus(path: Option<&Path>) -> Result<Corpus> {
    match path {
        Some(path) => Corpus::load(path).with_context(|| format!("Failed to load corpus: {}", path.display())),
        None => Corpus::reference().context("Built-in reference corpus is invalid"),
    }
}

fn train_model(corpus: &Corpus, config: &EngineConfig) -> Result<FittedModel> {
    aegis::train_with_config(corpus, config).context("Failed to train model")
}

/// Risk level colored for the terminal
fn styled_level(level: RiskLevel) -> console::StyledObject<String> {
    let text = level.to_string().to_uppercase();
    match level {
        RiskLevel::Critical => style(text).red().bold(),
        RiskLevel::High => style(text).yellow().bold(),
        RiskLevel::Low => style(text).green(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sensitivity() {
        assert_eq!(parse_sensitivity("0.7"), Ok(0.7));
        assert!(parse_sensitivity("1.5").is_err());
        assert!(parse_sensitivity("high").is_err());
    }

    #[test]
    fn test_parse_folds() {
        assert_eq!(parse_folds("5"), Ok(5));
        assert!(parse_folds("1").is_err());
        assert!(parse_folds("21").is_err());
    }

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "aegis",
            "score",
            "--sender",
            "a@b.com",
            "--sensitivity",
            "0.9",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.sensitivity, Some(0.9));
        match cli.command {
            Commands::Score { sender, format, .. } => {
                assert_eq!(sender, "a@b.com");
                assert_eq!(format, "json");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
