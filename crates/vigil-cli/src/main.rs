//! Vigil - safety content-analysis pipeline CLI.
//!
//! Thin operator surface over the pipeline: moderation, blocklist checks,
//! corpus scans, severity classification, suggestion mining, and keyword
//! administration. All state lives in the SQLite database.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vigil_core::blocklist::BlocklistFilter;
use vigil_core::classifier::{
    ExternalClassifierConfig, ExternalSeverityClassifier, FallbackSeverityClassifier,
};
use vigil_core::miner::{SuggestionMiner, DEFAULT_WINDOW_DAYS};
use vigil_core::models::{KeywordCategory, NewKeyword, Severity};
use vigil_core::moderation::ModerationGate;
use vigil_core::scanner::KeywordScanner;
use vigil_storage::Database;

/// Vigil - safety content-analysis pipeline
#[derive(Parser, Debug)]
#[command(name = "vigil", version, about)]
struct Args {
    /// Database path (defaults to the app data directory)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the pre-send moderation gate over a message
    Moderate {
        /// Message text
        text: String,
    },
    /// Check a message against the static blocklist
    Filter {
        /// Message text
        text: String,
    },
    /// Scan a persisted message against the keyword corpus
    Scan {
        /// Message identifier (for the audit log)
        message_id: String,
        /// Message text
        text: String,
    },
    /// Classify safety-report text into a severity tier
    Classify {
        /// Report text
        text: String,
        /// Prefer the external model (VIGIL_API_KEY), falling back to rules
        #[arg(long)]
        external: bool,
    },
    /// Mine the message history for new keyword suggestions
    Mine {
        /// Days of history to mine
        #[arg(long, default_value_t = DEFAULT_WINDOW_DAYS)]
        days: i64,
    },
    /// Manage the keyword corpus
    Keyword {
        #[command(subcommand)]
        action: KeywordAction,
    },
    /// Review pending suggestions
    Suggestions {
        #[command(subcommand)]
        action: SuggestionAction,
    },
    /// Show corpus dashboard statistics
    Stats,
    /// Record a message into the mining corpus
    ImportMessage {
        /// Message identifier
        id: String,
        /// Message text
        text: String,
    },
}

#[derive(Subcommand, Debug)]
enum KeywordAction {
    /// Add a keyword
    Add {
        /// The phrase to match
        phrase: String,
        /// Category (e.g. financial_exploitation)
        #[arg(long, default_value = "inappropriate_content")]
        category: String,
        /// Severity (low, medium, high, critical)
        #[arg(long, default_value = "medium")]
        severity: String,
    },
    /// List keywords
    List {
        /// Include soft-deleted keywords
        #[arg(long)]
        all: bool,
    },
    /// Soft-delete a keyword, keeping its detection history
    Disable {
        /// Keyword id
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
enum SuggestionAction {
    /// List pending suggestions
    List,
    /// Accept a suggestion
    Accept {
        /// Suggestion id
        id: i64,
        /// Also promote it into the keyword corpus
        #[arg(long)]
        promote: bool,
    },
    /// Reject a suggestion
    Reject {
        /// Suggestion id
        id: i64,
    },
}

fn init_logging(log_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vigil={log_level},warn")));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

fn open_database(path: Option<PathBuf>) -> Result<Database> {
    let db = match path {
        Some(path) => Database::with_path(path)?,
        None => Database::new()?,
    };
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    match args.command {
        Command::Moderate { text } => {
            let gate = ModerationGate::new();
            let result = gate.moderate_message(&text, "cli", "cli", "cli");
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Filter { text } => {
            let filter = BlocklistFilter::new();
            let decision = filter.filter_message(&text);
            println!("{}", serde_json::to_string_pretty(&decision)?);
        }
        Command::Scan { message_id, text } => {
            let db = open_database(args.db)?;
            let scanner = KeywordScanner::new(Arc::new(db.clone()), Arc::new(db));
            let outcome = scanner
                .scan_message(&message_id, &text)
                .map_err(|err| anyhow!("scan failed: {err}"))?;

            if outcome.has_critical() {
                tracing::warn!(message_id, "critical keyword detected");
            }
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::Classify { text, external } => {
            let classifier = if external {
                let config = ExternalClassifierConfig {
                    api_key: std::env::var("VIGIL_API_KEY").ok(),
                    ..Default::default()
                };
                FallbackSeverityClassifier::with_external(Arc::new(
                    ExternalSeverityClassifier::new(config),
                ))
            } else {
                FallbackSeverityClassifier::rule_only()
            };

            let severity = classifier.classify(&text).await;
            println!("{}", severity.name());
        }
        Command::Mine { days } => {
            let db = open_database(args.db)?;
            let miner = SuggestionMiner::new(
                Arc::new(db.clone()),
                Arc::new(db.clone()),
                Arc::new(db),
            );
            let generated = miner
                .run_suggestion_generation(days)
                .map_err(|err| anyhow!("mining failed: {err}"))?;
            println!("generated {generated} suggestion(s) from the last {days} days");
        }
        Command::Keyword { action } => {
            let db = open_database(args.db)?;
            run_keyword_action(&db, action)?;
        }
        Command::Suggestions { action } => {
            let db = open_database(args.db)?;
            run_suggestion_action(&db, action)?;
        }
        Command::Stats => {
            let db = open_database(args.db)?;
            let stats = db.corpus_stats()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::ImportMessage { id, text } => {
            let db = open_database(args.db)?;
            db.record_message(&id, &text, Utc::now())?;
            println!("recorded message {id}");
        }
    }

    Ok(())
}

fn run_keyword_action(db: &Database, action: KeywordAction) -> Result<()> {
    match action {
        KeywordAction::Add {
            phrase,
            category,
            severity,
        } => {
            let category = KeywordCategory::parse(&category)
                .ok_or_else(|| anyhow!("unknown category: {category}"))?;
            let severity = Severity::parse(&severity)
                .ok_or_else(|| anyhow!("unknown severity: {severity}"))?;

            let id = db
                .add_keyword(NewKeyword {
                    phrase,
                    category,
                    severity,
                })
                .context("adding keyword")?;
            println!("added keyword {id}");
        }
        KeywordAction::List { all } => {
            let keywords = if all {
                db.all_keywords()?
            } else {
                db.active_keywords()?
            };
            for keyword in keywords {
                println!(
                    "{:>4}  {:<30}  {:<22}  {:<8}  {}",
                    keyword.id,
                    keyword.phrase,
                    keyword.category.name(),
                    keyword.severity.name(),
                    if keyword.active { "active" } else { "disabled" },
                );
            }
        }
        KeywordAction::Disable { id } => {
            db.deactivate_keyword(id).context("disabling keyword")?;
            println!("disabled keyword {id}");
        }
    }
    Ok(())
}

fn run_suggestion_action(db: &Database, action: SuggestionAction) -> Result<()> {
    match action {
        SuggestionAction::List => {
            for suggestion in db.pending_suggestions()? {
                println!(
                    "{:>4}  {:<30}  {:<22}  {:<8}  seen {}x",
                    suggestion.id,
                    suggestion.phrase,
                    suggestion.category.name(),
                    suggestion.severity.name(),
                    suggestion.detection_count,
                );
            }
        }
        SuggestionAction::Accept { id, promote } => {
            match db.accept_suggestion(id, promote).context("accepting suggestion")? {
                Some(keyword_id) => println!("accepted suggestion {id}, keyword {keyword_id}"),
                None => println!("accepted suggestion {id}"),
            }
        }
        SuggestionAction::Reject { id } => {
            db.reject_suggestion(id).context("rejecting suggestion")?;
            println!("rejected suggestion {id}");
        }
    }
    Ok(())
}
