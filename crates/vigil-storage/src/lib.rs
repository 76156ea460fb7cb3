//! Vigil Storage - SQLite persistence layer.
//!
//! This crate backs the pipeline's store traits with SQLite. It handles:
//!
//! - The keyword corpus (soft-deleted, never hard-deleted)
//! - The append-only detection audit log
//! - The suggestion review queue
//! - The message corpus read by the suggestion miner
//! - Aggregate dashboard statistics
//!
//! # Example
//!
//! ```no_run
//! use vigil_core::models::{KeywordCategory, NewKeyword, Severity};
//! use vigil_storage::Database;
//!
//! let db = Database::in_memory().unwrap();
//!
//! db.add_keyword(NewKeyword {
//!     phrase: "bank account".to_string(),
//!     category: KeywordCategory::FinancialExploitation,
//!     severity: Severity::Critical,
//! })
//! .unwrap();
//!
//! let stats = db.corpus_stats().unwrap();
//! assert_eq!(stats.active_keywords, 1);
//! ```

mod database;
pub mod error;
mod pool;
pub mod repository;
mod schema;
mod stores;

pub use database::{CorpusStats, Database};
pub use error::{Result, StorageError};
pub use pool::ConnectionPool;
