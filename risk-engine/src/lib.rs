//! Tahseen Risk Engine
//!
//! Heuristic fraud-risk scoring for manually entered card transactions.
//!
//! A [`RiskScorer`] combines six per-feature heuristics (card number, amount,
//! time of day, city population, postal code, account number) into a score,
//! adds a bounded random jitter and classifies the transaction as
//! [`Classification::Legitimate`] or [`Classification::Fraudulent`].
//!
//! # Invariants
//!
//! - Every absent feature contributes a fixed neutral amount
//! - Every non-blank value is scoreable; unreadable numbers take the
//!   fallback branch of their heuristic
//! - Confidence is in `[65, 95]` on success and exactly `0` on error
//! - Randomness only ever adds to the score, never subtracts

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod features;
pub mod random;
pub mod scoring;
pub mod types;

pub use config::ScoringConfig;
pub use error::{Error, Result};
pub use features::{Feature, RawFeatures, RawValue, Reading, TransactionFeatures};
pub use random::{SequenceSource, UniformSource};
pub use scoring::RiskScorer;
pub use types::*;
