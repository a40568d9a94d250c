//! # Engine Module
//!
//! The analysis pipeline that turns a material configuration and a line database into
//! ranked ambiguous line pairs.
//!
//! - **Configuration** ([`config`]) - Energy windows, neighbour threshold, top-k requests,
//!   and the Doppler model, with validation
//! - **Error Handling** ([`error`]) - Fatal configuration and material errors, recoverable
//!   empty input, and numeric degeneracy
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress reporting
//! - **Ranking** ([`ranking`]) - Top-k selection of classified pairs by minimum counts
//! - **Tasks** ([`tasks`]) - Line selection, count normalization, and pair search

pub mod config;
pub mod error;
pub mod progress;
pub mod ranking;
pub mod tasks;
