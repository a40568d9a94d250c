//! # Workflows Module
//!
//! Top-level entry points of the library. A workflow takes the parsed inputs of one
//! material configuration, runs the engine stages in order, reports progress, and
//! returns a self-contained result.
//!
//! - **Analysis Workflow** ([`analyze`]) - Line selection, count normalization, pair
//!   classification, and top-k ranking of branched and neighbouring pairs.

pub mod analyze;
