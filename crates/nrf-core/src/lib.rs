//! # NRF Pairs Core Library
//!
//! Physics model and exhaustive pair search for Nuclear Resonance Fluorescence (NRF)
//! gamma-ray lines in a two-layer ("warhead" and "foil") geometry.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture so that each stage of the analysis
//! can be tested in isolation.
//!
//! - **[`core`]: The Foundation.** Immutable data models (`IsotopeKey`, `MaterialContext`,
//!   `NrfLine`), the closed-form physics formulas, and readers for the tabular inputs
//!   (material list, line database, non-resonant attenuation table).
//!
//! - **[`engine`]: The Logic Core.** Configuration, error taxonomy, progress reporting,
//!   and the pipeline stages: line selection, count normalization, pair classification,
//!   and top-k ranking.
//!
//! - **[`workflows`]: The Public API.** Ties the stages together into a single batch
//!   analysis for one material configuration.

pub mod core;
pub mod engine;
pub mod workflows;
