//! # Core Module
//!
//! Fundamental building blocks of the NRF line analysis.
//!
//! - **Data Models** ([`models`]) - Isotope keys, per-layer values, material entries, and
//!   the per-line physics record
//! - **Physics** ([`physics`]) - Cross-section, Doppler-width, and attenuation formulas plus
//!   the nearest-energy lookup used against tabulated data
//! - **File I/O** ([`io`]) - Readers for the material list, the line database, and the
//!   non-resonant attenuation table

pub mod io;
pub mod models;
pub mod physics;
