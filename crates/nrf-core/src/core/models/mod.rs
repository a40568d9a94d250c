//! Data models shared by every stage of the analysis.

pub mod isotope;
pub mod layers;
pub mod line;
pub mod material;
