//! Stages of the analysis pipeline, run in order by [`crate::workflows::analyze`].

pub mod line_selection;
pub mod normalization;
pub mod pair_search;
