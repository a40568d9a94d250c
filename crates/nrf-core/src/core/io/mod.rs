//! Readers for the tabular inputs of an analysis.
//!
//! - [`materials`] - the material list (`Z A n_warhead n_foil t_warhead t_foil`)
//! - [`database`] - the NRF line database (one gamma transition per line)
//! - [`attenuation`] - the `|`-delimited non-resonant attenuation table
//!
//! All readers implement [`traits::DataFile`] and report failures as [`error::InputError`].

pub mod attenuation;
pub mod database;
pub mod error;
pub mod materials;
pub mod traits;
