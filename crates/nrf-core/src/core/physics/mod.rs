//! Closed-form NRF physics and tabulated-data lookup.
//!
//! All energies are in MeV, widths in MeV, temperatures in kelvin. Cross sections carry
//! the scale factors of the line model (eV·b for integrated cross sections, b for peak
//! heights), and number densities are expected with the 1e-24 factor already applied.

pub mod doppler;
pub mod formulas;
pub mod lookup;
