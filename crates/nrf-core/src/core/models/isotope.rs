use crate::core::physics::formulas::ATOMIC_MASS_UNIT_MEV;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a nuclide by its atomic number `Z` and mass number `A`.
///
/// The key is the join between the line database and the material table: every
/// accepted line must reference an isotope that has exactly one material entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IsotopeKey {
    /// Atomic number (proton count).
    pub z: u32,
    /// Mass number (nucleon count).
    pub a: u32,
}

impl IsotopeKey {
    pub const fn new(z: u32, a: u32) -> Self {
        Self { z, a }
    }

    /// Rest energy of the nucleus in MeV, taken as `A` atomic mass units.
    pub fn rest_energy_mev(&self) -> f64 {
        self.a as f64 * ATOMIC_MASS_UNIT_MEV
    }
}

impl fmt::Display for IsotopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:>3}, {:>3}]", self.z, self.a)
    }
}

impl From<(u32, u32)> for IsotopeKey {
    fn from((z, a): (u32, u32)) -> Self {
        Self::new(z, a)
    }
}
