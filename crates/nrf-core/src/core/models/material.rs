use super::isotope::IsotopeKey;
use super::layers::Layers;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// One isotope of interest and its presence in both layers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialEntry {
    pub isotope: IsotopeKey,
    /// Number density per layer, in atoms·cm⁻² × 1e-24 (areal density folded in).
    pub number_density: Layers<f64>,
    /// Layer thickness in cm.
    pub thickness: Layers<f64>,
}

impl MaterialEntry {
    pub fn new(isotope: IsotopeKey, number_density: Layers<f64>, thickness: Layers<f64>) -> Self {
        Self {
            isotope,
            number_density,
            thickness,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MaterialError {
    #[error("material table must contain at least one isotope")]
    Empty,
    #[error("isotope {0} appears more than once in the material table")]
    DuplicateIsotope(IsotopeKey),
    #[error("isotope {isotope} has an invalid {field} value: {value}")]
    InvalidValue {
        isotope: IsotopeKey,
        field: &'static str,
        value: f64,
    },
}

/// The material composition of both layers, keyed by isotope.
///
/// Built once before any line is processed and immutable afterwards. Entries keep
/// the order of the material list so that sums over isotopes are reproducible.
#[derive(Debug, Clone, Default)]
pub struct MaterialContext {
    entries: Vec<MaterialEntry>,
    index: HashMap<IsotopeKey, usize>,
}

impl MaterialContext {
    /// Builds the context, rejecting empty tables, duplicated isotopes, and negative or
    /// non-finite densities and thicknesses.
    pub fn new(entries: Vec<MaterialEntry>) -> Result<Self, MaterialError> {
        if entries.is_empty() {
            return Err(MaterialError::Empty);
        }

        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            check_non_negative(entry.isotope, "warhead number density", entry.number_density.warhead)?;
            check_non_negative(entry.isotope, "foil number density", entry.number_density.foil)?;
            check_non_negative(entry.isotope, "warhead thickness", entry.thickness.warhead)?;
            check_non_negative(entry.isotope, "foil thickness", entry.thickness.foil)?;

            if index.insert(entry.isotope, i).is_some() {
                return Err(MaterialError::DuplicateIsotope(entry.isotope));
            }
        }

        Ok(Self { entries, index })
    }

    pub fn get(&self, isotope: &IsotopeKey) -> Option<&MaterialEntry> {
        self.index.get(isotope).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, isotope: &IsotopeKey) -> bool {
        self.index.contains_key(isotope)
    }

    pub fn entries(&self) -> &[MaterialEntry] {
        &self.entries
    }

    pub fn isotopes(&self) -> impl Iterator<Item = IsotopeKey> + '_ {
        self.entries.iter().map(|e| e.isotope)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn check_non_negative(isotope: IsotopeKey, field: &'static str, value: f64) -> Result<(), MaterialError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(MaterialError::InvalidValue {
            isotope,
            field,
            value,
        })
    }
}
