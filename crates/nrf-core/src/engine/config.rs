use crate::core::physics::doppler::DopplerModel;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const DEFAULT_NEIGHBOUR_THRESHOLD_MEV: f64 = 0.001;
pub const DEFAULT_WINDOW_MIN_MEV: f64 = 0.0;
pub const DEFAULT_WINDOW_MAX_MEV: f64 = 20.0;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Neighbour energy threshold must be positive (got {0} MeV)")]
    NonPositiveThreshold(f64),

    #[error("{name} window is invalid: maximum ({max} MeV) must exceed minimum ({min} MeV) and be positive")]
    InvalidWindow {
        name: &'static str,
        min: f64,
        max: f64,
    },
}

/// Half-open energy interval `[min, max)` in MeV.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyWindow {
    pub min: f64,
    pub max: f64,
}

impl EnergyWindow {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, energy: f64) -> bool {
        energy >= self.min && energy < self.max
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        if self.max > self.min && self.max > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::InvalidWindow {
                name,
                min: self.min,
                max: self.max,
            })
        }
    }
}

impl Default for EnergyWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_MIN_MEV, DEFAULT_WINDOW_MAX_MEV)
    }
}

impl fmt::Display for EnergyWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:6.3} to {:6.3} MeV", self.min, self.max)
    }
}

/// Settings of one analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Largest level-energy separation (MeV) at which two distinct levels are neighbours.
    pub neighbour_threshold: f64,
    /// Accepted gamma energies (detector range).
    pub detector_window: EnergyWindow,
    /// Accepted level energies (photon source range).
    pub source_window: EnergyWindow,
    /// Number of branched pairs to keep; `None` keeps all.
    pub top_branched: Option<usize>,
    /// Number of neighbouring pairs to keep; `None` keeps all.
    pub top_neighbouring: Option<usize>,
    pub doppler_model: DopplerModel,
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.neighbour_threshold.is_nan() || self.neighbour_threshold <= 0.0 {
            return Err(ConfigError::NonPositiveThreshold(self.neighbour_threshold));
        }
        self.detector_window.validate("Detector")?;
        self.source_window.validate("Bremsstrahlung source")?;
        Ok(())
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            neighbour_threshold: DEFAULT_NEIGHBOUR_THRESHOLD_MEV,
            detector_window: EnergyWindow::default(),
            source_window: EnergyWindow::default(),
            top_branched: None,
            top_neighbouring: None,
            doppler_model: DopplerModel::default(),
        }
    }
}

/// Builder for [`AnalysisConfig`]. Unset values take their defaults; `build` validates.
#[derive(Default)]
pub struct AnalysisConfigBuilder {
    neighbour_threshold: Option<f64>,
    detector_window: Option<EnergyWindow>,
    source_window: Option<EnergyWindow>,
    top_branched: Option<usize>,
    top_neighbouring: Option<usize>,
    doppler_model: Option<DopplerModel>,
}

impl AnalysisConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn neighbour_threshold(mut self, threshold: f64) -> Self {
        self.neighbour_threshold = Some(threshold);
        self
    }
    pub fn detector_window(mut self, window: EnergyWindow) -> Self {
        self.detector_window = Some(window);
        self
    }
    pub fn source_window(mut self, window: EnergyWindow) -> Self {
        self.source_window = Some(window);
        self
    }
    pub fn top_branched(mut self, n: Option<usize>) -> Self {
        self.top_branched = n;
        self
    }
    pub fn top_neighbouring(mut self, n: Option<usize>) -> Self {
        self.top_neighbouring = n;
        self
    }
    pub fn doppler_model(mut self, model: DopplerModel) -> Self {
        self.doppler_model = Some(model);
        self
    }

    pub fn build(self) -> Result<AnalysisConfig, ConfigError> {
        let config = AnalysisConfig {
            neighbour_threshold: self
                .neighbour_threshold
                .unwrap_or(DEFAULT_NEIGHBOUR_THRESHOLD_MEV),
            detector_window: self.detector_window.unwrap_or_default(),
            source_window: self.source_window.unwrap_or_default(),
            top_branched: self.top_branched,
            top_neighbouring: self.top_neighbouring,
            doppler_model: self.doppler_model.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}
