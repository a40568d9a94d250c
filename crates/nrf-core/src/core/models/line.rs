use super::isotope::IsotopeKey;
use super::layers::{Layer, Layers};
use crate::core::physics::doppler::DopplerModel;
use crate::core::physics::formulas;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Nuclear-structure parameters of one gamma transition, as stored in the line database.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NuclearLine {
    pub isotope: IsotopeKey,
    /// Energy of the resonant level (MeV).
    pub level_energy: f64,
    /// Energy of the emitted gamma (MeV).
    pub gamma_energy: f64,
    /// Total width Γᵣ of the resonant level (MeV).
    pub level_width: f64,
    /// Branching ratio from the level to the observed final state.
    pub branch_to_final: f64,
    /// Branching ratio from the level to the ground state.
    pub branch_to_ground: f64,
    /// Spin J₀ of the ground state.
    pub ground_spin: f64,
    /// Spin Jᵣ of the resonant level.
    pub resonance_spin: f64,
    /// Debye temperature of the host lattice (K).
    pub debye_temperature: f64,
}

impl NuclearLine {
    pub fn statistical_weight(&self) -> f64 {
        formulas::statistical_weight(self.ground_spin, self.resonance_spin)
    }

    /// Interference-strength proxy used when comparing neighbouring lines:
    /// `σ_int(foil) + ln(1 / b_final)`.
    pub fn interference_strength(&self, integrated_foil: f64) -> f64 {
        integrated_foil + (1.0 / self.branch_to_final).ln()
    }
}

/// The material and attenuation context a line is evaluated in.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineEnvironment {
    /// Number density of the line's isotope per layer (×1e-24).
    pub number_density: Layers<f64>,
    /// Layer thicknesses (cm).
    pub thickness: Layers<f64>,
    /// Non-resonant cross section at the level energy, summed over every isotope of
    /// the material list and weighted by their number densities.
    pub non_resonant_level: Layers<f64>,
    /// Same as `non_resonant_level`, at the emitted gamma energy.
    pub non_resonant_gamma: Layers<f64>,
}

/// Quantities derived once from a line's parameters and environment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineQuantities {
    /// Energy-integrated cross section per layer (eV·b, density weighted).
    pub integrated_cross_section: Layers<f64>,
    /// Doppler width Δ (MeV).
    pub doppler_width: f64,
    /// Peak of the Doppler-broadened cross section (b).
    pub doppler_peak_cross_section: f64,
    /// Non-resonant attenuation at the level energy per layer.
    pub non_resonant_level: Layers<f64>,
    /// Non-resonant attenuation at the gamma energy per layer.
    pub non_resonant_gamma: Layers<f64>,
    /// Composite attenuation coefficient α per layer.
    pub alpha: Layers<f64>,
    /// Expected counts for unit incident flux, before normalization.
    pub raw_counts: f64,
}

/// Reason a line's derived quantities cannot be used for ranking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Degeneracy {
    /// α of a layer is zero, negative, or NaN.
    NonPositiveAlpha { layer: Layer },
    /// A derived quantity is infinite or NaN.
    NonFinite { quantity: &'static str },
    /// A cross section or count came out negative.
    Negative { quantity: &'static str },
    /// Counts are exactly zero, e.g. a zero-thickness foil or an opaque warhead.
    ZeroCounts,
}

impl fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degeneracy::NonPositiveAlpha { layer } => write!(f, "non-positive alpha in {}", layer),
            Degeneracy::NonFinite { quantity } => write!(f, "non-finite {}", quantity),
            Degeneracy::Negative { quantity } => write!(f, "negative {}", quantity),
            Degeneracy::ZeroCounts => write!(f, "zero counts"),
        }
    }
}

/// One accepted NRF line together with its physics model.
///
/// Constructed once per accepted database record. The only field that changes
/// afterwards is the count value, which the normalization stage rescales.
#[derive(Debug, Clone, PartialEq)]
pub struct NrfLine {
    index: usize,
    params: NuclearLine,
    environment: LineEnvironment,
    quantities: LineQuantities,
    counts: f64,
    degeneracy: Option<Degeneracy>,
}

impl NrfLine {
    /// Evaluates the line model.
    ///
    /// Never fails. Inputs that drive α to zero or produce non-finite values mark the
    /// line as degenerate instead; see [`NrfLine::degeneracy`].
    pub fn new(
        index: usize,
        params: NuclearLine,
        environment: LineEnvironment,
        doppler: DopplerModel,
    ) -> Self {
        let quantities = compute_quantities(&params, &environment, doppler);
        let degeneracy = check_quantities(&quantities);
        Self {
            index,
            params,
            environment,
            counts: quantities.raw_counts,
            quantities,
            degeneracy,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn isotope(&self) -> IsotopeKey {
        self.params.isotope
    }

    pub fn params(&self) -> &NuclearLine {
        &self.params
    }

    pub fn environment(&self) -> &LineEnvironment {
        &self.environment
    }

    pub fn quantities(&self) -> &LineQuantities {
        &self.quantities
    }

    pub fn level_energy(&self) -> f64 {
        self.params.level_energy
    }

    pub fn gamma_energy(&self) -> f64 {
        self.params.gamma_energy
    }

    pub fn alpha_foil(&self) -> f64 {
        self.quantities.alpha.foil
    }

    pub fn integrated_foil(&self) -> f64 {
        self.quantities.integrated_cross_section.foil
    }

    pub fn interference_strength(&self) -> f64 {
        self.params.interference_strength(self.integrated_foil())
    }

    /// Current count value: raw until normalization, normalized afterwards.
    pub fn counts(&self) -> f64 {
        self.counts
    }

    pub fn degeneracy(&self) -> Option<Degeneracy> {
        self.degeneracy
    }

    pub fn is_valid(&self) -> bool {
        self.degeneracy.is_none()
    }

    pub(crate) fn rescale_counts(&mut self, factor: f64) {
        self.counts = self.quantities.raw_counts * factor;
    }
}

fn compute_quantities(
    params: &NuclearLine,
    env: &LineEnvironment,
    doppler: DopplerModel,
) -> LineQuantities {
    let weight = params.statistical_weight();

    let integrated = formulas::integrated_cross_section(
        params.level_energy,
        params.level_width,
        weight,
        params.branch_to_final,
        params.branch_to_ground,
    );
    let integrated_per_layer = env
        .number_density
        .map(|density| integrated / params.branch_to_final * density);

    let temperature = doppler.temperature(params.debye_temperature);
    let delta = formulas::doppler_width(
        params.level_energy,
        params.isotope.rest_energy_mev(),
        temperature,
    );
    let peak = formulas::doppler_peak_cross_section(
        params.level_energy,
        params.level_width,
        weight,
        params.branch_to_final,
        params.branch_to_ground,
        delta,
    );

    let scale_by_width = |sigma: f64, density: f64| sigma * delta * density;
    let non_resonant_level = env
        .non_resonant_level
        .zip_with(env.number_density, scale_by_width);
    let non_resonant_gamma = env
        .non_resonant_gamma
        .zip_with(env.number_density, scale_by_width);

    // The foil term counts the gamma escaping through the foil in both directions.
    let alpha = Layers::new(
        integrated_per_layer.warhead + non_resonant_level.warhead,
        integrated_per_layer.foil + non_resonant_level.foil + 2.0 * non_resonant_gamma.foil,
    );

    let raw_counts = formulas::expected_counts(
        alpha.warhead,
        env.thickness.warhead,
        alpha.foil,
        env.thickness.foil,
        params.branch_to_final,
        integrated_per_layer.foil,
    );

    LineQuantities {
        integrated_cross_section: integrated_per_layer,
        doppler_width: delta,
        doppler_peak_cross_section: peak,
        non_resonant_level,
        non_resonant_gamma,
        alpha,
        raw_counts,
    }
}

fn check_quantities(q: &LineQuantities) -> Option<Degeneracy> {
    for (layer, &alpha) in q.alpha.iter() {
        if alpha.is_nan() || alpha <= 0.0 {
            return Some(Degeneracy::NonPositiveAlpha { layer });
        }
    }

    let checked = [
        ("warhead alpha", q.alpha.warhead),
        ("foil alpha", q.alpha.foil),
        ("warhead integrated cross section", q.integrated_cross_section.warhead),
        ("foil integrated cross section", q.integrated_cross_section.foil),
        ("Doppler width", q.doppler_width),
        ("Doppler peak cross section", q.doppler_peak_cross_section),
        ("counts", q.raw_counts),
    ];
    for (quantity, value) in checked {
        if !value.is_finite() {
            return Some(Degeneracy::NonFinite { quantity });
        }
        if value < 0.0 {
            return Some(Degeneracy::Negative { quantity });
        }
    }
    if q.raw_counts == 0.0 {
        return Some(Degeneracy::ZeroCounts);
    }
    None
}
