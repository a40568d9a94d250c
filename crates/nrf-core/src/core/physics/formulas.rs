use std::f64::consts::PI;

pub const HBAR_C_MEV_M: f64 = 197.327e-15; // MeV·m
pub const ATOMIC_MASS_UNIT_MEV: f64 = 931.454; // MeV
pub const BOLTZMANN_MEV_PER_K: f64 = 8.6173e-11; // MeV/K
pub const ROOM_TEMPERATURE_K: f64 = 300.0;

// m² -> b, with the MeV -> eV conversion of the width folded in (1e28 · 1e6).
const INTEGRATED_XS_SCALE: f64 = 1.0e34;
// m² -> b.
const PEAK_XS_SCALE: f64 = 1.0e28;

#[inline]
pub fn statistical_weight(ground_spin: f64, resonance_spin: f64) -> f64 {
    (2.0 * resonance_spin + 1.0) / (2.0 * (2.0 * ground_spin + 1.0))
}

/// Energy-integrated NRF cross section in eV·b.
///
/// `level_width` is in MeV; the result already includes both branching ratios.
#[inline]
pub fn integrated_cross_section(
    level_energy: f64,
    level_width: f64,
    weight: f64,
    branch_to_final: f64,
    branch_to_ground: f64,
) -> f64 {
    let reduced_wavelength = HBAR_C_MEV_M / level_energy;
    INTEGRATED_XS_SCALE
        * 2.0
        * PI.powi(2)
        * weight
        * reduced_wavelength.powi(2)
        * level_width
        * branch_to_final
        * branch_to_ground
}

/// Doppler width Δ (MeV) of a level at `temperature` for a nucleus of rest energy
/// `rest_energy` (MeV).
#[inline]
pub fn doppler_width(level_energy: f64, rest_energy: f64, temperature: f64) -> f64 {
    level_energy * (2.0 * BOLTZMANN_MEV_PER_K * temperature / rest_energy).sqrt()
}

/// Peak height (b) of the Doppler-broadened resonance.
#[inline]
pub fn doppler_peak_cross_section(
    level_energy: f64,
    level_width: f64,
    weight: f64,
    branch_to_final: f64,
    branch_to_ground: f64,
    doppler_width: f64,
) -> f64 {
    let reduced_wavelength = HBAR_C_MEV_M / level_energy;
    PEAK_XS_SCALE
        * 2.0
        * PI.powf(1.5)
        * weight
        * reduced_wavelength.powi(2)
        * branch_to_final
        * branch_to_ground
        * level_width
        / doppler_width
}

/// Relative NRF count for unit incident flux: attenuation through the warhead,
/// resonant production in the foil, and self-absorbed escape from the foil.
#[inline]
pub fn expected_counts(
    alpha_warhead: f64,
    thickness_warhead: f64,
    alpha_foil: f64,
    thickness_foil: f64,
    branch_to_final: f64,
    integrated_foil: f64,
) -> f64 {
    (-alpha_warhead * thickness_warhead).exp() * branch_to_final * integrated_foil / alpha_foil
        * (1.0 - (-alpha_foil * thickness_foil).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn relative_eq(a: f64, b: f64) -> bool {
        ((a - b) / b).abs() < TOLERANCE
    }

    #[test]
    fn statistical_weight_for_zero_to_one_transition() {
        assert!(relative_eq(statistical_weight(0.0, 1.0), 1.5));
    }

    #[test]
    fn statistical_weight_for_equal_spins() {
        assert!(relative_eq(statistical_weight(1.5, 1.5), 0.5));
    }

    #[test]
    fn integrated_cross_section_matches_closed_form() {
        let e: f64 = 2.0;
        let width = 1.0e-6;
        let g = 1.5;
        let expected = 1.0e34 * 2.0 * PI * PI * g * (197.327e-15 / e).powi(2) * width * 0.4 * 0.6;
        let actual = integrated_cross_section(e, width, g, 0.4, 0.6);
        assert!(relative_eq(actual, expected));
    }

    #[test]
    fn integrated_cross_section_falls_with_square_of_energy() {
        let low = integrated_cross_section(1.0, 1.0e-6, 1.0, 1.0, 1.0);
        let high = integrated_cross_section(2.0, 1.0e-6, 1.0, 1.0, 1.0);
        assert!(relative_eq(low / high, 4.0));
    }

    #[test]
    fn doppler_width_for_uranium_at_room_temperature() {
        let rest = 238.0 * ATOMIC_MASS_UNIT_MEV;
        let delta = doppler_width(2.0, rest, ROOM_TEMPERATURE_K);
        let expected = 2.0 * (2.0 * 8.6173e-11 * 300.0 / rest).sqrt();
        assert!(relative_eq(delta, expected));
        assert!(delta > 5.0e-7 && delta < 1.5e-6);
    }

    #[test]
    fn doppler_peak_is_inversely_proportional_to_width() {
        let narrow = doppler_peak_cross_section(2.0, 1.0e-6, 1.0, 1.0, 1.0, 1.0e-6);
        let wide = doppler_peak_cross_section(2.0, 1.0e-6, 1.0, 1.0, 1.0, 2.0e-6);
        assert!(relative_eq(narrow / wide, 2.0));
    }

    #[test]
    fn expected_counts_without_warhead_is_thick_target_limit() {
        let counts = expected_counts(0.0, 0.0, 2.0, 1.0e6, 0.5, 10.0);
        assert!(relative_eq(counts, 0.5 * 10.0 / 2.0));
    }

    #[test]
    fn expected_counts_decay_with_warhead_thickness() {
        let thin = expected_counts(1.0, 0.5, 2.0, 1.0, 1.0, 1.0);
        let thick = expected_counts(1.0, 1.5, 2.0, 1.0, 1.0, 1.0);
        assert!(relative_eq(thin / thick, 1.0_f64.exp()));
    }
}
