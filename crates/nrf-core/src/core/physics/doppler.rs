use super::formulas::ROOM_TEMPERATURE_K;
use serde::{Deserialize, Serialize};

const SIMPSON_INTERVALS: usize = 256;

/// Selects the temperature used for Doppler broadening of a resonance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DopplerModel {
    /// Free-gas broadening at a fixed 300 K. The Debye temperature of the line is ignored.
    #[default]
    RoomTemperature,
    /// Free-gas broadening at the effective temperature of a Debye solid held at 300 K.
    EffectiveTemperature,
}

impl DopplerModel {
    /// Temperature (K) entering the Doppler width for a lattice with the given Debye
    /// temperature.
    pub fn temperature(&self, debye_temperature: f64) -> f64 {
        match self {
            DopplerModel::RoomTemperature => ROOM_TEMPERATURE_K,
            DopplerModel::EffectiveTemperature => {
                effective_temperature(ROOM_TEMPERATURE_K, debye_temperature)
            }
        }
    }
}

/// Lamb's effective temperature of a Debye solid:
///
/// `T_eff = 3 T (T/θ)³ ∫₀^{θ/T} x³ (1/2 + 1/(eˣ - 1)) dx`
///
/// A non-positive or non-finite Debye temperature returns `temperature` unchanged,
/// which is also the `θ → 0` limit.
pub fn effective_temperature(temperature: f64, debye_temperature: f64) -> f64 {
    if !(debye_temperature.is_finite() && debye_temperature > 0.0) || temperature <= 0.0 {
        return temperature;
    }

    let upper = debye_temperature / temperature;
    let integral = simpson(debye_integrand, 0.0, upper, SIMPSON_INTERVALS);
    3.0 * temperature * (temperature / debye_temperature).powi(3) * integral
}

#[inline]
fn debye_integrand(x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    x.powi(3) * (0.5 + 1.0 / x.exp_m1())
}

fn simpson<F>(f: F, a: f64, b: f64, intervals: usize) -> f64
where
    F: Fn(f64) -> f64,
{
    let n = if intervals % 2 == 0 { intervals } else { intervals + 1 };
    let h = (b - a) / n as f64;
    let interior: f64 = (1..n)
        .map(|i| {
            let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
            weight * f(a + i as f64 * h)
        })
        .sum();
    h / 3.0 * (f(a) + interior + f(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_temperature_model_ignores_debye_temperature() {
        let model = DopplerModel::RoomTemperature;
        assert_eq!(model.temperature(0.0), 300.0);
        assert_eq!(model.temperature(420.0), 300.0);
    }

    #[test]
    fn effective_temperature_falls_back_for_missing_debye_temperature() {
        assert_eq!(effective_temperature(300.0, 0.0), 300.0);
        assert_eq!(effective_temperature(300.0, f64::NAN), 300.0);
        assert_eq!(effective_temperature(300.0, -5.0), 300.0);
    }

    #[test]
    fn effective_temperature_approaches_temperature_for_soft_lattice() {
        let t_eff = effective_temperature(300.0, 1.0);
        assert!((t_eff - 300.0).abs() / 300.0 < 1e-3);
    }

    #[test]
    fn effective_temperature_exceeds_temperature_for_stiff_lattice() {
        let soft = effective_temperature(300.0, 100.0);
        let stiff = effective_temperature(300.0, 1000.0);
        assert!(soft >= 300.0);
        assert!(stiff > soft);
    }

    #[test]
    fn effective_temperature_reaches_zero_point_limit_when_cold() {
        // For T << θ the zero-point term dominates: T_eff -> 3θ/8.
        let t_eff = effective_temperature(1.0, 400.0);
        assert!((t_eff - 150.0).abs() / 150.0 < 1e-2);
    }

    #[test]
    fn simpson_integrates_cubic_exactly() {
        let integral = simpson(|x| x.powi(3), 0.0, 2.0, 10);
        assert!((integral - 4.0).abs() < 1e-12);
    }
}
