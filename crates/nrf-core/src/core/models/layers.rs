use serde::{Deserialize, Serialize};
use std::fmt;

/// The two slabs of the modelled geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// The interrogated object, traversed first by the incident flux.
    Warhead,
    /// The resonant scattering reference in which NRF is detected.
    Foil,
}

impl Layer {
    pub const ALL: [Layer; 2] = [Layer::Warhead, Layer::Foil];
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Warhead => f.write_str("warhead"),
            Layer::Foil => f.write_str("foil"),
        }
    }
}

/// A value held once per layer.
///
/// Used for number densities, thicknesses, cross sections, and attenuation
/// coefficients, all of which come as a `[warhead, foil]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Layers<T> {
    pub warhead: T,
    pub foil: T,
}

impl<T> Layers<T> {
    pub const fn new(warhead: T, foil: T) -> Self {
        Self { warhead, foil }
    }

    pub fn get(&self, layer: Layer) -> &T {
        match layer {
            Layer::Warhead => &self.warhead,
            Layer::Foil => &self.foil,
        }
    }

    pub fn map<U, F>(self, mut f: F) -> Layers<U>
    where
        F: FnMut(T) -> U,
    {
        Layers {
            warhead: f(self.warhead),
            foil: f(self.foil),
        }
    }

    pub fn zip_with<U, V, F>(self, other: Layers<U>, mut f: F) -> Layers<V>
    where
        F: FnMut(T, U) -> V,
    {
        Layers {
            warhead: f(self.warhead, other.warhead),
            foil: f(self.foil, other.foil),
        }
    }

    /// Iterates as `(layer, value)` in warhead, foil order.
    pub fn iter(&self) -> impl Iterator<Item = (Layer, &T)> {
        Layer::ALL.into_iter().map(move |layer| (layer, self.get(layer)))
    }
}

impl Layers<f64> {
    pub fn splat(value: f64) -> Self {
        Self::new(value, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_returns_value_for_requested_layer() {
        let layers = Layers::new(1.0, 2.0);
        assert_eq!(*layers.get(Layer::Warhead), 1.0);
        assert_eq!(*layers.get(Layer::Foil), 2.0);
    }

    #[test]
    fn zip_with_combines_matching_layers() {
        let a = Layers::new(2.0, 3.0);
        let b = Layers::new(5.0, 7.0);
        assert_eq!(a.zip_with(b, |x, y| x * y), Layers::new(10.0, 21.0));
    }

    #[test]
    fn iter_visits_warhead_before_foil() {
        let layers = Layers::new("w", "f");
        let order: Vec<_> = layers.iter().map(|(layer, v)| (layer, *v)).collect();
        assert_eq!(order, vec![(Layer::Warhead, "w"), (Layer::Foil, "f")]);
    }
}
