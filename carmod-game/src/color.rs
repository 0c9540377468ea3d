//! RGBA paint colours
use serde::{Deserialize, Serialize};

/// Linear RGBA colour with components in `0.0..=1.0`.
///
/// A colour with zero alpha is the "unset" sentinel: the vehicle keeps the
/// material colours it was authored with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    /// Sentinel stored in a fresh loadout.
    pub const UNSET: Self = Self::new(1.0, 1.0, 1.0, 0.0);
    /// Colour given to a freshly mounted spoiler when no paint was saved.
    pub const GRAY: Self = Self::new(0.5, 0.5, 0.5, 1.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque colour from RGB components.
    #[must_use]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Returns true when this colour means "use the authored material".
    #[must_use]
    pub fn is_unset(&self) -> bool {
        self.a <= 0.0
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::UNSET
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_alpha_is_unset() {
        assert!(Rgba::UNSET.is_unset());
        assert!(Rgba::new(0.2, 0.4, 0.6, 0.0).is_unset());
        assert!(!Rgba::rgb(0.0, 0.0, 0.0).is_unset());
    }

    #[test]
    fn default_matches_sentinel() {
        assert_eq!(Rgba::default(), Rgba::UNSET);
    }
}
