//! Persisted customization record
use serde::{Deserialize, Serialize};

use crate::color::Rgba;

/// Highest level any upgrade axis can reach.
pub const MAX_LEVEL: u8 = 5;

/// Index value meaning "nothing selected" for spoilers, sirens, and wheels.
pub const NO_SELECTION: i32 = -1;

/// Customization state of one vehicle, stored under its save key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loadout {
    #[serde(default)]
    pub paint: Rgba,
    #[serde(default = "Loadout::no_selection")]
    pub spoiler: i32,
    #[serde(default = "Loadout::no_selection")]
    pub siren: i32,
    #[serde(default = "Loadout::no_selection")]
    pub wheel: i32,
    #[serde(default)]
    pub engine_level: u8,
    #[serde(default)]
    pub brake_level: u8,
    #[serde(default)]
    pub handling_level: u8,
}

impl Default for Loadout {
    fn default() -> Self {
        Self {
            paint: Rgba::UNSET,
            spoiler: NO_SELECTION,
            siren: NO_SELECTION,
            wheel: NO_SELECTION,
            engine_level: 0,
            brake_level: 0,
            handling_level: 0,
        }
    }
}

impl Loadout {
    const fn no_selection() -> i32 {
        NO_SELECTION
    }

    /// Serialize to the string form kept in a store.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be encoded as JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a stored string, clamping any level above [`MAX_LEVEL`] and
    /// folding negative indices other than `-1` back to "none".
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid loadout document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let loadout: Self = serde_json::from_str(json)?;
        Ok(loadout.sanitized())
    }

    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.engine_level = self.engine_level.min(MAX_LEVEL);
        self.brake_level = self.brake_level.min(MAX_LEVEL);
        self.handling_level = self.handling_level.min(MAX_LEVEL);
        for index in [&mut self.spoiler, &mut self.siren, &mut self.wheel] {
            if *index < NO_SELECTION {
                *index = NO_SELECTION;
            }
        }
        self
    }

    #[must_use]
    pub fn has_paint(&self) -> bool {
        !self.paint.is_unset()
    }
}

/// Convert a stored slot index into a vector position.
#[must_use]
pub fn selection_to_position(index: i32) -> Option<usize> {
    usize::try_from(index).ok()
}
