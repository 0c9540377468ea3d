//! Wheel swaps from the shared catalog
use std::rc::Rc;

use crate::catalog::WheelCatalog;
use crate::error::CustomizationError;
use crate::loadout::{Loadout, NO_SELECTION, selection_to_position};
use crate::vehicle::VehicleRig;

#[derive(Debug, Clone, PartialEq)]
pub struct WheelManager {
    catalog: Rc<WheelCatalog>,
    apply_radius: bool,
    selected: i32,
}

impl WheelManager {
    #[must_use]
    pub const fn new(catalog: Rc<WheelCatalog>, apply_radius: bool) -> Self {
        Self {
            catalog,
            apply_radius,
            selected: NO_SELECTION,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &WheelCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn selected(&self) -> i32 {
        self.selected
    }

    /// Mount the saved wheel, if any. Stock wheels stay when nothing was saved.
    pub fn initialize(&mut self, loadout: &Loadout, rig: &mut dyn VehicleRig) {
        if loadout.wheel == NO_SELECTION {
            return;
        }
        match self.position(loadout.wheel) {
            Ok(position) => self.mount(loadout.wheel, position, rig),
            Err(err) => log::warn!("ignoring saved wheel on '{}': {err}", rig.name()),
        }
    }

    /// Swap to catalog wheel `index`, or back to stock with `-1`, and record it.
    ///
    /// # Errors
    ///
    /// Returns [`CustomizationError::InvalidIndex`] when `index` is outside the catalog.
    pub fn update_wheel(
        &mut self,
        index: i32,
        rig: &mut dyn VehicleRig,
        loadout: &mut Loadout,
    ) -> Result<(), CustomizationError> {
        let position = self.position(index)?;
        loadout.wheel = index;
        self.mount(index, position, rig);
        Ok(())
    }

    fn position(&self, index: i32) -> Result<Option<usize>, CustomizationError> {
        if index == NO_SELECTION {
            return Ok(None);
        }
        match selection_to_position(index) {
            Some(pos) if pos < self.catalog.len() => Ok(Some(pos)),
            _ => Err(CustomizationError::InvalidIndex {
                slot: "wheel",
                index,
                len: self.catalog.len(),
            }),
        }
    }

    fn mount(&mut self, index: i32, position: Option<usize>, rig: &mut dyn VehicleRig) {
        let part = position.and_then(|pos| self.catalog.get(pos));
        rig.mount_wheels(part, self.apply_radius);
        self.selected = index;
    }
}
