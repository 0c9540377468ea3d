//! Spoilers
use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::error::CustomizationError;
use crate::loadout::Loadout;
use crate::paint::BodyColorFollower;
use crate::slot::VariantSet;
use crate::vehicle::{SurfaceId, VehicleRig};

/// Paint target of a spoiler model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpoilerPart {
    pub surface: Option<SurfaceId>,
    /// Material to tint; `None` leaves the spoiler unpainted.
    pub material: Option<usize>,
}

impl SpoilerPart {
    fn tint(&self, color: Rgba, rig: &mut dyn VehicleRig) -> bool {
        let Some(material) = self.material else {
            return false;
        };
        let Some(surface) = self.surface else {
            log::error!("body renderer of this spoiler is not selected");
            return false;
        };
        rig.set_material_color(surface, material, color)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpoilerManager {
    spoilers: VariantSet<SpoilerPart>,
    paint_with_body: bool,
}

impl SpoilerManager {
    pub fn new(
        spoilers: impl IntoIterator<Item = (String, SpoilerPart)>,
        paint_with_body: bool,
    ) -> Self {
        Self {
            spoilers: VariantSet::new("spoiler", spoilers),
            paint_with_body,
        }
    }

    #[must_use]
    pub const fn spoilers(&self) -> &VariantSet<SpoilerPart> {
        &self.spoilers
    }

    #[must_use]
    pub const fn paint_with_body(&self) -> bool {
        self.paint_with_body
    }

    pub const fn set_paint_with_body(&mut self, enabled: bool) {
        self.paint_with_body = enabled;
    }

    /// Show the saved spoiler, if any, and tint it.
    pub fn initialize(&mut self, loadout: &Loadout, rig: &mut dyn VehicleRig) {
        if let Some(position) = self.spoilers.restore(loadout.spoiler) {
            self.on_enable(position, loadout, rig);
        }
    }

    /// Switch to the spoiler at `index` (`-1` for none) and record it.
    ///
    /// # Errors
    ///
    /// Returns [`CustomizationError::InvalidIndex`] when `index` is not a spoiler.
    pub fn upgrade(
        &mut self,
        index: i32,
        rig: &mut dyn VehicleRig,
        loadout: &mut Loadout,
    ) -> Result<(), CustomizationError> {
        if let Some(position) = self.spoilers.select(index)? {
            self.on_enable(position, loadout, rig);
        }
        loadout.spoiler = index;
        Ok(())
    }

    /// Tint every spoiler that has a paint target, shown or not.
    pub fn paint(&self, color: Rgba, rig: &mut dyn VehicleRig) -> bool {
        let mut painted = false;
        for spoiler in self.spoilers.iter() {
            if spoiler.part.surface.is_some() {
                painted |= spoiler.part.tint(color, rig);
            }
        }
        painted
    }

    // A newly shown spoiler takes the saved paint, or grey before any paint job.
    fn on_enable(&self, position: usize, loadout: &Loadout, rig: &mut dyn VehicleRig) {
        let Some(spoiler) = self.spoilers.get(position) else {
            return;
        };
        let color = if loadout.has_paint() {
            loadout.paint
        } else {
            Rgba::GRAY
        };
        spoiler.part.tint(color, rig);
    }
}

impl BodyColorFollower for SpoilerManager {
    fn follows_body_color(&self) -> bool {
        self.paint_with_body
    }

    fn follow_body_color(&mut self, color: Rgba, rig: &mut dyn VehicleRig) -> bool {
        self.paint(color, rig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loadout::NO_SELECTION;
    use crate::vehicle::{SimVehicle, VehicleStats};

    fn fixture() -> (SimVehicle, SurfaceId, SpoilerManager) {
        let mut rig = SimVehicle::new("coupe", VehicleStats::default(), 0.33);
        let wing = rig.add_surface("wing", vec![Rgba::WHITE]);
        let manager = SpoilerManager::new(
            vec![
                ("lip".to_string(), SpoilerPart::default()),
                (
                    "wing".to_string(),
                    SpoilerPart {
                        surface: Some(wing),
                        material: Some(0),
                    },
                ),
            ],
            true,
        );
        (rig, wing, manager)
    }

    #[test]
    fn upgrade_shows_one_spoiler_and_records_index() {
        let (mut rig, _, mut manager) = fixture();
        let mut loadout = Loadout::default();
        manager.upgrade(0, &mut rig, &mut loadout).unwrap();
        manager.upgrade(1, &mut rig, &mut loadout).unwrap();
        assert_eq!(manager.spoilers().active_count(), 1);
        assert_eq!(manager.spoilers().active_index(), 1);
        assert_eq!(loadout.spoiler, 1);

        manager.upgrade(NO_SELECTION, &mut rig, &mut loadout).unwrap();
        assert_eq!(manager.spoilers().active_count(), 0);
        assert_eq!(loadout.spoiler, NO_SELECTION);
    }

    #[test]
    fn enabling_unpainted_vehicle_uses_gray() {
        let (mut rig, wing, mut manager) = fixture();
        let mut loadout = Loadout::default();
        manager.upgrade(1, &mut rig, &mut loadout).unwrap();
        assert_eq!(rig.material_color(wing, 0), Some(Rgba::GRAY));
    }

    #[test]
    fn initialize_paints_with_saved_color() {
        let (mut rig, wing, mut manager) = fixture();
        let green = Rgba::rgb(0.0, 1.0, 0.0);
        let loadout = Loadout {
            paint: green,
            spoiler: 1,
            ..Loadout::default()
        };
        manager.initialize(&loadout, &mut rig);
        assert_eq!(manager.spoilers().active_index(), 1);
        assert_eq!(rig.material_color(wing, 0), Some(green));
    }

    #[test]
    fn invalid_index_leaves_loadout_untouched() {
        let (mut rig, _, mut manager) = fixture();
        let mut loadout = Loadout::default();
        let err = manager.upgrade(5, &mut rig, &mut loadout).unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(loadout.spoiler, NO_SELECTION);
    }

    #[test]
    fn follows_body_color_only_when_enabled() {
        let (mut rig, wing, mut manager) = fixture();
        let blue = Rgba::rgb(0.0, 0.0, 1.0);
        assert!(manager.follows_body_color());
        assert!(manager.follow_body_color(blue, &mut rig));
        assert_eq!(rig.material_color(wing, 0), Some(blue));

        manager.set_paint_with_body(false);
        assert!(!manager.follows_body_color());
    }
}
