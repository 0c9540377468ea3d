//! Body paint
use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::loadout::Loadout;
use crate::vehicle::{SurfaceId, VehicleRig};

/// Something that re-tints itself whenever the body paint changes.
pub trait BodyColorFollower {
    /// Whether this follower currently takes the body colour.
    fn follows_body_color(&self) -> bool;

    /// Apply the new body colour. Returns true if anything was repainted.
    fn follow_body_color(&mut self, color: Rgba, rig: &mut dyn VehicleRig) -> bool;
}

/// Target material for one painter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Painter {
    /// Renderer to tint; a painter without one only logs.
    pub surface: Option<SurfaceId>,
    pub material: usize,
}

impl Painter {
    fn apply(&self, color: Rgba, rig: &mut dyn VehicleRig) -> bool {
        let Some(surface) = self.surface else {
            log::error!("body renderer is not selected for this painter");
            return false;
        };
        if !rig.set_material_color(surface, self.material, color) {
            log::error!(
                "painter target {surface:?} material {} does not exist on '{}'",
                self.material,
                rig.name()
            );
            return false;
        }
        true
    }
}

/// Drives every painter on the body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaintManager {
    painters: Vec<Painter>,
}

impl PaintManager {
    #[must_use]
    pub const fn new(painters: Vec<Painter>) -> Self {
        Self { painters }
    }

    #[must_use]
    pub fn painters(&self) -> &[Painter] {
        &self.painters
    }

    /// Re-apply the saved paint. An unset paint keeps the authored materials.
    pub fn initialize(&self, loadout: &Loadout, rig: &mut dyn VehicleRig) {
        if self.painters.is_empty() || !loadout.has_paint() {
            return;
        }
        self.apply(loadout.paint, rig);
    }

    /// Paint the body and record the colour.
    ///
    /// Returns false, leaving the loadout alone, when no painter could reach
    /// its material.
    pub fn paint(&self, color: Rgba, rig: &mut dyn VehicleRig, loadout: &mut Loadout) -> bool {
        if !self.apply(color, rig) {
            return false;
        }
        loadout.paint = color;
        true
    }

    fn apply(&self, color: Rgba, rig: &mut dyn VehicleRig) -> bool {
        let mut applied = false;
        for painter in &self.painters {
            applied |= painter.apply(color, rig);
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::{SimVehicle, VehicleStats};

    fn rig_with_body() -> (SimVehicle, SurfaceId) {
        let mut rig = SimVehicle::new("coupe", VehicleStats::default(), 0.33);
        let body = rig.add_surface("body", vec![Rgba::WHITE, Rgba::BLACK]);
        (rig, body)
    }

    #[test]
    fn initialize_skips_unset_paint() {
        let (mut rig, body) = rig_with_body();
        let manager = PaintManager::new(vec![Painter {
            surface: Some(body),
            material: 0,
        }]);
        manager.initialize(&Loadout::default(), &mut rig);
        assert_eq!(rig.material_color(body, 0), Some(Rgba::WHITE));
    }

    #[test]
    fn initialize_applies_saved_paint() {
        let (mut rig, body) = rig_with_body();
        let manager = PaintManager::new(vec![Painter {
            surface: Some(body),
            material: 1,
        }]);
        let red = Rgba::rgb(1.0, 0.0, 0.0);
        let loadout = Loadout {
            paint: red,
            ..Loadout::default()
        };
        manager.initialize(&loadout, &mut rig);
        assert_eq!(rig.material_color(body, 1), Some(red));
        assert_eq!(rig.material_color(body, 0), Some(Rgba::WHITE));
    }

    #[test]
    fn paint_records_color_when_applied() {
        let (mut rig, body) = rig_with_body();
        let manager = PaintManager::new(vec![
            Painter {
                surface: Some(body),
                material: 0,
            },
            Painter {
                surface: None,
                material: 0,
            },
        ]);
        let mut loadout = Loadout::default();
        let blue = Rgba::rgb(0.0, 0.0, 1.0);
        assert!(manager.paint(blue, &mut rig, &mut loadout));
        assert_eq!(loadout.paint, blue);
        assert_eq!(rig.material_color(body, 0), Some(blue));
    }

    #[test]
    fn paint_without_targets_is_noop() {
        let (mut rig, _) = rig_with_body();
        let manager = PaintManager::new(vec![Painter {
            surface: None,
            material: 0,
        }]);
        let mut loadout = Loadout::default();
        assert!(!manager.paint(Rgba::BLACK, &mut rig, &mut loadout));
        assert_eq!(loadout, Loadout::default());
    }
}
