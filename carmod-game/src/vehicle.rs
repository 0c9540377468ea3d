//! Vehicle capability consumed by the customization engine
use serde::{Deserialize, Serialize};

use crate::catalog::WheelPart;
use crate::color::Rgba;

/// Handle to a paintable renderer on a vehicle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceId(pub u16);

/// Performance stat that an upgrade manager drives.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatAxis {
    Engine,
    Brake,
    Handling,
}

impl StatAxis {
    pub const ALL: [Self; 3] = [Self::Engine, Self::Brake, Self::Handling];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Engine => "engine",
            Self::Brake => "brake",
            Self::Handling => "handling",
        }
    }
}

/// What the customization engine needs from a live vehicle.
///
/// Physics, rendering, and scene ownership stay with the host; the engine only
/// sets tuning fields, tints materials, and swaps wheel models.
pub trait VehicleRig {
    /// Identifying name of the vehicle instance.
    fn name(&self) -> &str;

    fn engine_torque(&self) -> f32;
    fn set_engine_torque(&mut self, value: f32);

    fn brake_torque(&self) -> f32;
    fn set_brake_torque(&mut self, value: f32);

    fn traction_helper(&self) -> f32;
    fn set_traction_helper(&mut self, value: f32);

    /// Current colour of one material, or `None` if it does not exist.
    fn material_color(&self, surface: SurfaceId, material: usize) -> Option<Rgba>;

    /// Tint one material. Returns false when the surface or material is missing.
    fn set_material_color(&mut self, surface: SurfaceId, material: usize, color: Rgba) -> bool;

    /// Replace every wheel model with `part`, or restore the stock wheels with `None`.
    fn mount_wheels(&mut self, part: Option<&WheelPart>, apply_radius: bool);

    /// Id of the catalog wheel currently mounted, if any.
    fn mounted_wheel(&self) -> Option<&str>;

    /// Read the tuning field behind `axis`.
    fn stat(&self, axis: StatAxis) -> f32 {
        match axis {
            StatAxis::Engine => self.engine_torque(),
            StatAxis::Brake => self.brake_torque(),
            StatAxis::Handling => self.traction_helper(),
        }
    }

    /// Write the tuning field behind `axis`.
    fn set_stat(&mut self, axis: StatAxis, value: f32) {
        match axis {
            StatAxis::Engine => self.set_engine_torque(value),
            StatAxis::Brake => self.set_brake_torque(value),
            StatAxis::Handling => self.set_traction_helper(value),
        }
    }
}

/// Tuning values a vehicle starts with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleStats {
    #[serde(default = "VehicleStats::default_engine_torque")]
    pub engine_torque: f32,
    #[serde(default = "VehicleStats::default_brake_torque")]
    pub brake_torque: f32,
    #[serde(default = "VehicleStats::default_traction_helper")]
    pub traction_helper: f32,
}

impl Default for VehicleStats {
    fn default() -> Self {
        Self {
            engine_torque: Self::default_engine_torque(),
            brake_torque: Self::default_brake_torque(),
            traction_helper: Self::default_traction_helper(),
        }
    }
}

impl VehicleStats {
    const fn default_engine_torque() -> f32 {
        350.0
    }

    const fn default_brake_torque() -> f32 {
        2000.0
    }

    const fn default_traction_helper() -> f32 {
        0.1
    }
}

/// One renderer with its material colours.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub name: String,
    pub materials: Vec<Rgba>,
}

/// Wheel position on a simulated vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct WheelMount {
    pub stock_radius: f32,
    pub radius: f32,
    /// Right-hand wheels mirror the mounted model.
    pub right_side: bool,
    pub stock_visible: bool,
    pub mounted: Option<String>,
}

impl WheelMount {
    #[must_use]
    pub const fn stock(radius: f32, right_side: bool) -> Self {
        Self {
            stock_radius: radius,
            radius,
            right_side,
            stock_visible: true,
            mounted: None,
        }
    }

    /// The mounted model is drawn mirrored on the right-hand side.
    #[must_use]
    pub fn is_mirrored(&self) -> bool {
        self.right_side && self.mounted.is_some()
    }
}

/// In-memory vehicle used by headless hosts and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct SimVehicle {
    name: String,
    stats: VehicleStats,
    surfaces: Vec<Surface>,
    wheels: Vec<WheelMount>,
    mounted_part: Option<String>,
}

impl SimVehicle {
    /// Four stock wheels at `wheel_radius`, no surfaces.
    #[must_use]
    pub fn new(name: impl Into<String>, stats: VehicleStats, wheel_radius: f32) -> Self {
        let wheels = [false, true, false, true]
            .into_iter()
            .map(|right| WheelMount::stock(wheel_radius, right))
            .collect();
        Self {
            name: name.into(),
            stats,
            surfaces: Vec::new(),
            wheels,
            mounted_part: None,
        }
    }

    /// Add a renderer and return its handle.
    pub fn add_surface(&mut self, name: impl Into<String>, materials: Vec<Rgba>) -> SurfaceId {
        let id = u16::try_from(self.surfaces.len()).unwrap_or(u16::MAX);
        self.surfaces.push(Surface {
            name: name.into(),
            materials,
        });
        SurfaceId(id)
    }

    #[must_use]
    pub fn surface(&self, id: SurfaceId) -> Option<&Surface> {
        self.surfaces.get(usize::from(id.0))
    }

    #[must_use]
    pub fn surface_id(&self, name: &str) -> Option<SurfaceId> {
        self.surfaces
            .iter()
            .position(|surface| surface.name == name)
            .and_then(|idx| u16::try_from(idx).ok())
            .map(SurfaceId)
    }

    #[must_use]
    pub fn wheels(&self) -> &[WheelMount] {
        &self.wheels
    }

    #[must_use]
    pub const fn stats(&self) -> VehicleStats {
        self.stats
    }
}

impl VehicleRig for SimVehicle {
    fn name(&self) -> &str {
        &self.name
    }

    fn engine_torque(&self) -> f32 {
        self.stats.engine_torque
    }

    fn set_engine_torque(&mut self, value: f32) {
        self.stats.engine_torque = value;
    }

    fn brake_torque(&self) -> f32 {
        self.stats.brake_torque
    }

    fn set_brake_torque(&mut self, value: f32) {
        self.stats.brake_torque = value;
    }

    fn traction_helper(&self) -> f32 {
        self.stats.traction_helper
    }

    fn set_traction_helper(&mut self, value: f32) {
        self.stats.traction_helper = value;
    }

    fn material_color(&self, surface: SurfaceId, material: usize) -> Option<Rgba> {
        self.surface(surface)
            .and_then(|surface| surface.materials.get(material))
            .copied()
    }

    fn set_material_color(&mut self, surface: SurfaceId, material: usize, color: Rgba) -> bool {
        let Some(slot) = self
            .surfaces
            .get_mut(usize::from(surface.0))
            .and_then(|surface| surface.materials.get_mut(material))
        else {
            return false;
        };
        *slot = color;
        true
    }

    fn mount_wheels(&mut self, part: Option<&WheelPart>, apply_radius: bool) {
        for wheel in &mut self.wheels {
            match part {
                Some(part) => {
                    wheel.stock_visible = false;
                    wheel.mounted = Some(part.id.clone());
                    if apply_radius {
                        wheel.radius = part.radius;
                    }
                }
                None => {
                    wheel.stock_visible = true;
                    wheel.mounted = None;
                    wheel.radius = wheel.stock_radius;
                }
            }
        }
        self.mounted_part = part.map(|part| part.id.clone());
    }

    fn mounted_wheel(&self) -> Option<&str> {
        self.mounted_part.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rally() -> WheelPart {
        WheelPart {
            id: "rally".to_string(),
            name: "Rally".to_string(),
            radius: 0.4,
        }
    }

    #[test]
    fn stat_accessors_follow_axis() {
        let mut rig = SimVehicle::new("coupe", VehicleStats::default(), 0.33);
        rig.set_stat(StatAxis::Brake, 3100.0);
        assert!((rig.brake_torque() - 3100.0).abs() <= f32::EPSILON);
        assert!((rig.stat(StatAxis::Engine) - 350.0).abs() <= f32::EPSILON);
        assert!((rig.stat(StatAxis::Handling) - 0.1).abs() <= f32::EPSILON);
    }

    #[test]
    fn material_writes_reject_missing_targets() {
        let mut rig = SimVehicle::new("coupe", VehicleStats::default(), 0.33);
        let body = rig.add_surface("body", vec![Rgba::WHITE, Rgba::BLACK]);
        assert!(rig.set_material_color(body, 1, Rgba::GRAY));
        assert_eq!(rig.material_color(body, 1), Some(Rgba::GRAY));
        assert!(!rig.set_material_color(body, 2, Rgba::GRAY));
        assert!(!rig.set_material_color(SurfaceId(9), 0, Rgba::GRAY));
        assert_eq!(rig.surface_id("body"), Some(body));
    }

    #[test]
    fn mounting_wheels_hides_stock_and_mirrors_right_side() {
        let mut rig = SimVehicle::new("coupe", VehicleStats::default(), 0.33);
        rig.mount_wheels(Some(&rally()), true);
        assert_eq!(rig.mounted_wheel(), Some("rally"));
        assert!(rig.wheels().iter().all(|w| !w.stock_visible));
        assert!(rig.wheels().iter().all(|w| (w.radius - 0.4).abs() <= f32::EPSILON));
        assert_eq!(rig.wheels().iter().filter(|w| w.is_mirrored()).count(), 2);

        rig.mount_wheels(None, true);
        assert_eq!(rig.mounted_wheel(), None);
        assert!(rig.wheels().iter().all(|w| w.stock_visible));
        assert!(rig.wheels().iter().all(|w| (w.radius - 0.33).abs() <= f32::EPSILON));
    }

    #[test]
    fn mounting_without_radius_keeps_stock_radius() {
        let mut rig = SimVehicle::new("coupe", VehicleStats::default(), 0.33);
        rig.mount_wheels(Some(&rally()), false);
        assert!(rig.wheels().iter().all(|w| (w.radius - 0.33).abs() <= f32::EPSILON));
    }
}
