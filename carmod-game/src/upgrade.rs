//! Performance upgrades (engine, brake, handling)
//!
//! Each axis holds a level in `0..=5` and interpolates the live vehicle stat
//! between the value captured at composition time and a configured ceiling.
use serde::{Deserialize, Serialize};

use crate::loadout::{Loadout, MAX_LEVEL};
use crate::vehicle::{StatAxis, VehicleRig};

/// Linear interpolation between `from` and `to`, with `t` clamped to `0..=1`.
/// Both endpoints are returned exactly.
#[must_use]
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    if t <= 0.0 {
        return from;
    }
    if t >= 1.0 {
        return to;
    }
    (to - from).mul_add(t, from)
}

/// Extra stat granted above the base when no ceiling is configured.
#[must_use]
pub const fn default_headroom(axis: StatAxis) -> f32 {
    match axis {
        StatAxis::Engine => 200.0,
        StatAxis::Brake => 1000.0,
        StatAxis::Handling => 0.3,
    }
}

/// Level stored in the loadout for `axis`.
#[must_use]
pub const fn loadout_level(loadout: &Loadout, axis: StatAxis) -> u8 {
    match axis {
        StatAxis::Engine => loadout.engine_level,
        StatAxis::Brake => loadout.brake_level,
        StatAxis::Handling => loadout.handling_level,
    }
}

const fn loadout_level_mut(loadout: &mut Loadout, axis: StatAxis) -> &mut u8 {
    match axis {
        StatAxis::Engine => &mut loadout.engine_level,
        StatAxis::Brake => &mut loadout.brake_level,
        StatAxis::Handling => &mut loadout.handling_level,
    }
}

/// Result of asking an axis to go up one level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UpgradeOutcome {
    Upgraded { level: u8, stat: f32 },
    AtMaxLevel,
}

impl UpgradeOutcome {
    #[must_use]
    pub const fn changed(self) -> bool {
        matches!(self, Self::Upgraded { .. })
    }
}

/// One upgradable stat axis.
#[derive(Debug, Clone, PartialEq)]
pub struct StatUpgrade {
    axis: StatAxis,
    level: u8,
    base: f32,
    ceiling: f32,
}

impl StatUpgrade {
    /// Capture the base stat from the live vehicle.
    ///
    /// With no `ceiling`, the axis headroom is added to the base.
    #[must_use]
    pub fn compose(axis: StatAxis, rig: &dyn VehicleRig, ceiling: Option<f32>) -> Self {
        let base = rig.stat(axis);
        Self {
            axis,
            level: 0,
            base,
            ceiling: ceiling.unwrap_or(base + default_headroom(axis)),
        }
    }

    #[must_use]
    pub const fn axis(&self) -> StatAxis {
        self.axis
    }

    #[must_use]
    pub const fn level(&self) -> u8 {
        self.level
    }

    #[must_use]
    pub const fn base(&self) -> f32 {
        self.base
    }

    #[must_use]
    pub const fn ceiling(&self) -> f32 {
        self.ceiling
    }

    #[must_use]
    pub const fn can_upgrade(&self) -> bool {
        self.level < MAX_LEVEL
    }

    /// Assign a level. Values above [`MAX_LEVEL`] are ignored.
    pub const fn set_level(&mut self, level: u8) -> bool {
        if level > MAX_LEVEL {
            return false;
        }
        self.level = level;
        true
    }

    /// Stat for the current level.
    #[must_use]
    pub fn derived(&self) -> f32 {
        lerp(
            self.base,
            self.ceiling,
            f32::from(self.level) / f32::from(MAX_LEVEL),
        )
    }

    /// Apply the saved level to the vehicle without persisting anything.
    pub fn initialize(&mut self, level: u8, rig: &mut dyn VehicleRig) {
        if !self.set_level(level) {
            log::warn!(
                "{} level {level} exceeds {MAX_LEVEL}; keeping level {}",
                self.axis.label(),
                self.level
            );
        }
        rig.set_stat(self.axis, self.derived());
    }

    /// Raise the level by one, push the new stat, and record it in `loadout`.
    ///
    /// At [`MAX_LEVEL`] nothing changes and the loadout is left alone.
    pub fn upgrade(&mut self, rig: &mut dyn VehicleRig, loadout: &mut Loadout) -> UpgradeOutcome {
        if !self.set_level(self.level.saturating_add(1)) {
            log::debug!("{} already at level {MAX_LEVEL}", self.axis.label());
            return UpgradeOutcome::AtMaxLevel;
        }
        let stat = self.derived();
        rig.set_stat(self.axis, stat);
        *loadout_level_mut(loadout, self.axis) = self.level;
        UpgradeOutcome::Upgraded {
            level: self.level,
            stat,
        }
    }

    /// Raise the ceiling to the live stat if something pushed the stat past it.
    ///
    /// The ceiling never shrinks here.
    pub fn tick(&mut self, rig: &dyn VehicleRig) -> bool {
        let live = rig.stat(self.axis);
        if self.ceiling < live {
            self.ceiling = live;
            return true;
        }
        false
    }
}

/// Optional ceilings per axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UpgradeCeilings {
    #[serde(default)]
    pub engine: Option<f32>,
    #[serde(default)]
    pub brake: Option<f32>,
    #[serde(default)]
    pub handling: Option<f32>,
}

impl UpgradeCeilings {
    #[must_use]
    pub const fn get(&self, axis: StatAxis) -> Option<f32> {
        match axis {
            StatAxis::Engine => self.engine,
            StatAxis::Brake => self.brake,
            StatAxis::Handling => self.handling,
        }
    }
}

/// The three performance axes of one vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeManager {
    engine: StatUpgrade,
    brake: StatUpgrade,
    handling: StatUpgrade,
}

impl UpgradeManager {
    /// Capture every base stat from the live vehicle.
    #[must_use]
    pub fn compose(rig: &dyn VehicleRig, ceilings: &UpgradeCeilings) -> Self {
        Self {
            engine: StatUpgrade::compose(StatAxis::Engine, rig, ceilings.engine),
            brake: StatUpgrade::compose(StatAxis::Brake, rig, ceilings.brake),
            handling: StatUpgrade::compose(StatAxis::Handling, rig, ceilings.handling),
        }
    }

    #[must_use]
    pub const fn axis(&self, axis: StatAxis) -> &StatUpgrade {
        match axis {
            StatAxis::Engine => &self.engine,
            StatAxis::Brake => &self.brake,
            StatAxis::Handling => &self.handling,
        }
    }

    pub const fn axis_mut(&mut self, axis: StatAxis) -> &mut StatUpgrade {
        match axis {
            StatAxis::Engine => &mut self.engine,
            StatAxis::Brake => &mut self.brake,
            StatAxis::Handling => &mut self.handling,
        }
    }

    pub fn initialize(&mut self, loadout: &Loadout, rig: &mut dyn VehicleRig) {
        for axis in StatAxis::ALL {
            self.axis_mut(axis)
                .initialize(loadout_level(loadout, axis), rig);
        }
    }

    pub fn upgrade(
        &mut self,
        axis: StatAxis,
        rig: &mut dyn VehicleRig,
        loadout: &mut Loadout,
    ) -> UpgradeOutcome {
        self.axis_mut(axis).upgrade(rig, loadout)
    }

    pub fn tick(&mut self, rig: &dyn VehicleRig) {
        for axis in StatAxis::ALL {
            if self.axis_mut(axis).tick(rig) {
                log::debug!(
                    "{} ceiling raised to live stat {:.3}",
                    axis.label(),
                    self.axis(axis).ceiling()
                );
            }
        }
    }
}
