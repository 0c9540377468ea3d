//! Per-vehicle customization orchestrator
//!
//! A [`CustomizationApplier`] owns one vehicle's [`Loadout`], the managers
//! fitted to that vehicle, and a handle to the shared [`LoadoutStore`]. Every
//! mutating operation writes through to the loadout and persists it before
//! returning.
//!
//! When the store rejects a write, the error is returned but the change stays
//! live: the vehicle and [`CustomizationApplier::loadout`] keep it and the
//! store keeps its previous record. A later successful save, or an explicit
//! [`CustomizationApplier::save_loadout`], brings the store back in line.
use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::error::{CustomizationError, StoreError};
use crate::loadout::Loadout;
use crate::paint::{BodyColorFollower, PaintManager};
use crate::siren::SirenManager;
use crate::spoiler::SpoilerManager;
use crate::store::LoadoutStore;
use crate::upgrade::{UpgradeCeilings, UpgradeManager, UpgradeOutcome};
use crate::vehicle::{StatAxis, VehicleRig};
use crate::wheels::WheelManager;

/// Shared, single-threaded handle to an applier.
pub type ApplierHandle<S> = Rc<RefCell<CustomizationApplier<S>>>;

/// What happened to a routed customization request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dispatch {
    /// State changed and the loadout was persisted.
    Applied,
    /// The request was valid but nothing changed (e.g. already at max level).
    Unchanged,
    /// No applier is targeted.
    NoTarget,
    /// The targeted vehicle has no manager for this request.
    MissingManager,
}

/// Which managers a vehicle was composed with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FittedManagers {
    pub paint: bool,
    pub wheels: bool,
    pub upgrades: bool,
    pub spoilers: bool,
    pub sirens: bool,
}

/// Level and stat of one upgrade axis, for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisStatus {
    pub axis: StatAxis,
    pub level: u8,
    pub stat: f32,
    pub ceiling: f32,
    pub can_upgrade: bool,
}

/// Read-only view of a vehicle's customization state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomizationSnapshot {
    pub vehicle: String,
    pub save_key: String,
    pub loadout: Loadout,
    pub fitted: FittedManagers,
    pub axes: Vec<AxisStatus>,
    pub spoiler_count: usize,
    pub siren_count: usize,
    pub wheel_count: usize,
    pub mounted_wheel: Option<String>,
}

pub struct CustomizationApplier<S: LoadoutStore> {
    save_key: String,
    auto_load: bool,
    loadout: Loadout,
    store: S,
    rig: Box<dyn VehicleRig>,
    paint: Option<PaintManager>,
    wheels: Option<WheelManager>,
    upgrades: Option<UpgradeManager>,
    spoilers: Option<SpoilerManager>,
    sirens: Option<SirenManager>,
}

impl<S: LoadoutStore> std::fmt::Debug for CustomizationApplier<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomizationApplier")
            .field("vehicle", &self.rig.name())
            .field("save_key", &self.save_key)
            .field("auto_load", &self.auto_load)
            .field("loadout", &self.loadout)
            .finish_non_exhaustive()
    }
}

/// Explicit composition of an applier and its managers.
pub struct ApplierBuilder<S: LoadoutStore> {
    rig: Box<dyn VehicleRig>,
    store: S,
    save_key: Option<String>,
    auto_load: bool,
    paint: Option<PaintManager>,
    wheels: Option<WheelManager>,
    ceilings: Option<UpgradeCeilings>,
    spoilers: Option<SpoilerManager>,
    sirens: Option<SirenManager>,
}

impl<S: LoadoutStore> ApplierBuilder<S> {
    /// Save under `key` instead of the vehicle name.
    #[must_use]
    pub fn save_key(mut self, key: impl Into<String>) -> Self {
        self.save_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn auto_load(mut self, enabled: bool) -> Self {
        self.auto_load = enabled;
        self
    }

    #[must_use]
    pub fn paint(mut self, manager: PaintManager) -> Self {
        self.paint = Some(manager);
        self
    }

    #[must_use]
    pub fn wheels(mut self, manager: WheelManager) -> Self {
        self.wheels = Some(manager);
        self
    }

    /// Fit engine, brake, and handling upgrades. Base stats are captured from
    /// the vehicle when the applier is built.
    #[must_use]
    pub fn upgrades(mut self, ceilings: UpgradeCeilings) -> Self {
        self.ceilings = Some(ceilings);
        self
    }

    #[must_use]
    pub fn spoilers(mut self, manager: SpoilerManager) -> Self {
        self.spoilers = Some(manager);
        self
    }

    #[must_use]
    pub fn sirens(mut self, manager: SirenManager) -> Self {
        self.sirens = Some(manager);
        self
    }

    #[must_use]
    pub fn build(self) -> CustomizationApplier<S> {
        let save_key = self
            .save_key
            .unwrap_or_else(|| self.rig.name().to_string());
        let upgrades = self
            .ceilings
            .map(|ceilings| UpgradeManager::compose(self.rig.as_ref(), &ceilings));
        CustomizationApplier {
            save_key,
            auto_load: self.auto_load,
            loadout: Loadout::default(),
            store: self.store,
            rig: self.rig,
            paint: self.paint,
            wheels: self.wheels,
            upgrades,
            spoilers: self.spoilers,
            sirens: self.sirens,
        }
    }

    #[must_use]
    pub fn into_handle(self) -> ApplierHandle<S> {
        Rc::new(RefCell::new(self.build()))
    }
}

impl<S: LoadoutStore> CustomizationApplier<S> {
    /// Start composing an applier for `rig`, persisting through `store`.
    pub fn builder(rig: Box<dyn VehicleRig>, store: S) -> ApplierBuilder<S> {
        ApplierBuilder {
            rig,
            store,
            save_key: None,
            auto_load: true,
            paint: None,
            wheels: None,
            ceilings: None,
            spoilers: None,
            sirens: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.rig.name()
    }

    #[must_use]
    pub fn save_key(&self) -> &str {
        &self.save_key
    }

    #[must_use]
    pub const fn loadout(&self) -> &Loadout {
        &self.loadout
    }

    #[must_use]
    pub fn rig(&self) -> &dyn VehicleRig {
        self.rig.as_ref()
    }

    /// Direct access for other systems that tune the vehicle.
    pub fn rig_mut(&mut self) -> &mut dyn VehicleRig {
        self.rig.as_mut()
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn paint_manager(&self) -> Option<&PaintManager> {
        self.paint.as_ref()
    }

    #[must_use]
    pub const fn wheel_manager(&self) -> Option<&WheelManager> {
        self.wheels.as_ref()
    }

    #[must_use]
    pub const fn upgrade_manager(&self) -> Option<&UpgradeManager> {
        self.upgrades.as_ref()
    }

    #[must_use]
    pub const fn spoiler_manager(&self) -> Option<&SpoilerManager> {
        self.spoilers.as_ref()
    }

    pub const fn spoiler_manager_mut(&mut self) -> Option<&mut SpoilerManager> {
        self.spoilers.as_mut()
    }

    #[must_use]
    pub const fn siren_manager(&self) -> Option<&SirenManager> {
        self.sirens.as_ref()
    }

    #[must_use]
    pub const fn fitted(&self) -> FittedManagers {
        FittedManagers {
            paint: self.paint.is_some(),
            wheels: self.wheels.is_some(),
            upgrades: self.upgrades.is_some(),
            spoilers: self.spoilers.is_some(),
            sirens: self.sirens.is_some(),
        }
    }

    /// Load (or reset) the loadout and push it into every fitted manager.
    ///
    /// Initialization never persists. A record that cannot be read is replaced
    /// by a default loadout.
    pub fn activate(&mut self) {
        self.loadout = if self.auto_load {
            self.load_loadout()
        } else {
            Loadout::default()
        };

        let rig = self.rig.as_mut();
        if let Some(paint) = &self.paint {
            paint.initialize(&self.loadout, rig);
        }
        if let Some(wheels) = &mut self.wheels {
            wheels.initialize(&self.loadout, rig);
        }
        if let Some(upgrades) = &mut self.upgrades {
            upgrades.initialize(&self.loadout, rig);
        }
        if let Some(spoilers) = &mut self.spoilers {
            spoilers.initialize(&self.loadout, rig);
        }
        if let Some(sirens) = &mut self.sirens {
            sirens.initialize(&self.loadout);
        }
        log::debug!(
            "activated '{}' with loadout {:?}",
            self.rig.name(),
            self.loadout
        );
    }

    fn load_loadout(&self) -> Loadout {
        match self.store.load(&self.save_key) {
            Ok(loadout) => loadout,
            Err(err) => {
                log::warn!(
                    "discarding saved loadout for '{}': {err}",
                    self.rig.name()
                );
                Loadout::default()
            }
        }
    }

    /// Persist the current loadout under the save key.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    pub fn save_loadout(&self) -> Result<(), StoreError> {
        self.store.save(&self.save_key, &self.loadout)
    }

    /// Paint the body, then every manager that follows the body colour.
    /// Followers are left alone when no body painter could be applied.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting the new paint fails.
    pub fn paint(&mut self, color: Rgba) -> Result<Dispatch, CustomizationError> {
        let Some(paint) = &self.paint else {
            return Ok(Self::missing("paint", self.rig.name()));
        };
        if !paint.paint(color, self.rig.as_mut(), &mut self.loadout) {
            return Ok(Dispatch::Unchanged);
        }

        let followers = self
            .spoilers
            .iter_mut()
            .map(|spoilers| spoilers as &mut dyn BodyColorFollower);
        for follower in followers {
            if follower.follows_body_color() {
                follower.follow_body_color(color, self.rig.as_mut());
            }
        }

        self.save_loadout()?;
        Ok(Dispatch::Applied)
    }

    /// Mount catalog wheel `index`, or stock wheels with `-1`.
    ///
    /// # Errors
    ///
    /// Returns an error for an index outside the catalog or a failed save.
    pub fn change_wheels(&mut self, index: i32) -> Result<Dispatch, CustomizationError> {
        let Some(wheels) = &mut self.wheels else {
            return Ok(Self::missing("wheel", self.rig.name()));
        };
        wheels.update_wheel(index, self.rig.as_mut(), &mut self.loadout)?;
        self.save_loadout()?;
        Ok(Dispatch::Applied)
    }

    /// Raise one performance axis by a level.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting the new level fails.
    pub fn upgrade(&mut self, axis: StatAxis) -> Result<Dispatch, CustomizationError> {
        let Some(upgrades) = &mut self.upgrades else {
            return Ok(Self::missing("upgrade", self.rig.name()));
        };
        match upgrades.upgrade(axis, self.rig.as_mut(), &mut self.loadout) {
            UpgradeOutcome::Upgraded { .. } => {
                self.save_loadout()?;
                Ok(Dispatch::Applied)
            }
            UpgradeOutcome::AtMaxLevel => Ok(Dispatch::Unchanged),
        }
    }

    /// Show spoiler `index`, or none with `-1`.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown spoiler or a failed save.
    pub fn spoiler(&mut self, index: i32) -> Result<Dispatch, CustomizationError> {
        let Some(spoilers) = &mut self.spoilers else {
            return Ok(Self::missing("spoiler", self.rig.name()));
        };
        spoilers.upgrade(index, self.rig.as_mut(), &mut self.loadout)?;
        self.save_loadout()?;
        Ok(Dispatch::Applied)
    }

    /// Show siren `index`, or none with `-1`.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown siren or a failed save.
    pub fn siren(&mut self, index: i32) -> Result<Dispatch, CustomizationError> {
        let Some(sirens) = &mut self.sirens else {
            return Ok(Self::missing("siren", self.rig.name()));
        };
        sirens.upgrade(index, &mut self.loadout)?;
        self.save_loadout()?;
        Ok(Dispatch::Applied)
    }

    /// Per-frame housekeeping: keep upgrade ceilings at or above the live stats.
    pub fn tick(&mut self) {
        if let Some(upgrades) = &mut self.upgrades {
            upgrades.tick(self.rig.as_ref());
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> CustomizationSnapshot {
        let axes = self
            .upgrades
            .as_ref()
            .map(|upgrades| {
                StatAxis::ALL
                    .iter()
                    .map(|&axis| {
                        let upgrade = upgrades.axis(axis);
                        AxisStatus {
                            axis,
                            level: upgrade.level(),
                            stat: self.rig.stat(axis),
                            ceiling: upgrade.ceiling(),
                            can_upgrade: upgrade.can_upgrade(),
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();
        CustomizationSnapshot {
            vehicle: self.rig.name().to_string(),
            save_key: self.save_key.clone(),
            loadout: self.loadout.clone(),
            fitted: self.fitted(),
            axes,
            spoiler_count: self.spoilers.as_ref().map_or(0, |s| s.spoilers().len()),
            siren_count: self.sirens.as_ref().map_or(0, |s| s.sirens().len()),
            wheel_count: self.wheels.as_ref().map_or(0, |w| w.catalog().len()),
            mounted_wheel: self.rig.mounted_wheel().map(ToString::to_string),
        }
    }

    fn missing(manager: &str, vehicle: &str) -> Dispatch {
        log::debug!("'{vehicle}' has no {manager} manager; ignoring request");
        Dispatch::MissingManager
    }
}
