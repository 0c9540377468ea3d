//! Carmod Customization Engine
//!
//! Platform-agnostic vehicle customization logic: paint, wheels, spoilers,
//! sirens, and performance upgrades, persisted per vehicle as a [`Loadout`].
//! This crate has no rendering, physics, or file I/O of its own; hosts plug
//! those in through [`VehicleRig`] and [`LoadoutStore`].

pub mod applier;
pub mod catalog;
pub mod color;
pub mod config;
pub mod error;
pub mod facade;
pub mod loadout;
pub mod paint;
pub mod selection;
pub mod siren;
pub mod slot;
pub mod spoiler;
pub mod store;
pub mod upgrade;
pub mod vehicle;
pub mod wheels;

use std::rc::Rc;

// Re-export commonly used types
pub use applier::{
    ApplierBuilder, ApplierHandle, AxisStatus, CustomizationApplier, CustomizationSnapshot,
    Dispatch, FittedManagers,
};
pub use catalog::{WheelCatalog, WheelPart};
pub use color::Rgba;
pub use config::{GarageConfig, PainterSpec, SpoilerSpec, SurfaceSpec, VehicleBlueprint};
pub use error::{ConfigError, CustomizationError, StoreError};
pub use facade::CustomizationFacade;
pub use loadout::{Loadout, MAX_LEVEL, NO_SELECTION};
pub use paint::{BodyColorFollower, PaintManager, Painter};
pub use selection::{SubscriptionId, VehicleChangedListener, VehicleSelection};
pub use siren::SirenManager;
pub use slot::{Variant, VariantSet};
pub use spoiler::{SpoilerManager, SpoilerPart};
pub use store::{LoadoutStore, MemoryStore};
pub use upgrade::{StatUpgrade, UpgradeCeilings, UpgradeManager, UpgradeOutcome};
pub use vehicle::{SimVehicle, StatAxis, SurfaceId, VehicleRig, VehicleStats};
pub use wheels::WheelManager;

/// A scene's worth of customizable vehicles wired to one store, one
/// selection, and one facade.
pub struct Garage<S>
where
    S: LoadoutStore + Clone + 'static,
{
    store: S,
    catalog: Rc<WheelCatalog>,
    vehicles: Vec<ApplierHandle<S>>,
    selection: VehicleSelection<S>,
    facade: Rc<CustomizationFacade<S>>,
}

impl<S> Garage<S>
where
    S: LoadoutStore + Clone + 'static,
{
    /// An empty garage. The facade is already following the selection.
    pub fn new(store: S, catalog: Rc<WheelCatalog>) -> Self {
        let mut selection = VehicleSelection::new();
        let facade = Rc::new(CustomizationFacade::new());
        facade.enable(&mut selection);
        Self {
            store,
            catalog,
            vehicles: Vec::new(),
            selection,
            facade,
        }
    }

    /// Assemble and activate every vehicle in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn from_config(
        config: &GarageConfig,
        store: S,
        catalog: Rc<WheelCatalog>,
    ) -> Result<Self, ConfigError> {
        let mut garage = Self::new(store, catalog);
        garage.vehicles = config.assemble(&garage.store, &garage.catalog)?;
        Ok(garage)
    }

    /// Assemble, activate, and add one more vehicle.
    ///
    /// # Errors
    ///
    /// Returns an error if the blueprint is invalid or its save key is taken.
    pub fn add_vehicle(
        &mut self,
        blueprint: &VehicleBlueprint,
    ) -> Result<ApplierHandle<S>, ConfigError> {
        let key = blueprint.effective_save_key();
        if let Some(owner) = self
            .vehicles
            .iter()
            .find(|vehicle| vehicle.borrow().save_key() == key)
        {
            return Err(ConfigError::DuplicateSaveKey {
                key: key.to_string(),
                first: owner.borrow().name().to_string(),
                second: blueprint.name.clone(),
            });
        }
        let handle = blueprint.assemble(self.store.clone(), &self.catalog)?;
        handle.borrow_mut().activate();
        self.vehicles.push(Rc::clone(&handle));
        Ok(handle)
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn catalog(&self) -> &WheelCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn vehicles(&self) -> &[ApplierHandle<S>] {
        &self.vehicles
    }

    #[must_use]
    pub fn vehicle(&self, name: &str) -> Option<ApplierHandle<S>> {
        self.vehicles
            .iter()
            .find(|vehicle| vehicle.borrow().name() == name)
            .cloned()
    }

    #[must_use]
    pub fn facade(&self) -> &Rc<CustomizationFacade<S>> {
        &self.facade
    }

    #[must_use]
    pub const fn selection(&self) -> &VehicleSelection<S> {
        &self.selection
    }

    pub const fn selection_mut(&mut self) -> &mut VehicleSelection<S> {
        &mut self.selection
    }

    /// Make the named vehicle active. Returns false for an unknown name.
    pub fn select(&mut self, name: &str) -> bool {
        let Some(vehicle) = self.vehicle(name) else {
            log::warn!("no vehicle named '{name}' in the garage");
            return false;
        };
        self.selection.set_active(Some(&vehicle));
        true
    }

    /// Leave every vehicle unselected.
    pub fn deselect(&mut self) {
        self.selection.set_active(None);
    }

    /// Per-frame update for every vehicle.
    pub fn tick(&self) {
        for vehicle in &self.vehicles {
            vehicle.borrow_mut().tick();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn garage() -> Garage<MemoryStore> {
        let config = GarageConfig::load_from_static().unwrap();
        let catalog = Rc::new(WheelCatalog::load_from_static().unwrap());
        Garage::from_config(&config, MemoryStore::new(), catalog).unwrap()
    }

    #[test]
    fn selecting_a_vehicle_retargets_the_facade() {
        let mut garage = garage();
        assert!(!garage.facade().has_target());
        assert!(garage.select("interceptor"));
        assert_eq!(garage.facade().siren(1).unwrap(), Dispatch::Applied);
        assert_eq!(garage.store().load("interceptor").unwrap().siren, 1);
        assert!(!garage.select("missing"));
        garage.deselect();
        assert_eq!(garage.facade().siren(0).unwrap(), Dispatch::NoTarget);
    }

    #[test]
    fn add_vehicle_rejects_taken_save_key() {
        let mut garage = garage();
        let mut blueprint = VehicleBlueprint::named("clone");
        blueprint.save_key = Some("car1".to_string());
        assert!(matches!(
            garage.add_vehicle(&blueprint),
            Err(ConfigError::DuplicateSaveKey { .. })
        ));
        let added = garage.add_vehicle(&VehicleBlueprint::named("van")).unwrap();
        assert_eq!(added.borrow().save_key(), "van");
        assert!(garage.vehicle("van").is_some());
    }
}
