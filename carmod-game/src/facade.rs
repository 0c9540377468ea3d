//! Stable entry point for customization UI
//!
//! The facade forwards requests to whichever vehicle is currently targeted and
//! follows the [`VehicleSelection`] when enabled. With no target every request
//! is a logged no-op.
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::applier::{ApplierHandle, CustomizationApplier, CustomizationSnapshot, Dispatch};
use crate::color::Rgba;
use crate::error::CustomizationError;
use crate::selection::{SubscriptionId, VehicleChangedListener, VehicleSelection};
use crate::store::LoadoutStore;
use crate::vehicle::StatAxis;

pub struct CustomizationFacade<S: LoadoutStore> {
    target: RefCell<Weak<RefCell<CustomizationApplier<S>>>>,
    subscription: Cell<Option<SubscriptionId>>,
}

impl<S: LoadoutStore> Default for CustomizationFacade<S> {
    fn default() -> Self {
        Self {
            target: RefCell::new(Weak::new()),
            subscription: Cell::new(None),
        }
    }
}

impl<S: LoadoutStore> std::fmt::Debug for CustomizationFacade<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomizationFacade")
            .field("has_target", &self.has_target())
            .field("subscribed", &self.subscription.get().is_some())
            .finish()
    }
}

impl<S: LoadoutStore> CustomizationFacade<S> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Route subsequent requests to `applier`.
    pub fn set_target(&self, applier: &ApplierHandle<S>) {
        *self.target.borrow_mut() = Rc::downgrade(applier);
    }

    pub fn clear_target(&self) {
        *self.target.borrow_mut() = Weak::new();
    }

    /// The targeted applier, if set and still alive.
    #[must_use]
    pub fn target(&self) -> Option<ApplierHandle<S>> {
        self.target.borrow().upgrade()
    }

    #[must_use]
    pub fn has_target(&self) -> bool {
        self.target().is_some()
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.subscription.get().is_some()
    }

    /// # Errors
    ///
    /// Propagates errors from the targeted applier.
    pub fn paint(&self, color: Rgba) -> Result<Dispatch, CustomizationError> {
        self.route("paint", |applier| applier.paint(color))
    }

    /// # Errors
    ///
    /// Propagates errors from the targeted applier.
    pub fn change_wheels(&self, index: i32) -> Result<Dispatch, CustomizationError> {
        self.route("change wheels", |applier| applier.change_wheels(index))
    }

    /// # Errors
    ///
    /// Propagates errors from the targeted applier.
    pub fn upgrade_speed(&self) -> Result<Dispatch, CustomizationError> {
        self.route("upgrade speed", |applier| applier.upgrade(StatAxis::Engine))
    }

    /// # Errors
    ///
    /// Propagates errors from the targeted applier.
    pub fn upgrade_handling(&self) -> Result<Dispatch, CustomizationError> {
        self.route("upgrade handling", |applier| {
            applier.upgrade(StatAxis::Handling)
        })
    }

    /// # Errors
    ///
    /// Propagates errors from the targeted applier.
    pub fn upgrade_brake(&self) -> Result<Dispatch, CustomizationError> {
        self.route("upgrade brake", |applier| applier.upgrade(StatAxis::Brake))
    }

    /// # Errors
    ///
    /// Propagates errors from the targeted applier.
    pub fn spoiler(&self, index: i32) -> Result<Dispatch, CustomizationError> {
        self.route("spoiler", |applier| applier.spoiler(index))
    }

    /// # Errors
    ///
    /// Propagates errors from the targeted applier.
    pub fn siren(&self, index: i32) -> Result<Dispatch, CustomizationError> {
        self.route("siren", |applier| applier.siren(index))
    }

    /// Snapshot of the targeted vehicle for display.
    #[must_use]
    pub fn snapshot(&self) -> Option<CustomizationSnapshot> {
        self.target().map(|applier| applier.borrow().snapshot())
    }

    fn route(
        &self,
        request: &str,
        apply: impl FnOnce(&mut CustomizationApplier<S>) -> Result<Dispatch, CustomizationError>,
    ) -> Result<Dispatch, CustomizationError> {
        let Some(target) = self.target() else {
            log::debug!("{request}: no vehicle targeted");
            return Ok(Dispatch::NoTarget);
        };
        let mut applier = target.borrow_mut();
        apply(&mut applier)
    }
}

impl<S: LoadoutStore + 'static> CustomizationFacade<S> {
    /// Start following the active vehicle. Enabling twice keeps one subscription.
    pub fn enable(self: &Rc<Self>, selection: &mut VehicleSelection<S>) -> SubscriptionId {
        if let Some(id) = self.subscription.get() {
            return id;
        }
        let listener: Weak<dyn VehicleChangedListener<S>> = Rc::downgrade(self) as _;
        let id = selection.subscribe(listener);
        self.subscription.set(Some(id));
        id
    }

    /// Stop following the active vehicle. The current target is kept.
    pub fn disable(&self, selection: &mut VehicleSelection<S>) {
        if let Some(id) = self.subscription.take() {
            selection.unsubscribe(id);
        }
    }
}

impl<S: LoadoutStore> VehicleChangedListener<S> for CustomizationFacade<S> {
    fn on_vehicle_changed(&self, selection: &VehicleSelection<S>) {
        match selection.active() {
            Some(applier) => {
                log::info!("customizing '{}'", applier.borrow().name());
                self.set_target(&applier);
            }
            None => {
                log::info!("no active vehicle to customize");
                self.clear_target();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::upgrade::UpgradeCeilings;
    use crate::vehicle::{SimVehicle, VehicleStats};

    fn vehicle(name: &str, store: &MemoryStore) -> ApplierHandle<MemoryStore> {
        let rig = SimVehicle::new(name, VehicleStats::default(), 0.33);
        let handle = CustomizationApplier::builder(Box::new(rig), store.clone())
            .upgrades(UpgradeCeilings::default())
            .into_handle();
        handle.borrow_mut().activate();
        handle
    }

    #[test]
    fn requests_without_target_are_noops() {
        let store = MemoryStore::new();
        let facade = CustomizationFacade::<MemoryStore>::new();
        assert_eq!(facade.paint(Rgba::BLACK).unwrap(), Dispatch::NoTarget);
        assert_eq!(facade.change_wheels(0).unwrap(), Dispatch::NoTarget);
        assert_eq!(facade.upgrade_speed().unwrap(), Dispatch::NoTarget);
        assert_eq!(facade.upgrade_handling().unwrap(), Dispatch::NoTarget);
        assert_eq!(facade.upgrade_brake().unwrap(), Dispatch::NoTarget);
        assert_eq!(facade.spoiler(0).unwrap(), Dispatch::NoTarget);
        assert_eq!(facade.siren(0).unwrap(), Dispatch::NoTarget);
        assert!(facade.snapshot().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn routes_upgrades_to_target() {
        let store = MemoryStore::new();
        let car = vehicle("car1", &store);
        let facade = CustomizationFacade::new();
        facade.set_target(&car);
        facade.upgrade_speed().unwrap();
        facade.upgrade_brake().unwrap();
        facade.upgrade_handling().unwrap();
        let saved = store.load("car1").unwrap();
        assert_eq!(
            (saved.engine_level, saved.brake_level, saved.handling_level),
            (1, 1, 1)
        );
    }

    #[test]
    fn retargets_when_active_vehicle_changes() {
        let store = MemoryStore::new();
        let first = vehicle("first", &store);
        let second = vehicle("second", &store);
        let mut selection = VehicleSelection::new();
        let facade = Rc::new(CustomizationFacade::new());
        facade.enable(&mut selection);
        facade.enable(&mut selection);
        assert_eq!(selection.subscriber_count(), 1);

        selection.set_active(Some(&first));
        facade.upgrade_speed().unwrap();
        selection.set_active(Some(&second));
        facade.upgrade_speed().unwrap();
        facade.upgrade_speed().unwrap();

        assert_eq!(first.borrow().loadout().engine_level, 1);
        assert_eq!(second.borrow().loadout().engine_level, 2);

        selection.set_active(None);
        assert!(!facade.has_target());
    }

    #[test]
    fn disabled_facade_keeps_last_target() {
        let store = MemoryStore::new();
        let first = vehicle("first", &store);
        let second = vehicle("second", &store);
        let mut selection = VehicleSelection::new();
        let facade = Rc::new(CustomizationFacade::new());
        facade.enable(&mut selection);
        selection.set_active(Some(&first));
        facade.disable(&mut selection);
        assert!(!facade.is_enabled());

        selection.set_active(Some(&second));
        let target = facade.target().unwrap();
        assert!(Rc::ptr_eq(&target, &first));
    }

    #[test]
    fn dropped_target_behaves_as_unset() {
        let store = MemoryStore::new();
        let facade = CustomizationFacade::new();
        {
            let car = vehicle("car", &store);
            facade.set_target(&car);
            assert!(facade.has_target());
        }
        assert_eq!(facade.upgrade_speed().unwrap(), Dispatch::NoTarget);
    }
}
