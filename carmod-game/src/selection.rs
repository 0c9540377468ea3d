//! Active-vehicle selection and its change broadcast
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use crate::applier::{ApplierHandle, CustomizationApplier};
use crate::store::LoadoutStore;

/// Token returned by [`VehicleSelection::subscribe`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Receives "active vehicle changed" notifications.
///
/// The notification carries no payload; listeners query `selection` for the
/// new active vehicle.
pub trait VehicleChangedListener<S: LoadoutStore> {
    fn on_vehicle_changed(&self, selection: &VehicleSelection<S>);
}

type Listener<S> = Weak<dyn VehicleChangedListener<S>>;

/// Tracks which vehicle the player currently drives.
///
/// Vehicles stay owned by the host; the selection only keeps weak references.
pub struct VehicleSelection<S: LoadoutStore> {
    active: Option<Weak<std::cell::RefCell<CustomizationApplier<S>>>>,
    listeners: SmallVec<[(SubscriptionId, Listener<S>); 2]>,
    next_id: u64,
}

impl<S: LoadoutStore> Default for VehicleSelection<S> {
    fn default() -> Self {
        Self {
            active: None,
            listeners: SmallVec::new(),
            next_id: 0,
        }
    }
}

impl<S: LoadoutStore> std::fmt::Debug for VehicleSelection<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VehicleSelection")
            .field("has_active", &self.active().is_some())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<S: LoadoutStore> VehicleSelection<S> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The active vehicle, if one is set and still alive.
    #[must_use]
    pub fn active(&self) -> Option<ApplierHandle<S>> {
        self.active.as_ref().and_then(Weak::upgrade)
    }

    /// Make `vehicle` the active one. Listeners are notified only when the
    /// active vehicle actually changes; returns whether it did.
    pub fn set_active(&mut self, vehicle: Option<&ApplierHandle<S>>) -> bool {
        let current = self.active();
        let unchanged = match (&current, vehicle) {
            (Some(current), Some(next)) => Rc::ptr_eq(current, next),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return false;
        }
        self.active = vehicle.map(Rc::downgrade);
        self.broadcast();
        true
    }

    /// Register a listener. Dropped listeners are pruned on the next broadcast.
    pub fn subscribe(&mut self, listener: Listener<S>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Remove a listener. Returns false for an unknown id.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    fn broadcast(&mut self) {
        self.listeners
            .retain(|(_, listener)| listener.strong_count() > 0);
        let live: SmallVec<[Rc<dyn VehicleChangedListener<S>>; 2]> = self
            .listeners
            .iter()
            .filter_map(|(_, listener)| listener.upgrade())
            .collect();
        log::debug!("active vehicle changed; notifying {} listener(s)", live.len());
        for listener in live {
            listener.on_vehicle_changed(self);
        }
    }
}
