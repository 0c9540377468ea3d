use std::cell::Cell;
use std::rc::Rc;

use carmod_game::{
    CustomizationError, Dispatch, Garage, GarageConfig, Loadout, LoadoutStore, MemoryStore, Rgba,
    StoreError, WheelCatalog,
};

/// In-memory store that rejects writes while `read_only` is set.
#[derive(Clone, Default)]
struct ReadOnlySwitch {
    records: MemoryStore,
    read_only: Rc<Cell<bool>>,
}

impl LoadoutStore for ReadOnlySwitch {
    fn save(&self, key: &str, loadout: &Loadout) -> Result<(), StoreError> {
        if self.read_only.get() {
            return Err(StoreError::Io(std::io::Error::other("volume is read-only")));
        }
        self.records.save(key, loadout)
    }

    fn load(&self, key: &str) -> Result<Loadout, StoreError> {
        self.records.load(key)
    }

    fn contains(&self, key: &str) -> bool {
        self.records.contains(key)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.records.delete(key)
    }
}

fn bundled_garage(store: ReadOnlySwitch) -> Garage<ReadOnlySwitch> {
    let config = GarageConfig::load_from_static().expect("bundled garage parses");
    let catalog = Rc::new(WheelCatalog::load_from_static().expect("bundled wheels parse"));
    Garage::from_config(&config, store, catalog).expect("bundled garage assembles")
}

fn is_store_failure(result: Result<Dispatch, CustomizationError>) -> bool {
    matches!(result, Err(CustomizationError::Store(StoreError::Io(_))))
}

#[test]
fn facade_returns_store_failures_for_every_operation() {
    let store = ReadOnlySwitch::default();
    let mut garage = bundled_garage(store.clone());
    assert!(garage.select("car1"));
    store.read_only.set(true);

    let facade = Rc::clone(garage.facade());
    assert!(is_store_failure(facade.paint(Rgba::rgb(0.9, 0.1, 0.1))));
    assert!(is_store_failure(facade.change_wheels(1)));
    assert!(is_store_failure(facade.upgrade_speed()));
    assert!(is_store_failure(facade.upgrade_handling()));
    assert!(is_store_failure(facade.upgrade_brake()));
    assert!(is_store_failure(facade.spoiler(1)));

    assert!(garage.select("interceptor"));
    assert!(is_store_failure(facade.siren(0)));

    assert!(!store.contains("car1"));
    assert!(!store.contains("interceptor"));
}

#[test]
fn unsaved_changes_reach_the_store_once_it_recovers() {
    let store = ReadOnlySwitch::default();
    let mut garage = bundled_garage(store.clone());
    assert!(garage.select("car1"));
    let facade = Rc::clone(garage.facade());

    store.read_only.set(true);
    assert!(is_store_failure(facade.upgrade_speed()));
    let live = facade.snapshot().expect("car1 is targeted").loadout;
    assert_eq!(live.engine_level, 1);
    assert_eq!(store.load("car1").unwrap(), Loadout::default());

    store.read_only.set(false);
    assert_eq!(facade.upgrade_speed().unwrap(), Dispatch::Applied);
    assert_eq!(store.load("car1").unwrap().engine_level, 2);
}
