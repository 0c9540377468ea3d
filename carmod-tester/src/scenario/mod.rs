use anyhow::{Context, Result};
use carmod_game::{ApplierHandle, FittedManagers, Garage, LoadoutStore};
use colored::Colorize;

use crate::assets::TesterAssets;
use crate::storage::TesterStore;

pub mod catalog;

pub use catalog::{get_scenario, list_scenarios};

pub type VehicleHandle = ApplierHandle<TesterStore>;

/// A scripted customization check.
#[derive(Clone, Copy)]
pub struct Scenario {
    pub key: &'static str,
    pub description: &'static str,
    pub run: fn(&mut ScenarioCtx<'_>) -> Result<()>,
}

/// Live garage plus bookkeeping for one scenario run.
pub struct ScenarioCtx<'a> {
    assets: &'a TesterAssets,
    store: TesterStore,
    garage: Garage<TesterStore>,
    verbose: bool,
    steps: Vec<String>,
}

impl<'a> ScenarioCtx<'a> {
    /// Assemble the garage against `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the garage cannot be assembled.
    pub fn new(assets: &'a TesterAssets, store: TesterStore, verbose: bool) -> Result<Self> {
        let garage = assets.assemble(store.clone())?;
        Ok(Self {
            assets,
            store,
            garage,
            verbose,
            steps: Vec::new(),
        })
    }

    pub const fn assets(&self) -> &TesterAssets {
        self.assets
    }

    pub const fn store(&self) -> &TesterStore {
        &self.store
    }

    pub const fn garage(&self) -> &Garage<TesterStore> {
        &self.garage
    }

    pub const fn garage_mut(&mut self) -> &mut Garage<TesterStore> {
        &mut self.garage
    }

    /// Throw the garage away and build it again from what was persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reopened or the garage rebuilt.
    pub fn restart(&mut self) -> Result<()> {
        self.store = self.store.reopen().context("failed to reopen store")?;
        self.garage = self.assets.assemble(self.store.clone())?;
        self.step("restarted garage from persisted loadouts");
        Ok(())
    }

    /// Names of vehicles fitted with what `fits` asks for, in garage order.
    pub fn vehicles_with(&self, fits: impl Fn(FittedManagers) -> bool) -> Vec<String> {
        self.garage
            .vehicles()
            .iter()
            .filter(|vehicle| fits(vehicle.borrow().fitted()))
            .map(|vehicle| vehicle.borrow().name().to_string())
            .collect()
    }

    /// First vehicle fitted with what `fits` asks for.
    ///
    /// # Errors
    ///
    /// Returns an error naming `capability` when no vehicle qualifies.
    pub fn pick_vehicle(
        &self,
        capability: &str,
        fits: impl Fn(FittedManagers) -> bool,
    ) -> Result<String> {
        self.vehicles_with(fits)
            .into_iter()
            .next()
            .with_context(|| format!("garage has no vehicle with {capability}"))
    }

    /// # Errors
    ///
    /// Returns an error if the garage has no vehicle called `name`.
    pub fn vehicle(&self, name: &str) -> Result<VehicleHandle> {
        self.garage
            .vehicle(name)
            .with_context(|| format!("vehicle '{name}' is not in the garage"))
    }

    /// Make `name` the active vehicle.
    ///
    /// # Errors
    ///
    /// Returns an error if the garage has no vehicle called `name`.
    pub fn select(&mut self, name: &str) -> Result<VehicleHandle> {
        anyhow::ensure!(self.garage.select(name), "cannot select '{name}'");
        self.step(format!("selected '{name}'"));
        self.vehicle(name)
    }

    /// Persisted loadout of `vehicle`, read straight from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be read.
    pub fn persisted(&self, vehicle: &VehicleHandle) -> Result<carmod_game::Loadout> {
        let key = vehicle.borrow().save_key().to_string();
        self.store
            .load(&key)
            .with_context(|| format!("failed to load '{key}'"))
    }

    pub fn step(&mut self, message: impl Into<String>) {
        let message = message.into();
        if self.verbose {
            println!("   {} {}", "→".bright_black(), message);
        }
        self.steps.push(message);
    }

    pub fn into_steps(self) -> Vec<String> {
        self.steps
    }
}
