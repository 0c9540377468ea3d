//! Garage and wheel catalog the scenarios run against
use std::fs;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use carmod_game::{Garage, GarageConfig, WheelCatalog};

use crate::storage::TesterStore;

#[derive(Debug, Clone)]
pub struct TesterAssets {
    garage: GarageConfig,
    wheels: Rc<WheelCatalog>,
}

impl TesterAssets {
    /// Bundled assets, each optionally replaced by a file.
    ///
    /// # Errors
    ///
    /// Returns an error if an override cannot be read or fails validation.
    pub fn load(garage_path: Option<&Path>, wheels_path: Option<&Path>) -> Result<Self> {
        let garage = match garage_path {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("failed to read garage {}", path.display()))?;
                GarageConfig::from_json(&raw)
                    .with_context(|| format!("invalid garage {}", path.display()))?
            }
            None => GarageConfig::load_from_static().context("bundled garage is invalid")?,
        };
        let wheels = match wheels_path {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("failed to read wheels {}", path.display()))?;
                WheelCatalog::from_json(&raw)
                    .with_context(|| format!("invalid wheel catalog {}", path.display()))?
            }
            None => WheelCatalog::load_from_static().context("bundled wheels are invalid")?,
        };
        log::info!(
            "loaded {} vehicle blueprint(s) and {} wheel(s)",
            garage.vehicles.len(),
            wheels.len()
        );
        Ok(Self {
            garage,
            wheels: Rc::new(wheels),
        })
    }

    #[must_use]
    pub const fn garage(&self) -> &GarageConfig {
        &self.garage
    }

    #[must_use]
    pub fn wheels(&self) -> &WheelCatalog {
        &self.wheels
    }

    /// Assemble and activate the whole garage against `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the garage cannot be assembled.
    pub fn assemble(&self, store: TesterStore) -> Result<Garage<TesterStore>> {
        Garage::from_config(&self.garage, store, Rc::clone(&self.wheels))
            .context("failed to assemble garage")
    }
}
