//! Vehicle blueprints and garage configuration
use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::applier::{ApplierHandle, CustomizationApplier};
use crate::catalog::WheelCatalog;
use crate::color::Rgba;
use crate::error::ConfigError;
use crate::paint::{PaintManager, Painter};
use crate::siren::SirenManager;
use crate::spoiler::{SpoilerManager, SpoilerPart};
use crate::store::LoadoutStore;
use crate::upgrade::{UpgradeCeilings, default_headroom};
use crate::vehicle::{SimVehicle, StatAxis, SurfaceId, VehicleStats};
use crate::wheels::WheelManager;

const DEFAULT_GARAGE_DATA: &str = include_str!("../assets/data/garage.json");

/// A named renderer and the colours its materials are authored with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSpec {
    pub name: String,
    #[serde(default = "SurfaceSpec::default_colors")]
    pub colors: Vec<Rgba>,
}

impl SurfaceSpec {
    fn default_colors() -> Vec<Rgba> {
        vec![Rgba::WHITE]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PainterSpec {
    /// Surface name; a painter without one logs instead of painting.
    #[serde(default)]
    pub surface: Option<String>,
    #[serde(default)]
    pub material: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpoilerSpec {
    pub name: String,
    #[serde(default)]
    pub surface: Option<String>,
    #[serde(default)]
    pub material: Option<usize>,
}

/// Everything needed to compose one vehicle and its customization managers.
///
/// Managers are fitted only when configured: painters, spoilers, and sirens
/// when their lists are non-empty, wheels when `wheels` is set, and upgrades
/// when `upgrades` is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleBlueprint {
    pub name: String,
    /// Persistence key; the vehicle name when absent.
    #[serde(default)]
    pub save_key: Option<String>,
    #[serde(default = "VehicleBlueprint::default_auto_load")]
    pub auto_load: bool,
    #[serde(default)]
    pub stats: VehicleStats,
    #[serde(default = "VehicleBlueprint::default_wheel_radius")]
    pub wheel_radius: f32,
    #[serde(default)]
    pub surfaces: Vec<SurfaceSpec>,
    #[serde(default)]
    pub painters: Vec<PainterSpec>,
    #[serde(default)]
    pub spoilers: Vec<SpoilerSpec>,
    #[serde(default = "VehicleBlueprint::default_paint_spoilers")]
    pub paint_spoilers: bool,
    #[serde(default)]
    pub sirens: Vec<String>,
    #[serde(default)]
    pub wheels: bool,
    #[serde(default = "VehicleBlueprint::default_apply_wheel_radius")]
    pub apply_wheel_radius: bool,
    #[serde(default)]
    pub upgrades: Option<UpgradeCeilings>,
}

impl VehicleBlueprint {
    const fn default_auto_load() -> bool {
        true
    }

    const fn default_wheel_radius() -> f32 {
        0.33
    }

    const fn default_paint_spoilers() -> bool {
        true
    }

    const fn default_apply_wheel_radius() -> bool {
        true
    }

    /// A bare vehicle with default stats and no managers.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            save_key: None,
            auto_load: Self::default_auto_load(),
            stats: VehicleStats::default(),
            wheel_radius: Self::default_wheel_radius(),
            surfaces: Vec::new(),
            painters: Vec::new(),
            spoilers: Vec::new(),
            paint_spoilers: Self::default_paint_spoilers(),
            sirens: Vec::new(),
            wheels: false,
            apply_wheel_radius: Self::default_apply_wheel_radius(),
            upgrades: None,
        }
    }

    #[must_use]
    pub fn effective_save_key(&self) -> &str {
        self.save_key.as_deref().unwrap_or(&self.name)
    }

    /// Check surface references, material ranges, save key, and ceilings.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.effective_save_key().trim().is_empty() {
            return Err(ConfigError::EmptySaveKey {
                vehicle: self.name.clone(),
            });
        }
        for painter in &self.painters {
            if let Some(surface) = &painter.surface {
                self.check_material(surface, painter.material)?;
            }
        }
        for spoiler in &self.spoilers {
            if let (Some(surface), Some(material)) = (&spoiler.surface, spoiler.material) {
                self.check_material(surface, material)?;
            }
        }
        if let Some(ceilings) = &self.upgrades {
            for axis in StatAxis::ALL {
                let base = self.base_stat(axis);
                if let Some(ceiling) = ceilings.get(axis)
                    && ceiling < base
                {
                    return Err(ConfigError::CeilingBelowBase {
                        vehicle: self.name.clone(),
                        axis: axis.label(),
                        base,
                        ceiling,
                    });
                }
            }
        }
        Ok(())
    }

    /// Effective ceiling for `axis`, or `None` when upgrades are not fitted.
    #[must_use]
    pub fn ceiling(&self, axis: StatAxis) -> Option<f32> {
        let ceilings = self.upgrades.as_ref()?;
        Some(
            ceilings
                .get(axis)
                .unwrap_or_else(|| self.base_stat(axis) + default_headroom(axis)),
        )
    }

    /// Build the simulated vehicle and compose its applier. The applier is
    /// not activated.
    ///
    /// # Errors
    ///
    /// Returns an error if the blueprint fails validation.
    pub fn assemble<S: LoadoutStore>(
        &self,
        store: S,
        catalog: &Rc<WheelCatalog>,
    ) -> Result<ApplierHandle<S>, ConfigError> {
        self.validate()?;
        let mut rig = SimVehicle::new(&self.name, self.stats, self.wheel_radius);
        let surfaces: HashMap<&str, SurfaceId> = self
            .surfaces
            .iter()
            .map(|spec| (spec.name.as_str(), rig.add_surface(&spec.name, spec.colors.clone())))
            .collect();
        let resolve = |name: &Option<String>| {
            name.as_deref()
                .and_then(|name| surfaces.get(name).copied())
        };

        let mut builder = CustomizationApplier::builder(Box::new(rig), store)
            .save_key(self.effective_save_key())
            .auto_load(self.auto_load);
        if !self.painters.is_empty() {
            let painters = self
                .painters
                .iter()
                .map(|spec| Painter {
                    surface: resolve(&spec.surface),
                    material: spec.material,
                })
                .collect();
            builder = builder.paint(PaintManager::new(painters));
        }
        if self.wheels {
            builder = builder.wheels(WheelManager::new(
                Rc::clone(catalog),
                self.apply_wheel_radius,
            ));
        }
        if let Some(ceilings) = self.upgrades {
            builder = builder.upgrades(ceilings);
        }
        if !self.spoilers.is_empty() {
            let spoilers = self.spoilers.iter().map(|spec| {
                (
                    spec.name.clone(),
                    SpoilerPart {
                        surface: resolve(&spec.surface),
                        material: spec.material,
                    },
                )
            });
            builder = builder.spoilers(SpoilerManager::new(spoilers, self.paint_spoilers));
        }
        if !self.sirens.is_empty() {
            builder = builder.sirens(SirenManager::new(self.sirens.iter().cloned()));
        }
        Ok(builder.into_handle())
    }

    const fn base_stat(&self, axis: StatAxis) -> f32 {
        match axis {
            StatAxis::Engine => self.stats.engine_torque,
            StatAxis::Brake => self.stats.brake_torque,
            StatAxis::Handling => self.stats.traction_helper,
        }
    }

    fn check_material(&self, surface: &str, material: usize) -> Result<(), ConfigError> {
        let Some(spec) = self.surfaces.iter().find(|spec| spec.name == surface) else {
            return Err(ConfigError::UnknownSurface {
                vehicle: self.name.clone(),
                surface: surface.to_string(),
            });
        };
        if material >= spec.colors.len() {
            return Err(ConfigError::MaterialOutOfRange {
                vehicle: self.name.clone(),
                surface: surface.to_string(),
                index: material,
                count: spec.colors.len(),
            });
        }
        Ok(())
    }
}

/// Every vehicle in the scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GarageConfig {
    #[serde(default)]
    pub vehicles: Vec<VehicleBlueprint>,
}

impl GarageConfig {
    /// Parse and validate a garage document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or fails validation.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// The garage bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled document is malformed or invalid.
    pub fn load_from_static() -> Result<Self, ConfigError> {
        Self::from_json(DEFAULT_GARAGE_DATA)
    }

    /// Validate every blueprint and reject save keys shared between vehicles.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut owners: HashMap<&str, &str> = HashMap::new();
        for blueprint in &self.vehicles {
            blueprint.validate()?;
            let key = blueprint.effective_save_key();
            if let Some(first) = owners.insert(key, &blueprint.name) {
                return Err(ConfigError::DuplicateSaveKey {
                    key: key.to_string(),
                    first: first.to_string(),
                    second: blueprint.name.clone(),
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn vehicle(&self, name: &str) -> Option<&VehicleBlueprint> {
        self.vehicles.iter().find(|blueprint| blueprint.name == name)
    }

    /// Assemble and activate every vehicle against one shared store.
    ///
    /// # Errors
    ///
    /// Returns an error if the garage fails validation.
    pub fn assemble<S: LoadoutStore + Clone>(
        &self,
        store: &S,
        catalog: &Rc<WheelCatalog>,
    ) -> Result<Vec<ApplierHandle<S>>, ConfigError> {
        self.validate()?;
        let mut handles = Vec::with_capacity(self.vehicles.len());
        for blueprint in &self.vehicles {
            let handle = blueprint.assemble(store.clone(), catalog)?;
            handle.borrow_mut().activate();
            handles.push(handle);
        }
        log::info!("assembled {} vehicle(s)", handles.len());
        Ok(handles)
    }
}
