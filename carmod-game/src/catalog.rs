//! Read-only catalogs of swappable parts
use serde::{Deserialize, Serialize};

const DEFAULT_WHEEL_DATA: &str = include_str!("../assets/data/wheels.json");

/// A wheel model that can replace the stock wheels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelPart {
    pub id: String,
    pub name: String,
    /// Radius applied to every wheel when the part is mounted.
    pub radius: f32,
}

/// Ordered list of wheels offered to every vehicle, addressed by index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WheelCatalog {
    #[serde(default)]
    pub wheels: Vec<WheelPart>,
}

impl WheelCatalog {
    #[must_use]
    pub const fn new(wheels: Vec<WheelPart>) -> Self {
        Self { wheels }
    }

    /// Parse a catalog document of the form `{ "wheels": [...] }`.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The wheel set bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled document is malformed.
    pub fn load_from_static() -> Result<Self, serde_json::Error> {
        Self::from_json(DEFAULT_WHEEL_DATA)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&WheelPart> {
        self.wheels.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.wheels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.wheels.is_empty()
    }

    #[must_use]
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.wheels.iter().position(|wheel| wheel.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_catalog_document() {
        let catalog = WheelCatalog::from_json(
            r#"{"wheels":[{"id":"rally","name":"Rally","radius":0.34},{"id":"deep-dish","name":"Deep Dish","radius":0.37}]}"#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.position_of("deep-dish"), Some(1));
        assert!(catalog.get(2).is_none());
    }

    #[test]
    fn bundled_catalog_loads() {
        let catalog = WheelCatalog::load_from_static().unwrap();
        assert!(catalog.len() >= 3);
        assert!(catalog.wheels.iter().all(|wheel| wheel.radius > 0.0));
    }

    #[test]
    fn empty_document_is_empty_catalog() {
        let catalog = WheelCatalog::from_json("{}").unwrap();
        assert!(catalog.is_empty());
    }
}
