//! Roof sirens
use crate::error::CustomizationError;
use crate::loadout::Loadout;
use crate::slot::VariantSet;

#[derive(Debug, Clone, PartialEq)]
pub struct SirenManager {
    sirens: VariantSet<()>,
}

impl SirenManager {
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        Self {
            sirens: VariantSet::new("siren", names.into_iter().map(|name| (name, ()))),
        }
    }

    #[must_use]
    pub const fn sirens(&self) -> &VariantSet<()> {
        &self.sirens
    }

    pub fn initialize(&mut self, loadout: &Loadout) {
        if self.sirens.is_empty() {
            log::debug!("no sirens fitted; skipping saved siren {}", loadout.siren);
            return;
        }
        self.sirens.restore(loadout.siren);
    }

    /// Switch to the siren at `index` (`-1` for none) and record it.
    ///
    /// # Errors
    ///
    /// Returns [`CustomizationError::InvalidIndex`] when `index` is not a siren.
    pub fn upgrade(&mut self, index: i32, loadout: &mut Loadout) -> Result<(), CustomizationError> {
        self.sirens.select(index)?;
        loadout.siren = index;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loadout::NO_SELECTION;

    fn manager() -> SirenManager {
        SirenManager::new(["lightbar".to_string(), "dash".to_string()])
    }

    #[test]
    fn upgrade_is_exclusive() {
        let mut manager = manager();
        let mut loadout = Loadout::default();
        manager.upgrade(1, &mut loadout).unwrap();
        manager.upgrade(0, &mut loadout).unwrap();
        assert_eq!(manager.sirens().active_count(), 1);
        assert_eq!(manager.sirens().active_index(), 0);
        assert_eq!(loadout.siren, 0);
    }

    #[test]
    fn initialize_restores_saved_siren() {
        let mut manager = manager();
        let loadout = Loadout {
            siren: 1,
            ..Loadout::default()
        };
        manager.initialize(&loadout);
        assert_eq!(manager.sirens().active_index(), 1);
    }

    #[test]
    fn empty_manager_rejects_any_siren() {
        let mut manager = SirenManager::new(Vec::new());
        let mut loadout = Loadout::default();
        assert!(manager.upgrade(0, &mut loadout).is_err());
        manager.upgrade(NO_SELECTION, &mut loadout).unwrap();
        assert_eq!(loadout.siren, NO_SELECTION);
    }
}
