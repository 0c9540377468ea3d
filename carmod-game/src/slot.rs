//! Mutually exclusive cosmetic variants
use smallvec::SmallVec;

use crate::error::CustomizationError;
use crate::loadout::{NO_SELECTION, selection_to_position};

/// One selectable visual attached to the vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant<T> {
    pub name: String,
    active: bool,
    pub part: T,
}

impl<T> Variant<T> {
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }
}

/// Ordered variants of which at most one is active.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantSet<T> {
    slot: &'static str,
    variants: SmallVec<[Variant<T>; 4]>,
    selected: i32,
}

impl<T> VariantSet<T> {
    /// Build a set with every variant hidden.
    pub fn new(slot: &'static str, variants: impl IntoIterator<Item = (String, T)>) -> Self {
        let variants = variants
            .into_iter()
            .map(|(name, part)| Variant {
                name,
                active: false,
                part,
            })
            .collect();
        Self {
            slot,
            variants,
            selected: NO_SELECTION,
        }
    }

    #[must_use]
    pub const fn slot(&self) -> &'static str {
        self.slot
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Last index passed to [`Self::select`], `-1` for none.
    #[must_use]
    pub const fn selected(&self) -> i32 {
        self.selected
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variant<T>> {
        self.variants.iter()
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<&Variant<T>> {
        self.variants.get(position)
    }

    pub fn get_mut(&mut self, position: usize) -> Option<&mut Variant<T>> {
        self.variants.get_mut(position)
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.variants.iter().filter(|v| v.active).count()
    }

    /// Position of the active variant as a loadout index.
    #[must_use]
    pub fn active_index(&self) -> i32 {
        self.variants
            .iter()
            .position(|v| v.active)
            .and_then(|pos| i32::try_from(pos).ok())
            .unwrap_or(NO_SELECTION)
    }

    /// Check `index` against the variant list; `-1` maps to `None`.
    ///
    /// # Errors
    ///
    /// Returns [`CustomizationError::InvalidIndex`] for any other index outside the list.
    pub fn validate(&self, index: i32) -> Result<Option<usize>, CustomizationError> {
        if index == NO_SELECTION {
            return Ok(None);
        }
        match selection_to_position(index) {
            Some(pos) if pos < self.variants.len() => Ok(Some(pos)),
            _ => Err(CustomizationError::InvalidIndex {
                slot: self.slot,
                index,
                len: self.variants.len(),
            }),
        }
    }

    pub fn deactivate_all(&mut self) {
        for variant in &mut self.variants {
            variant.active = false;
        }
    }

    /// Hide every variant, then show the one at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CustomizationError::InvalidIndex`] and leaves the set untouched
    /// when `index` is out of range.
    pub fn select(&mut self, index: i32) -> Result<Option<usize>, CustomizationError> {
        let position = self.validate(index)?;
        self.deactivate_all();
        if let Some(pos) = position {
            self.variants[pos].active = true;
        }
        self.selected = index;
        Ok(position)
    }

    /// Re-apply a stored selection. Stale indices leave every variant hidden.
    pub fn restore(&mut self, index: i32) -> Option<usize> {
        match self.select(index) {
            Ok(position) => position,
            Err(err) => {
                log::warn!("ignoring saved selection: {err}");
                self.deactivate_all();
                self.selected = NO_SELECTION;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set() -> VariantSet<()> {
        VariantSet::new(
            "spoiler",
            ["lip", "ducktail", "wing"].map(|name| (name.to_string(), ())),
        )
    }

    #[test]
    fn new_set_has_nothing_active() {
        let set = set();
        assert_eq!(set.active_count(), 0);
        assert_eq!(set.active_index(), NO_SELECTION);
        assert_eq!(set.selected(), NO_SELECTION);
    }

    #[test]
    fn select_keeps_exactly_one_active() {
        let mut set = set();
        for index in [0, 2, 1, 1] {
            set.select(index).unwrap();
            assert_eq!(set.active_count(), 1);
            assert_eq!(set.active_index(), index);
        }
        set.select(NO_SELECTION).unwrap();
        assert_eq!(set.active_count(), 0);
    }

    #[test]
    fn out_of_range_select_changes_nothing() {
        let mut set = set();
        set.select(1).unwrap();
        let err = set.select(3).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(set.select(-2).is_err());
        assert_eq!(set.active_index(), 1);
        assert_eq!(set.selected(), 1);
    }

    #[test]
    fn restore_ignores_stale_index() {
        let mut set = set();
        set.select(0).unwrap();
        assert_eq!(set.restore(9), None);
        assert_eq!(set.active_count(), 0);
        assert_eq!(set.selected(), NO_SELECTION);
    }
}
