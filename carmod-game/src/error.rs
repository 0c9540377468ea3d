//! Error types shared across the customization engine
use thiserror::Error;

/// Failures raised by a [`crate::LoadoutStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode loadout: {0}")]
    Encode(serde_json::Error),
    #[error("stored loadout under '{key}' is unreadable: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors returned to callers of customization operations.
#[derive(Debug, Error)]
pub enum CustomizationError {
    #[error("{slot} index {index} is out of range (0..{len} or -1)")]
    InvalidIndex {
        slot: &'static str,
        index: i32,
        len: usize,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CustomizationError {
    /// True when the caller supplied a bad argument rather than the store failing.
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidIndex { .. })
    }
}

/// Errors raised when vehicle or garage configuration invariants are violated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("vehicles '{first}' and '{second}' share save key '{key}'")]
    DuplicateSaveKey {
        key: String,
        first: String,
        second: String,
    },
    #[error("vehicle '{vehicle}' has an empty save key")]
    EmptySaveKey { vehicle: String },
    #[error("vehicle '{vehicle}' references unknown surface '{surface}'")]
    UnknownSurface { vehicle: String, surface: String },
    #[error("vehicle '{vehicle}' surface '{surface}' has no material {index} (has {count})")]
    MaterialOutOfRange {
        vehicle: String,
        surface: String,
        index: usize,
        count: usize,
    },
    #[error("vehicle '{vehicle}' {axis} ceiling {ceiling:.2} is below its base {base:.2}")]
    CeilingBelowBase {
        vehicle: String,
        axis: &'static str,
        base: f32,
        ceiling: f32,
    },
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_index_message_names_slot() {
        let err = CustomizationError::InvalidIndex {
            slot: "spoiler",
            index: 7,
            len: 3,
        };
        assert!(err.is_invalid_argument());
        assert_eq!(
            err.to_string(),
            "spoiler index 7 is out of range (0..3 or -1)"
        );
    }

    #[test]
    fn store_errors_are_not_invalid_arguments() {
        let err = CustomizationError::from(StoreError::Io(std::io::Error::other("disk full")));
        assert!(!err.is_invalid_argument());
        assert!(err.to_string().contains("disk full"));
    }
}
