//! Error taxonomy of the world layer.

use thiserror::Error;

/// Errors reported by the world layer.
///
/// Every fallible operation in the world layer returns this type. Creation
/// boundaries validate their inputs eagerly so that later steps can assume
/// well-formed entities and stay infallible.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorldError {
    /// A handle referred to a slot that has been freed or reused.
    #[error("stale {kind} handle at index {index}")]
    StaleHandle {
        /// Which registry the handle belonged to ("body" or "ghost").
        kind: &'static str,
        /// Slot index carried by the stale handle.
        index: u32,
    },

    /// A builder was finalized without an identifier.
    #[error("an entity identifier must be provided before building")]
    IdNotProvided,

    /// A builder was finalized without a collision shape.
    #[error("a collision shape must be provided before building")]
    ShapeNotProvided,

    /// An out-of-band identifier value was used at a creation boundary.
    #[error("identifier {0} is reserved and cannot be assigned to an entity")]
    ReservedIdentifier(i64),

    /// A shape factory was given degenerate dimensions.
    #[error("invalid shape: {reason}")]
    InvalidShape {
        /// Human-readable description of the offending dimension.
        reason: String,
    },

    /// A dynamic body was given a non-positive or non-finite mass.
    #[error("invalid mass {0}: must be positive and finite")]
    InvalidMass(f64),

    /// A world configuration failed validation.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the offending field.
        reason: String,
    },
}

impl WorldError {
    /// Create an [`WorldError::InvalidShape`] error.
    pub fn invalid_shape(reason: impl Into<String>) -> Self {
        Self::InvalidShape {
            reason: reason.into(),
        }
    }

    /// Create an [`WorldError::InvalidConfig`] error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create an [`WorldError::StaleHandle`] error.
    #[must_use]
    pub const fn stale_handle(kind: &'static str, index: u32) -> Self {
        Self::StaleHandle { kind, index }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WorldError::stale_handle("body", 3);
        assert_eq!(err.to_string(), "stale body handle at index 3");

        let err = WorldError::InvalidMass(-1.0);
        assert!(err.to_string().contains("-1"));

        let err = WorldError::invalid_shape("zero radius");
        assert_eq!(err.to_string(), "invalid shape: zero radius");
    }

    #[test]
    fn test_errors_compare_by_value() {
        assert_eq!(
            WorldError::ReservedIdentifier(0),
            WorldError::ReservedIdentifier(0)
        );
        assert_ne!(WorldError::IdNotProvided, WorldError::ShapeNotProvided);
    }
}
