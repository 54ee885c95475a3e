//! Core types for the physics world layer.
//!
//! This crate provides the foundational types shared by the world layer and
//! its embedders:
//!
//! - [`EntityId`] - Caller-assigned identifiers for bodies and ghost volumes
//! - [`Pose`] - Position and orientation of a collision participant
//! - [`Shape`] - Immutable geometric descriptors (box, sphere)
//! - [`ContactPair`] / [`GhostOverlap`] - Per-step collision events
//! - [`WorldConfig`] - Gravity, sub-stepping, sleep thresholds
//! - [`WorldError`] - The error taxonomy of the world layer
//!
//! # Design Philosophy
//!
//! These types are **pure data**. They have no simulation behavior; they are
//! the common language between the world layer, the embedding application,
//! and whatever consumes collision reports. Identifiers in particular flow
//! outward unchanged: the world never invents ids, it only echoes back the
//! values the caller assigned at creation time.
//!
//! # Example
//!
//! ```
//! use phys_types::{EntityId, Pose, Shape};
//! use nalgebra::Point3;
//!
//! let id = EntityId::new(42);
//! assert!(id.is_assignable());
//!
//! let shape = Shape::box_shape(2.0, 2.0, 2.0).unwrap();
//! let pose = Pose::from_position(Point3::new(0.0, 1.0, 0.0));
//! assert!(pose.is_finite());
//! assert!(shape.bounding_radius() > 1.7);
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
// Allow certain clippy lints that are overly pedantic for type definitions
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::missing_errors_doc,       // Error docs added where non-obvious
    clippy::suboptimal_flops          // mul_add style changes aren't always clearer
)]

mod config;
mod error;
mod events;
mod id;
mod pose;
mod shape;

pub use config::WorldConfig;
pub use error::WorldError;
pub use events::{ContactPair, GhostOverlap};
pub use id::EntityId;
pub use pose::Pose;
pub use shape::Shape;

// Re-export math types for convenience
pub use nalgebra::{Point3, UnitQuaternion, Vector3};

/// Result type for world-layer operations.
pub type Result<T> = std::result::Result<T, WorldError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_creation_boundary_validation() {
        // The two out-of-band values are rejected everywhere an id is assigned.
        assert!(EntityId::new(0).ensure_assignable().is_err());
        assert!(EntityId::new(-1).ensure_assignable().is_err());
        assert!(EntityId::new(1).ensure_assignable().is_ok());
    }

    #[test]
    fn test_shape_and_pose_roundtrip() {
        let shape = Shape::sphere(0.5).unwrap();
        let pose = Pose::from_position(Point3::new(1.0, 2.0, 3.0));
        let local = Point3::origin();
        assert_eq!(pose.transform_point(&local), Point3::new(1.0, 2.0, 3.0));
        assert_eq!(shape.bounding_radius(), 0.5);
    }
}
