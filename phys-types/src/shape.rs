//! Immutable collision shape descriptors.

use nalgebra::Vector3;

use crate::WorldError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An immutable geometric descriptor, independent of any world.
///
/// Shapes are plain values: they can be cloned and attached to any number of
/// bodies or ghost volumes, in any world. The factories validate dimensions
/// so a degenerate shape never reaches the collision pipeline.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Shape {
    /// Box with half-extents along each local axis.
    Box {
        /// Half-extents of the box in each axis.
        half_extents: Vector3<f64>,
    },
    /// Sphere with given radius.
    Sphere {
        /// Sphere radius in meters.
        radius: f64,
    },
}

impl Shape {
    /// Create a box shape from full dimensions.
    ///
    /// The stored half-extents are half the given width/height/depth.
    pub fn box_shape(width: f64, height: f64, depth: f64) -> crate::Result<Self> {
        for (name, dim) in [("width", width), ("height", height), ("depth", depth)] {
            if !(dim > 0.0) || !dim.is_finite() {
                return Err(WorldError::invalid_shape(format!(
                    "box {name} must be positive and finite, got {dim}"
                )));
            }
        }
        Ok(Self::Box {
            half_extents: Vector3::new(width * 0.5, height * 0.5, depth * 0.5),
        })
    }

    /// Create a sphere shape.
    pub fn sphere(radius: f64) -> crate::Result<Self> {
        if !(radius > 0.0) || !radius.is_finite() {
            return Err(WorldError::invalid_shape(format!(
                "sphere radius must be positive and finite, got {radius}"
            )));
        }
        Ok(Self::Sphere { radius })
    }

    /// Compute the diagonal of the local inertia tensor for the given mass.
    ///
    /// Box: `Ixx = m/12 * (dy² + dz²)` (and cyclic); solid sphere:
    /// `I = 2/5 * m * r²` on every axis.
    #[must_use]
    pub fn local_inertia(&self, mass: f64) -> Vector3<f64> {
        match self {
            Self::Box { half_extents } => {
                let x2 = 4.0 * half_extents.x * half_extents.x;
                let y2 = 4.0 * half_extents.y * half_extents.y;
                let z2 = 4.0 * half_extents.z * half_extents.z;
                Vector3::new(
                    mass * (y2 + z2) / 12.0,
                    mass * (x2 + z2) / 12.0,
                    mass * (x2 + y2) / 12.0,
                )
            }
            Self::Sphere { radius } => {
                let i = 0.4 * mass * radius * radius;
                Vector3::new(i, i, i)
            }
        }
    }

    /// Radius of the smallest sphere centered on the shape's local origin
    /// that contains it.
    #[must_use]
    pub fn bounding_radius(&self) -> f64 {
        match self {
            Self::Box { half_extents } => half_extents.norm(),
            Self::Sphere { radius } => *radius,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_box_half_extents_are_half_dimensions() {
        let shape = Shape::box_shape(2.0, 4.0, 6.0).unwrap();
        let Shape::Box { half_extents } = shape else {
            panic!("expected a box");
        };
        assert_eq!(half_extents, Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_degenerate_dimensions_rejected() {
        assert!(Shape::box_shape(0.0, 1.0, 1.0).is_err());
        assert!(Shape::box_shape(1.0, -1.0, 1.0).is_err());
        assert!(Shape::box_shape(1.0, 1.0, f64::NAN).is_err());
        assert!(Shape::sphere(0.0).is_err());
        assert!(Shape::sphere(f64::INFINITY).is_err());
    }

    #[test]
    fn test_sphere_inertia() {
        let shape = Shape::sphere(1.0).unwrap();
        let inertia = shape.local_inertia(1.0);
        // (2/5) * 1 * 1²
        assert_relative_eq!(inertia.x, 0.4, epsilon = 1e-12);
        assert_relative_eq!(inertia.y, 0.4, epsilon = 1e-12);
        assert_relative_eq!(inertia.z, 0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_box_inertia() {
        // 1x1x1 box with mass 12: I = (1/12) * 12 * (1 + 1) = 2 on each axis
        let shape = Shape::box_shape(1.0, 1.0, 1.0).unwrap();
        let inertia = shape.local_inertia(12.0);
        assert_relative_eq!(inertia.x, 2.0, epsilon = 1e-12);
    }
}
