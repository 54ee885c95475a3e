//! Axis-aligned bounding boxes and candidate pair generation.

use nalgebra::{Point3, Vector3};
use phys_types::{Pose, Shape};

/// World-space axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3<f64>,
    /// Maximum corner.
    pub max: Point3<f64>,
}

impl Aabb {
    /// Compute the world-space box of a posed shape, padded by `margin`.
    ///
    /// Boxes under rotation use the absolute-value rotation matrix, which
    /// yields the tight bound of the rotated box without enumerating its
    /// corners.
    #[must_use]
    pub fn from_shape(shape: &Shape, pose: &Pose, margin: f64) -> Self {
        let extent = match shape {
            Shape::Sphere { radius } => Vector3::repeat(*radius),
            Shape::Box { half_extents } => {
                let rot = pose.rotation.to_rotation_matrix();
                let m = rot.matrix().abs();
                m * half_extents
            }
        };
        let pad = extent + Vector3::repeat(margin);
        Self {
            min: pose.position - pad,
            max: pose.position + pad,
        }
    }

    /// Whether two boxes overlap on every axis.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}

/// Sweep a set of boxes and return indices of overlapping pairs, `i < j`.
///
/// Quadratic over the live set. Entries are pre-filtered by the caller so the
/// pair list only carries pairs at least one side of which can respond.
#[must_use]
pub fn candidate_pairs(boxes: &[Aabb]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for i in 0..boxes.len() {
        for j in (i + 1)..boxes.len() {
            if boxes[i].overlaps(&boxes[j]) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::UnitQuaternion;

    #[test]
    fn test_sphere_aabb_is_cube() {
        let shape = Shape::sphere(2.0).unwrap();
        let pose = Pose::from_position(Point3::new(1.0, 0.0, 0.0));
        let aabb = Aabb::from_shape(&shape, &pose, 0.0);
        assert_eq!(aabb.min, Point3::new(-1.0, -2.0, -2.0));
        assert_eq!(aabb.max, Point3::new(3.0, 2.0, 2.0));
    }

    #[test]
    fn test_rotated_box_bound_grows() {
        let shape = Shape::box_shape(2.0, 2.0, 2.0).unwrap();
        let pose = Pose::from_position_rotation(
            Point3::origin(),
            UnitQuaternion::from_euler_angles(0.0, 0.0, std::f64::consts::FRAC_PI_4),
        );
        let aabb = Aabb::from_shape(&shape, &pose, 0.0);
        // A unit-half-extent box rotated 45 degrees about z spans sqrt(2) in x.
        assert_relative_eq!(aabb.max.x, std::f64::consts::SQRT_2, epsilon = 1e-12);
        assert_relative_eq!(aabb.max.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_touching_boxes_overlap() {
        let a = Aabb {
            min: Point3::new(0.0, 0.0, 0.0),
            max: Point3::new(1.0, 1.0, 1.0),
        };
        let b = Aabb {
            min: Point3::new(1.0, 0.0, 0.0),
            max: Point3::new(2.0, 1.0, 1.0),
        };
        let c = Aabb {
            min: Point3::new(1.1, 0.0, 0.0),
            max: Point3::new(2.0, 1.0, 1.0),
        };
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_candidate_pairs_sweep() {
        let shape = Shape::sphere(1.0).unwrap();
        let boxes: Vec<Aabb> = [0.0, 1.5, 10.0]
            .iter()
            .map(|&x| Aabb::from_shape(&shape, &Pose::from_position(Point3::new(x, 0.0, 0.0)), 0.0))
            .collect();
        assert_eq!(candidate_pairs(&boxes), vec![(0, 1)]);
    }
}
