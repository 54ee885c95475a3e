//! Analytic contact generation for the supported shape pairs.

use nalgebra::{Point3, Vector3};
use phys_types::{Pose, Shape};

use crate::broad_phase::Aabb;

/// A single contact point between two shapes.
///
/// The normal points from the first shape toward the second; `depth` is the
/// penetration along it. Pairs separated by less than the detection margin
/// are reported with a non-positive depth, so resting contact survives
/// floating-point jitter without being resolved as penetration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactGeom {
    /// Representative contact point in world space.
    pub point: Point3<f64>,
    /// Unit normal from the first shape toward the second.
    pub normal: Vector3<f64>,
    /// Penetration depth, positive when overlapping.
    pub depth: f64,
}

/// Generate the contact between two posed shapes.
///
/// `margin` widens detection: shapes separated by up to `margin` still
/// report a contact, with `depth <= 0`.
#[must_use]
pub fn collide(
    shape_a: &Shape,
    pose_a: &Pose,
    shape_b: &Shape,
    pose_b: &Pose,
    margin: f64,
) -> Option<ContactGeom> {
    match (shape_a, shape_b) {
        (Shape::Sphere { radius: ra }, Shape::Sphere { radius: rb }) => {
            sphere_sphere(pose_a.position, *ra, pose_b.position, *rb, margin)
        }
        (Shape::Sphere { radius }, Shape::Box { half_extents }) => {
            sphere_box(pose_a.position, *radius, half_extents, pose_b, margin).map(flip)
        }
        (Shape::Box { half_extents }, Shape::Sphere { radius }) => {
            sphere_box(pose_b.position, *radius, half_extents, pose_a, margin)
        }
        (Shape::Box { .. }, Shape::Box { .. }) => box_box(shape_a, pose_a, shape_b, pose_b, margin),
    }
}

fn flip(mut contact: ContactGeom) -> ContactGeom {
    contact.normal = -contact.normal;
    contact
}

fn sphere_sphere(
    center_a: Point3<f64>,
    radius_a: f64,
    center_b: Point3<f64>,
    radius_b: f64,
    margin: f64,
) -> Option<ContactGeom> {
    let delta = center_b - center_a;
    let dist = delta.norm();
    let sum = radius_a + radius_b;
    if dist > sum + margin {
        return None;
    }
    // Coincident centers have no defined normal; fall back to +x.
    let normal = if dist > 1e-12 {
        delta / dist
    } else {
        Vector3::x()
    };
    Some(ContactGeom {
        point: center_a + normal * radius_a,
        normal,
        depth: sum - dist,
    })
}

/// Sphere against an oriented box, normal from box toward sphere.
fn sphere_box(
    center: Point3<f64>,
    radius: f64,
    half_extents: &Vector3<f64>,
    box_pose: &Pose,
    margin: f64,
) -> Option<ContactGeom> {
    let local = box_pose.inverse_transform_point(&center);
    let clamped = Point3::new(
        local.x.clamp(-half_extents.x, half_extents.x),
        local.y.clamp(-half_extents.y, half_extents.y),
        local.z.clamp(-half_extents.z, half_extents.z),
    );
    let offset = local - clamped;
    let dist = offset.norm();

    if dist > 1e-12 {
        // Sphere center outside the box.
        if dist > radius + margin {
            return None;
        }
        let normal_local = offset / dist;
        return Some(ContactGeom {
            point: box_pose.transform_point(&clamped),
            normal: box_pose.transform_vector(&normal_local),
            depth: radius - dist,
        });
    }

    // Center inside the box; push out through the nearest face.
    let gaps = [
        (half_extents.x - local.x.abs(), Vector3::x() * local.x.signum()),
        (half_extents.y - local.y.abs(), Vector3::y() * local.y.signum()),
        (half_extents.z - local.z.abs(), Vector3::z() * local.z.signum()),
    ];
    let (gap, axis) = gaps
        .iter()
        .min_by(|(ga, _), (gb, _)| ga.total_cmp(gb))
        .copied()?;
    // signum of 0.0 is 1.0, so the axis is always a unit vector.
    Some(ContactGeom {
        point: center,
        normal: box_pose.transform_vector(&axis),
        depth: gap + radius,
    })
}

/// Box against box via their world-space bounds, minimum-overlap axis.
///
/// Exact for unrotated boxes; rotated boxes collide through their bounds,
/// which overestimates contact slightly but never misses one.
fn box_box(
    shape_a: &Shape,
    pose_a: &Pose,
    shape_b: &Shape,
    pose_b: &Pose,
    margin: f64,
) -> Option<ContactGeom> {
    let aabb_a = Aabb::from_shape(shape_a, pose_a, 0.0);
    let aabb_b = Aabb::from_shape(shape_b, pose_b, 0.0);
    // Per-axis overlap, negative when the bounds are separated on that axis.
    let overlaps = [
        (aabb_a.max.x - aabb_b.min.x).min(aabb_b.max.x - aabb_a.min.x),
        (aabb_a.max.y - aabb_b.min.y).min(aabb_b.max.y - aabb_a.min.y),
        (aabb_a.max.z - aabb_b.min.z).min(aabb_b.max.z - aabb_a.min.z),
    ];
    if overlaps.iter().any(|overlap| *overlap < -margin) {
        return None;
    }
    let axis = overlaps
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, _)| i)?;
    let depth = overlaps[axis];

    let delta = pose_b.position - pose_a.position;
    let mut normal = Vector3::zeros();
    normal[axis] = if delta[axis] >= 0.0 { 1.0 } else { -1.0 };

    let mid = nalgebra::center(&pose_a.position, &pose_b.position);
    Some(ContactGeom {
        point: mid,
        normal,
        depth,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_separated_spheres_miss() {
        let a = Shape::sphere(1.0).unwrap();
        let b = Shape::sphere(1.0).unwrap();
        let contact = collide(
            &a,
            &Pose::identity(),
            &b,
            &Pose::from_position(Point3::new(3.0, 0.0, 0.0)),
            0.0,
        );
        assert!(contact.is_none());
    }

    #[test]
    fn test_margin_reports_near_contact_with_negative_depth() {
        let a = Shape::sphere(1.0).unwrap();
        let b = Shape::sphere(1.0).unwrap();
        let contact = collide(
            &a,
            &Pose::identity(),
            &b,
            &Pose::from_position(Point3::new(2.02, 0.0, 0.0)),
            0.04,
        )
        .unwrap();
        assert_relative_eq!(contact.depth, -0.02, epsilon = 1e-12);
    }

    #[test]
    fn test_overlapping_spheres_normal_and_depth() {
        let a = Shape::sphere(1.0).unwrap();
        let b = Shape::sphere(1.0).unwrap();
        let contact = collide(
            &a,
            &Pose::identity(),
            &b,
            &Pose::from_position(Point3::new(1.5, 0.0, 0.0)),
            0.0,
        )
        .unwrap();
        assert_relative_eq!(contact.normal.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(contact.depth, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_coincident_spheres_use_fallback_normal() {
        let a = Shape::sphere(1.0).unwrap();
        let contact = collide(&a, &Pose::identity(), &a, &Pose::identity(), 0.0).unwrap();
        assert_eq!(contact.normal, Vector3::x());
        assert_relative_eq!(contact.depth, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_sphere_resting_on_box() {
        // 10x1x10 slab at the origin, sphere of radius 0.5 sunk 0.1 into its top.
        let slab = Shape::box_shape(10.0, 1.0, 10.0).unwrap();
        let ball = Shape::sphere(0.5).unwrap();
        let contact = collide(
            &ball,
            &Pose::from_position(Point3::new(0.0, 0.9, 0.0)),
            &slab,
            &Pose::identity(),
            0.0,
        )
        .unwrap();
        // Normal points from the sphere toward the box, i.e. down.
        assert_relative_eq!(contact.normal.y, -1.0, epsilon = 1e-12);
        assert_relative_eq!(contact.depth, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_sphere_center_inside_box() {
        let slab = Shape::box_shape(10.0, 1.0, 10.0).unwrap();
        let ball = Shape::sphere(0.5).unwrap();
        let contact = collide(
            &slab,
            &Pose::identity(),
            &ball,
            &Pose::from_position(Point3::new(0.0, 0.4, 0.0)),
            0.0,
        )
        .unwrap();
        // Nearest face is the top; normal from box toward sphere is up.
        assert_relative_eq!(contact.normal.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(contact.depth, 0.1 + 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_box_box_min_overlap_axis() {
        let a = Shape::box_shape(2.0, 2.0, 2.0).unwrap();
        let b = Shape::box_shape(2.0, 2.0, 2.0).unwrap();
        let contact = collide(
            &a,
            &Pose::identity(),
            &b,
            &Pose::from_position(Point3::new(1.8, 0.5, 0.0)),
            0.0,
        )
        .unwrap();
        // x overlap (0.2) is smaller than y overlap (1.5).
        assert_relative_eq!(contact.normal.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(contact.depth, 0.2, epsilon = 1e-12);
    }
}
