//! Analytic ray intersection against the supported shapes.

use nalgebra::{Point3, Vector3};
use phys_types::{Pose, Shape};

/// Intersection of a ray with a single shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Parametric distance along the segment, in `[0, 1]`.
    pub toi: f64,
    /// Hit point in world space.
    pub point: Point3<f64>,
}

/// Intersect the segment `origin..end` with a posed shape.
///
/// Returns the earliest hit inside the segment. A degenerate segment
/// (`origin == end`) never hits anything.
#[must_use]
pub fn raycast_shape(
    origin: &Point3<f64>,
    end: &Point3<f64>,
    shape: &Shape,
    pose: &Pose,
) -> Option<RayHit> {
    let dir = end - origin;
    if dir.norm_squared() < 1e-24 {
        return None;
    }
    let toi = match shape {
        Shape::Sphere { radius } => ray_sphere(origin, &dir, &pose.position, *radius)?,
        Shape::Box { half_extents } => {
            // Slab test in the box's local frame.
            let local_origin = pose.inverse_transform_point(origin);
            let local_dir = pose.inverse_transform_vector(&dir);
            ray_box(&local_origin, &local_dir, half_extents)?
        }
    };
    if !(0.0..=1.0).contains(&toi) {
        return None;
    }
    Some(RayHit {
        toi,
        point: origin + dir * toi,
    })
}

/// Earliest non-negative `t` with `|origin + t*dir - center| = radius`.
fn ray_sphere(
    origin: &Point3<f64>,
    dir: &Vector3<f64>,
    center: &Point3<f64>,
    radius: f64,
) -> Option<f64> {
    let oc = origin - center;
    let a = dir.norm_squared();
    let half_b = oc.dot(dir);
    let c = oc.norm_squared() - radius * radius;
    let discriminant = half_b * half_b - a * c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt_d = discriminant.sqrt();
    let t = (-half_b - sqrt_d) / a;
    if t >= 0.0 {
        return Some(t);
    }
    // Origin inside the sphere; report the exit point.
    let t = (-half_b + sqrt_d) / a;
    (t >= 0.0).then_some(t)
}

/// Slab test against an origin-centered box in its local frame.
fn ray_box(origin: &Point3<f64>, dir: &Vector3<f64>, half_extents: &Vector3<f64>) -> Option<f64> {
    let mut t_enter = f64::NEG_INFINITY;
    let mut t_exit = f64::INFINITY;
    for axis in 0..3 {
        if dir[axis].abs() < 1e-12 {
            if origin[axis].abs() > half_extents[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / dir[axis];
        let t0 = (-half_extents[axis] - origin[axis]) * inv;
        let t1 = (half_extents[axis] - origin[axis]) * inv;
        let (near, far) = if t0 < t1 { (t0, t1) } else { (t1, t0) };
        t_enter = t_enter.max(near);
        t_exit = t_exit.min(far);
        if t_enter > t_exit {
            return None;
        }
    }
    if t_exit < 0.0 {
        return None;
    }
    Some(if t_enter >= 0.0 { t_enter } else { t_exit })
}
