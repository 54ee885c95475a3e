//! Discrete stepping engine: integration, detection, resolution, sleep.
//!
//! The engine advances bodies with a fixed number of sub-steps per update.
//! Each sub-step integrates dynamic bodies with semi-implicit Euler, detects
//! contacts through the broad and narrow phases, and resolves them with
//! positional projection plus an inelastic normal impulse. Contact pairs
//! from the last sub-step are retained for the caller to collect.

use nalgebra::Vector3;
use phys_types::{ContactPair, WorldConfig};
use tracing::trace;

use crate::body::{Activation, Body, Motion};
use crate::broad_phase::{candidate_pairs, Aabb};
use crate::narrow_phase::{collide, ContactGeom};
use crate::registry::{Arena, Handle};

/// One detected contact, addressed by registry handles for resolution.
struct DetectedContact {
    a: Handle,
    b: Handle,
    geom: ContactGeom,
}

/// Fixed-sub-step discrete dynamics engine.
#[derive(Debug)]
pub struct DiscreteEngine {
    gravity: Vector3<f64>,
    contacts: Vec<ContactPair>,
}

impl DiscreteEngine {
    /// Create an engine with the given gravity.
    #[must_use]
    pub const fn new(gravity: Vector3<f64>) -> Self {
        Self {
            gravity,
            contacts: Vec::new(),
        }
    }

    /// Current gravity vector.
    #[must_use]
    pub const fn gravity(&self) -> Vector3<f64> {
        self.gravity
    }

    /// Replace the gravity vector. Takes effect on the next sub-step.
    pub fn set_gravity(&mut self, gravity: Vector3<f64>) {
        self.gravity = gravity;
    }

    /// Contact pairs detected during the most recent step.
    #[must_use]
    pub fn contacts(&self) -> &[ContactPair] {
        &self.contacts
    }

    /// Advance the world by `elapsed` seconds.
    ///
    /// The interval is divided into `config.substeps` equal sub-steps. A
    /// zero-length step is detection-only: contact reports reflect the
    /// current poses, and no pose or velocity changes when no time passes.
    pub fn step(&mut self, bodies: &mut Arena<Body>, elapsed: f64, config: &WorldConfig) {
        let substeps = config.substeps.max(1);
        let dt = if elapsed > 0.0 {
            elapsed / f64::from(substeps)
        } else {
            0.0
        };

        for _ in 0..substeps {
            self.integrate(bodies, dt);
            let detected = Self::detect(bodies, config);
            if dt > 0.0 {
                Self::resolve(bodies, &detected, config);
            }
            self.contacts = detected
                .iter()
                .filter_map(|contact| {
                    let a = bodies.get(contact.a)?.id();
                    let b = bodies.get(contact.b)?.id();
                    Some(ContactPair::new(a, b))
                })
                .collect();
        }

        Self::update_sleep(bodies, elapsed, config);
        for body in bodies.iter_mut() {
            body.force = Vector3::zeros();
        }
        trace!(
            contacts = self.contacts.len(),
            elapsed, "step complete"
        );
    }

    /// Semi-implicit Euler over the active dynamic set.
    fn integrate(&self, bodies: &mut Arena<Body>, dt: f64) {
        if dt <= 0.0 {
            return;
        }
        for body in bodies.iter_mut() {
            if body.activation == Activation::Sleeping {
                continue;
            }
            let force = body.force;
            if let Motion::Dynamic {
                velocity, inv_mass, ..
            } = &mut body.motion
            {
                *velocity += (self.gravity + force * *inv_mass) * dt;
                let step = *velocity * dt;
                body.pose.position += step;
            }
        }
    }

    /// Broad-phase sweep plus narrow-phase contact generation.
    ///
    /// Pairs with no dynamic participant are skipped: immovable geometry
    /// overlapping other immovable geometry is not a contact.
    fn detect(bodies: &Arena<Body>, config: &WorldConfig) -> Vec<DetectedContact> {
        let handles = bodies.handles();
        let mut boxes = Vec::with_capacity(handles.len());
        for &handle in &handles {
            if let Some(body) = bodies.get(handle) {
                boxes.push(Aabb::from_shape(
                    body.shape(),
                    &body.current_pose(),
                    config.contact_margin,
                ));
            }
        }

        let mut detected = Vec::new();
        for (i, j) in candidate_pairs(&boxes) {
            let (Some(a), Some(b)) = (bodies.get(handles[i]), bodies.get(handles[j])) else {
                continue;
            };
            if !a.is_dynamic() && !b.is_dynamic() {
                continue;
            }
            let geom = collide(
                a.shape(),
                &a.current_pose(),
                b.shape(),
                &b.current_pose(),
                config.contact_margin,
            );
            if let Some(geom) = geom {
                detected.push(DetectedContact {
                    a: handles[i],
                    b: handles[j],
                    geom,
                });
            }
        }
        detected
    }

    /// Positional projection split by inverse mass, then an inelastic
    /// normal impulse on approaching pairs.
    ///
    /// Margin-only contacts (non-positive depth) are reporting-only; the
    /// shapes are not actually touching yet, so nothing is moved.
    fn resolve(bodies: &mut Arena<Body>, detected: &[DetectedContact], config: &WorldConfig) {
        for contact in detected {
            if contact.geom.depth <= 0.0 {
                continue;
            }
            let Some((a, b)) = bodies.get2_mut(contact.a, contact.b) else {
                continue;
            };
            let inv_a = a.inverse_mass();
            let inv_b = b.inverse_mass();
            let inv_sum = inv_a + inv_b;
            if inv_sum <= 0.0 {
                continue;
            }

            let correction = contact.geom.normal * (contact.geom.depth / inv_sum);
            a.pose.position -= correction * inv_a;
            b.pose.position += correction * inv_b;

            // Normal points a toward b; a negative closing speed means the
            // pair is approaching.
            let closing = (b.linear_velocity() - a.linear_velocity()).dot(&contact.geom.normal);
            if closing < 0.0 {
                let impulse = -closing / inv_sum;
                if let Some(velocity) = a.velocity_mut() {
                    *velocity -= contact.geom.normal * (impulse * inv_a);
                }
                if let Some(velocity) = b.velocity_mut() {
                    *velocity += contact.geom.normal * (impulse * inv_b);
                }
                // Only a real impact wakes a sleeper; resting micro-contacts
                // must not hold bodies awake forever.
                if -closing > config.sleep_linear_threshold {
                    a.wake_up();
                    b.wake_up();
                }
            }
        }
    }

    /// Accumulate time below the speed threshold; sleep past the deadline.
    fn update_sleep(bodies: &mut Arena<Body>, elapsed: f64, config: &WorldConfig) {
        if elapsed <= 0.0 {
            return;
        }
        for body in bodies.iter_mut() {
            if body.activation != Activation::Active || !body.is_dynamic() {
                continue;
            }
            if body.linear_velocity().norm() < config.sleep_linear_threshold {
                body.sleep_time += elapsed;
                if body.sleep_time >= config.sleep_time_threshold {
                    body.put_to_sleep();
                }
            } else {
                body.sleep_time = 0.0;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;
    use phys_types::{EntityId, Pose, Shape};

    fn dynamic_sphere(id: i64, position: Point3<f64>, mass: f64) -> Body {
        let shape = Shape::sphere(0.5).unwrap();
        let inertia = shape.local_inertia(mass);
        Body::new(
            EntityId::new(id),
            shape,
            Pose::from_position(position),
            Motion::Dynamic {
                velocity: Vector3::zeros(),
                mass,
                inv_mass: 1.0 / mass,
                inertia,
            },
        )
    }

    fn static_slab(id: i64) -> Body {
        Body::new(
            EntityId::new(id),
            Shape::box_shape(10.0, 1.0, 10.0).unwrap(),
            Pose::identity(),
            Motion::Static,
        )
    }

    #[test]
    fn test_free_fall_matches_closed_form() {
        let mut bodies = Arena::new("body");
        bodies.insert(dynamic_sphere(1, Point3::new(0.0, 100.0, 0.0), 1.0));
        let config = WorldConfig::default();
        let mut engine = DiscreteEngine::new(config.gravity);

        // One second in 100 updates of 10ms.
        for _ in 0..100 {
            engine.step(&mut bodies, 0.01, &config);
        }
        let body = bodies.lookup(EntityId::new(1)).unwrap();
        // Semi-implicit Euler lands slightly below the ideal -5.0 m drop.
        let y = body.position().y;
        assert!(y < 95.1 && y > 94.8, "fell to {y}");
        assert_relative_eq!(body.linear_velocity().y, -10.0, epsilon = 0.01);
    }

    #[test]
    fn test_sphere_rests_on_slab() {
        let mut bodies = Arena::new("body");
        bodies.insert(static_slab(1));
        bodies.insert(dynamic_sphere(2, Point3::new(0.0, 3.0, 0.0), 1.0));
        let config = WorldConfig::default();
        let mut engine = DiscreteEngine::new(config.gravity);

        for _ in 0..300 {
            engine.step(&mut bodies, 0.016, &config);
        }
        let ball = bodies.lookup(EntityId::new(2)).unwrap();
        // Slab top is at y=0.5, sphere radius 0.5.
        assert_relative_eq!(ball.position().y, 1.0, epsilon = 1e-3);
        assert_eq!(ball.activation(), Activation::Sleeping);
    }

    #[test]
    fn test_zero_length_step_detects_without_moving() {
        let mut bodies = Arena::new("body");
        bodies.insert(dynamic_sphere(1, Point3::origin(), 1.0));
        bodies.insert(dynamic_sphere(2, Point3::new(0.4, 0.0, 0.0), 1.0));
        let config = WorldConfig::default();
        let mut engine = DiscreteEngine::new(config.gravity);

        // Repeated zero-length steps keep reporting the overlap and never
        // depenetrate, accelerate, or otherwise touch the pair.
        for _ in 0..3 {
            engine.step(&mut bodies, 0.0, &config);
            assert_eq!(engine.contacts().len(), 1);
            assert!(engine.contacts()[0].matches(EntityId::new(1), EntityId::new(2)));
        }
        let a = bodies.lookup(EntityId::new(1)).unwrap();
        let b = bodies.lookup(EntityId::new(2)).unwrap();
        assert_eq!(a.position(), Point3::origin());
        assert_eq!(b.position(), Point3::new(0.4, 0.0, 0.0));
        assert_eq!(a.linear_velocity(), Vector3::zeros());
    }

    #[test]
    fn test_static_pair_not_reported() {
        let mut bodies = Arena::new("body");
        bodies.insert(static_slab(1));
        bodies.insert(static_slab(2));
        let config = WorldConfig::default();
        let mut engine = DiscreteEngine::new(config.gravity);

        engine.step(&mut bodies, 0.016, &config);
        assert!(engine.contacts().is_empty());
    }

    #[test]
    fn test_applied_force_accelerates_and_clears() {
        let mut bodies = Arena::new("body");
        let handle = bodies.insert(dynamic_sphere(1, Point3::origin(), 2.0));
        let config = WorldConfig::default().with_gravity(Vector3::zeros());
        let mut engine = DiscreteEngine::new(config.gravity);

        bodies
            .get_mut(handle)
            .unwrap()
            .apply_central_force(Vector3::new(20.0, 0.0, 0.0));
        engine.step(&mut bodies, 0.1, &config);
        // a = F/m = 10 m/s² over 0.1 s.
        let body = bodies.get(handle).unwrap();
        assert_relative_eq!(body.linear_velocity().x, 1.0, epsilon = 1e-9);

        // The accumulator is cleared, so the next step coasts.
        engine.step(&mut bodies, 0.1, &config);
        let body = bodies.get(handle).unwrap();
        assert_relative_eq!(body.linear_velocity().x, 1.0, epsilon = 1e-9);
    }
}
