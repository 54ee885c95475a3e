//! Rigid bodies and ghost volumes as stored by the world.

use nalgebra::{Point3, Vector3};
use phys_types::{EntityId, Pose, Shape};

use crate::registry::Identified;

/// Simulation discipline of a rigid body.
///
/// The discipline is a property of the body value itself rather than a
/// family of body subtypes, so stepping code can match on it instead of
/// downcasting.
#[derive(Debug, Clone, PartialEq)]
pub enum Motion {
    /// Never moves. Participates in collision as an immovable obstacle.
    Static,
    /// Moved only by the caller. The engine reads the target pose but never
    /// integrates it.
    Kinematic {
        /// Pose the caller last assigned; the collision pass reads this.
        target: Pose,
    },
    /// Fully simulated: integrated, collided, resolved.
    Dynamic {
        /// Linear velocity in m/s.
        velocity: Vector3<f64>,
        /// Mass in kg, positive and finite.
        mass: f64,
        /// Cached reciprocal of the mass.
        inv_mass: f64,
        /// Diagonal of the local inertia tensor for this body's shape.
        inertia: Vector3<f64>,
    },
}

/// Activation state of a dynamic body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Simulated every sub-step.
    Active,
    /// Skipped by integration until a contact wakes it.
    Sleeping,
    /// Never allowed to sleep. Kinematic bodies use this so caller-driven
    /// motion keeps colliding.
    AlwaysActive,
}

/// A solid collision participant owned by the world.
#[derive(Debug)]
pub struct Body {
    id: EntityId,
    shape: Shape,
    /// Simulated pose. For kinematic bodies this trails `Motion::Kinematic`'s
    /// target and is not authoritative.
    pub(crate) pose: Pose,
    pub(crate) motion: Motion,
    pub(crate) activation: Activation,
    /// Force accumulator, cleared after every update.
    pub(crate) force: Vector3<f64>,
    /// Seconds spent continuously below the sleep speed threshold.
    pub(crate) sleep_time: f64,
}

impl Body {
    pub(crate) fn new(id: EntityId, shape: Shape, pose: Pose, motion: Motion) -> Self {
        let activation = match motion {
            // Static bodies start asleep, as an immovable obstacle has
            // nothing to integrate.
            Motion::Static => Activation::Sleeping,
            Motion::Kinematic { .. } => Activation::AlwaysActive,
            Motion::Dynamic { .. } => Activation::Active,
        };
        Self {
            id,
            shape,
            pose,
            motion,
            activation,
            force: Vector3::zeros(),
            sleep_time: 0.0,
        }
    }

    /// Caller-assigned identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Collision shape.
    #[must_use]
    pub const fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Pose the collision pass and all queries see.
    ///
    /// Kinematic bodies report their caller-assigned target, so a position
    /// written through the world is readable back immediately, without
    /// waiting for a step.
    #[must_use]
    pub fn current_pose(&self) -> Pose {
        match &self.motion {
            Motion::Kinematic { target } => *target,
            _ => self.pose,
        }
    }

    /// World-space position, from [`current_pose`](Self::current_pose).
    #[must_use]
    pub fn position(&self) -> Point3<f64> {
        self.current_pose().position
    }

    /// Simulation discipline.
    #[must_use]
    pub const fn motion(&self) -> &Motion {
        &self.motion
    }

    /// Whether this body is fully simulated.
    #[must_use]
    pub const fn is_dynamic(&self) -> bool {
        matches!(self.motion, Motion::Dynamic { .. })
    }

    /// Activation state.
    #[must_use]
    pub const fn activation(&self) -> Activation {
        self.activation
    }

    /// Reciprocal mass; zero for static and kinematic bodies.
    #[must_use]
    pub fn inverse_mass(&self) -> f64 {
        match &self.motion {
            Motion::Dynamic { inv_mass, .. } => *inv_mass,
            _ => 0.0,
        }
    }

    /// Mass in kg; zero for static and kinematic bodies, which are
    /// massless as far as the dynamics pass is concerned.
    #[must_use]
    pub fn mass(&self) -> f64 {
        match &self.motion {
            Motion::Dynamic { mass, .. } => *mass,
            _ => 0.0,
        }
    }

    /// Diagonal of the local inertia tensor derived from the shape and
    /// mass at creation; zero for static and kinematic bodies.
    #[must_use]
    pub fn local_inertia(&self) -> Vector3<f64> {
        match &self.motion {
            Motion::Dynamic { inertia, .. } => *inertia,
            _ => Vector3::zeros(),
        }
    }

    /// Linear velocity; zero for static and kinematic bodies.
    #[must_use]
    pub fn linear_velocity(&self) -> Vector3<f64> {
        match &self.motion {
            Motion::Dynamic { velocity, .. } => *velocity,
            _ => Vector3::zeros(),
        }
    }

    /// Mutable access to the velocity of a dynamic body.
    pub(crate) fn velocity_mut(&mut self) -> Option<&mut Vector3<f64>> {
        match &mut self.motion {
            Motion::Dynamic { velocity, .. } => Some(velocity),
            _ => None,
        }
    }

    /// Accumulate a force through the center of mass.
    ///
    /// Only dynamic bodies respond to forces; for the other disciplines this
    /// is silently ignored.
    pub(crate) fn apply_central_force(&mut self, force: Vector3<f64>) {
        if self.is_dynamic() {
            self.force += force;
            self.wake_up();
        }
    }

    /// Force a sleeping dynamic body back into the active set.
    pub(crate) fn wake_up(&mut self) {
        if self.activation == Activation::Sleeping && self.is_dynamic() {
            self.activation = Activation::Active;
        }
        self.sleep_time = 0.0;
    }

    pub(crate) fn put_to_sleep(&mut self) {
        if self.activation == Activation::Active {
            self.activation = Activation::Sleeping;
            if let Some(velocity) = self.velocity_mut() {
                *velocity = Vector3::zeros();
            }
        }
    }
}

impl Identified for Body {
    fn id(&self) -> EntityId {
        self.id
    }
}

/// A non-solid detection volume owned by the world.
///
/// Ghosts report which solid bodies overlap them but exert no forces and
/// never move on their own.
#[derive(Debug)]
pub struct Ghost {
    id: EntityId,
    shape: Shape,
    pub(crate) pose: Pose,
}

impl Ghost {
    pub(crate) const fn new(id: EntityId, shape: Shape, pose: Pose) -> Self {
        Self { id, shape, pose }
    }

    /// Caller-assigned identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Detection shape.
    #[must_use]
    pub const fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Current pose.
    #[must_use]
    pub const fn pose(&self) -> Pose {
        self.pose
    }
}

impl Identified for Ghost {
    fn id(&self) -> EntityId {
        self.id
    }
}
