//! The simulation world: entity lifecycle, stepping, queries.

use nalgebra::{Point3, UnitQuaternion, Vector3};
use phys_types::{
    ContactPair, EntityId, GhostOverlap, Pose, Shape, WorldConfig, WorldError,
};
use tracing::{debug, trace};

use crate::body::{Activation, Body, Ghost, Motion};
use crate::broad_phase::Aabb;
use crate::engine::DiscreteEngine;
use crate::raycast::raycast_shape;
use crate::registry::{Arena, BodyHandle, GhostHandle};

/// Result of a point ray query.
///
/// On a miss, `id` is [`EntityId::NONE`] and `point` is the origin of world
/// space, so a miss is distinguishable without an `Option` at the boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayCastResult {
    /// Identifier of the closest hit body, or [`EntityId::NONE`].
    pub id: EntityId,
    /// World-space hit point; zero on a miss.
    pub point: Point3<f64>,
}

impl RayCastResult {
    /// The canonical miss value.
    #[must_use]
    pub fn miss() -> Self {
        Self {
            id: EntityId::NONE,
            point: Point3::origin(),
        }
    }

    /// Whether the query hit anything.
    #[must_use]
    pub fn is_hit(&self) -> bool {
        self.id != EntityId::NONE
    }
}

/// A discrete simulation world owning rigid bodies and ghost volumes.
///
/// Entities are created with caller-assigned [`EntityId`]s and addressed by
/// handles afterwards. [`update`](World::update) advances the simulation and
/// returns the rigid/rigid contact pairs of the step; ghost overlaps are
/// retained on the world and polled with
/// [`ghost_overlaps`](World::ghost_overlaps).
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    engine: DiscreteEngine,
    bodies: Arena<Body>,
    ghosts: Arena<Ghost>,
    ghost_overlaps: Vec<GhostOverlap>,
}

impl World {
    /// Create a world from a validated configuration.
    pub fn new(config: WorldConfig) -> Result<Self, WorldError> {
        config.validate()?;
        debug!(gravity = ?config.gravity, substeps = config.substeps, "world created");
        Ok(Self {
            engine: DiscreteEngine::new(config.gravity),
            config,
            bodies: Arena::new("body"),
            ghosts: Arena::new("ghost"),
            ghost_overlaps: Vec::new(),
        })
    }

    /// Create a world with the default configuration.
    pub fn with_defaults() -> Result<Self, WorldError> {
        Self::new(WorldConfig::default())
    }

    /// The configuration this world was built with.
    #[must_use]
    pub const fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Current gravity vector.
    #[must_use]
    pub const fn gravity(&self) -> Vector3<f64> {
        self.engine.gravity()
    }

    /// Replace the gravity applied to dynamic bodies from the next update on.
    pub fn set_gravity(&mut self, gravity: Vector3<f64>) {
        self.engine.set_gravity(gravity);
    }

    /// Start building an entity fluently.
    #[must_use]
    pub fn build_object(&mut self) -> ObjectBuilder<'_> {
        ObjectBuilder::new(self)
    }

    // --- creation ---------------------------------------------------------

    /// Create an immovable body.
    pub fn create_static_body(
        &mut self,
        id: EntityId,
        shape: Shape,
        pose: Pose,
    ) -> Result<BodyHandle, WorldError> {
        self.insert_body(id, shape, pose, Motion::Static)
    }

    /// Create a caller-driven body.
    ///
    /// The world never integrates it; it moves only through
    /// [`set_body_position`](Self::set_body_position) and
    /// [`set_body_orientation`](Self::set_body_orientation).
    pub fn create_kinematic_body(
        &mut self,
        id: EntityId,
        shape: Shape,
        pose: Pose,
    ) -> Result<BodyHandle, WorldError> {
        self.insert_body(id, shape, pose, Motion::Kinematic { target: pose })
    }

    /// Create a fully simulated body.
    pub fn create_dynamic_body(
        &mut self,
        id: EntityId,
        shape: Shape,
        pose: Pose,
        mass: f64,
    ) -> Result<BodyHandle, WorldError> {
        if !(mass > 0.0) || !mass.is_finite() {
            return Err(WorldError::InvalidMass(mass));
        }
        let inertia = shape.local_inertia(mass);
        self.insert_body(
            id,
            shape,
            pose,
            Motion::Dynamic {
                velocity: Vector3::zeros(),
                mass,
                inv_mass: 1.0 / mass,
                inertia,
            },
        )
    }

    /// Create a non-solid detection volume.
    pub fn create_ghost(
        &mut self,
        id: EntityId,
        shape: Shape,
        pose: Pose,
    ) -> Result<GhostHandle, WorldError> {
        id.ensure_assignable()?;
        let handle = self.ghosts.insert(Ghost::new(id, shape, pose));
        debug!(%id, index = handle.index(), "ghost created");
        Ok(GhostHandle(handle))
    }

    fn insert_body(
        &mut self,
        id: EntityId,
        shape: Shape,
        pose: Pose,
        motion: Motion,
    ) -> Result<BodyHandle, WorldError> {
        id.ensure_assignable()?;
        let handle = self.bodies.insert(Body::new(id, shape, pose, motion));
        debug!(%id, index = handle.index(), "body created");
        Ok(BodyHandle(handle))
    }

    // --- removal ----------------------------------------------------------

    /// Remove a body. The handle is invalid afterwards.
    pub fn remove_body(&mut self, handle: BodyHandle) -> Result<(), WorldError> {
        let body = self.bodies.remove(handle.0)?;
        debug!(id = %body.id(), "body removed");
        Ok(())
    }

    /// Remove a ghost volume and scrub its pending overlap reports.
    ///
    /// Overlaps collected during the previous update must not name an entity
    /// that no longer exists, so they are dropped here rather than waiting
    /// for the next update.
    pub fn remove_ghost(&mut self, handle: GhostHandle) -> Result<(), WorldError> {
        let ghost = self.ghosts.remove(handle.0)?;
        let id = ghost.id();
        self.ghost_overlaps.retain(|overlap| overlap.ghost != id);
        debug!(%id, "ghost removed");
        Ok(())
    }

    // --- stepping ---------------------------------------------------------

    /// Advance the simulation by `elapsed_ms` milliseconds.
    ///
    /// Returns the rigid/rigid contact pairs detected during the step and
    /// refreshes the retained ghost overlap list. A zero-length update still
    /// runs detection against the current poses.
    pub fn update(&mut self, elapsed_ms: f64) -> Vec<ContactPair> {
        let elapsed = elapsed_ms.max(0.0) / 1000.0;
        self.engine.step(&mut self.bodies, elapsed, &self.config);
        self.collect_ghost_overlaps();
        trace!(
            contacts = self.engine.contacts().len(),
            overlaps = self.ghost_overlaps.len(),
            "update complete"
        );
        self.engine.contacts().to_vec()
    }

    /// Ghost overlaps collected by the most recent update.
    ///
    /// Retained until the next update or until the involved ghost is
    /// removed.
    #[must_use]
    pub fn ghost_overlaps(&self) -> &[GhostOverlap] {
        &self.ghost_overlaps
    }

    /// Bound-volume overlap between every ghost and every body.
    ///
    /// A ghost and a body sharing one identifier are the same logical
    /// entity (a sensor riding its own body) and are not reported against
    /// each other.
    fn collect_ghost_overlaps(&mut self) {
        self.ghost_overlaps.clear();
        for ghost in self.ghosts.iter() {
            let ghost_box =
                Aabb::from_shape(ghost.shape(), &ghost.pose(), self.config.contact_margin);
            for body in self.bodies.iter() {
                if body.id() == ghost.id() {
                    continue;
                }
                let body_box = Aabb::from_shape(
                    body.shape(),
                    &body.current_pose(),
                    self.config.contact_margin,
                );
                if ghost_box.overlaps(&body_box) {
                    self.ghost_overlaps
                        .push(GhostOverlap::new(ghost.id(), body.id()));
                }
            }
        }
    }

    // --- queries ----------------------------------------------------------

    /// Identifier of the closest body hit by the segment, or
    /// [`EntityId::NONE`].
    ///
    /// Ghost volumes are transparent to rays.
    #[must_use]
    pub fn raycast(&self, origin: Point3<f64>, end: Point3<f64>) -> EntityId {
        self.raycast_point(origin, end).id
    }

    /// Closest hit with its world-space point, or the miss value.
    #[must_use]
    pub fn raycast_point(&self, origin: Point3<f64>, end: Point3<f64>) -> RayCastResult {
        let mut best: Option<(f64, RayCastResult)> = None;
        for body in self.bodies.iter() {
            let Some(hit) = raycast_shape(&origin, &end, body.shape(), &body.current_pose())
            else {
                continue;
            };
            if best.map_or(true, |(toi, _)| hit.toi < toi) {
                best = Some((
                    hit.toi,
                    RayCastResult {
                        id: body.id(),
                        point: hit.point,
                    },
                ));
            }
        }
        best.map_or_else(RayCastResult::miss, |(_, result)| result)
    }

    /// Shared access to a body.
    #[must_use]
    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle.0)
    }

    /// Shared access to a ghost volume.
    #[must_use]
    pub fn ghost(&self, handle: GhostHandle) -> Option<&Ghost> {
        self.ghosts.get(handle.0)
    }

    /// Find a body by its caller-assigned identifier.
    #[must_use]
    pub fn body_by_id(&self, id: EntityId) -> Option<&Body> {
        self.bodies.lookup(id)
    }

    /// Find a ghost by its caller-assigned identifier.
    #[must_use]
    pub fn ghost_by_id(&self, id: EntityId) -> Option<&Ghost> {
        self.ghosts.lookup(id)
    }

    /// Number of live bodies.
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of live ghost volumes.
    #[must_use]
    pub fn ghost_count(&self) -> usize {
        self.ghosts.len()
    }

    // --- mutation ---------------------------------------------------------

    /// Teleport a body to a new position.
    ///
    /// Kinematic bodies move through their target pose; static and dynamic
    /// bodies have their simulated pose rewritten directly. Dynamic bodies
    /// are woken so the new position takes part in the next step.
    pub fn set_body_position(
        &mut self,
        handle: BodyHandle,
        position: Point3<f64>,
    ) -> Result<(), WorldError> {
        let body = self.stale_checked_body(handle)?;
        match &mut body.motion {
            Motion::Kinematic { target } => target.position = position,
            _ => body.pose.position = position,
        }
        body.wake_up();
        Ok(())
    }

    /// Rotate a body to a new orientation.
    pub fn set_body_orientation(
        &mut self,
        handle: BodyHandle,
        rotation: UnitQuaternion<f64>,
    ) -> Result<(), WorldError> {
        let body = self.stale_checked_body(handle)?;
        match &mut body.motion {
            Motion::Kinematic { target } => target.rotation = rotation,
            _ => body.pose.rotation = rotation,
        }
        body.wake_up();
        Ok(())
    }

    /// Move a ghost volume.
    pub fn set_ghost_position(
        &mut self,
        handle: GhostHandle,
        position: Point3<f64>,
    ) -> Result<(), WorldError> {
        let ghost = self
            .ghosts
            .get_mut(handle.0)
            .ok_or(WorldError::stale_handle("ghost", handle.index()))?;
        ghost.pose.position = position;
        Ok(())
    }

    /// Accumulate a force through a body's center of mass for the next
    /// update.
    ///
    /// Static and kinematic bodies do not respond to forces; the call is
    /// accepted and ignored for them.
    pub fn apply_central_force(
        &mut self,
        handle: BodyHandle,
        force: Vector3<f64>,
    ) -> Result<(), WorldError> {
        self.stale_checked_body(handle)?.apply_central_force(force);
        Ok(())
    }

    /// Set the linear velocity of a dynamic body.
    ///
    /// Ignored for static and kinematic bodies.
    pub fn set_body_velocity(
        &mut self,
        handle: BodyHandle,
        velocity: Vector3<f64>,
    ) -> Result<(), WorldError> {
        let body = self.stale_checked_body(handle)?;
        let written = match body.velocity_mut() {
            Some(current) => {
                *current = velocity;
                true
            }
            None => false,
        };
        if written {
            body.wake_up();
        }
        Ok(())
    }

    /// Force a sleeping body back into the active set.
    pub fn activate(&mut self, handle: BodyHandle) -> Result<(), WorldError> {
        self.stale_checked_body(handle)?.wake_up();
        Ok(())
    }

    /// Put a dynamic body to sleep until a contact or the caller wakes it.
    pub fn deactivate(&mut self, handle: BodyHandle) -> Result<(), WorldError> {
        self.stale_checked_body(handle)?.put_to_sleep();
        Ok(())
    }

    /// Whether a dynamic body is currently asleep.
    #[must_use]
    pub fn is_sleeping(&self, handle: BodyHandle) -> bool {
        self.body(handle)
            .is_some_and(|body| body.activation() == Activation::Sleeping)
    }

    fn stale_checked_body(&mut self, handle: BodyHandle) -> Result<&mut Body, WorldError> {
        self.bodies
            .get_mut(handle.0)
            .ok_or(WorldError::stale_handle("body", handle.index()))
    }
}

/// Fluent entity construction.
///
/// ```
/// use phys_world::World;
/// use phys_types::{EntityId, Shape};
/// use nalgebra::Point3;
///
/// let mut world = World::with_defaults().unwrap();
/// let handle = world
///     .build_object()
///     .with_id(EntityId::new(7))
///     .with_shape(Shape::sphere(0.5).unwrap())
///     .at_position(Point3::new(0.0, 2.0, 0.0))
///     .with_mass(3.0)
///     .build_dynamic()
///     .unwrap();
/// assert!(world.body(handle).is_some());
/// ```
#[derive(Debug)]
pub struct ObjectBuilder<'w> {
    world: &'w mut World,
    id: Option<EntityId>,
    shape: Option<Shape>,
    position: Point3<f64>,
    rotation: UnitQuaternion<f64>,
    mass: f64,
}

impl<'w> ObjectBuilder<'w> {
    fn new(world: &'w mut World) -> Self {
        Self {
            world,
            id: None,
            shape: None,
            position: Point3::origin(),
            rotation: UnitQuaternion::identity(),
            mass: 1.0,
        }
    }

    /// Set the caller-assigned identifier. Required.
    #[must_use]
    pub fn with_id(mut self, id: EntityId) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the collision shape. Required.
    #[must_use]
    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = Some(shape);
        self
    }

    /// Set the initial position. Defaults to the origin.
    #[must_use]
    pub fn at_position(mut self, position: Point3<f64>) -> Self {
        self.position = position;
        self
    }

    /// Set the initial orientation. Defaults to identity.
    #[must_use]
    pub fn oriented(mut self, rotation: UnitQuaternion<f64>) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the mass for a dynamic build. Defaults to 1 kg.
    #[must_use]
    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    fn take_parts(self) -> Result<(&'w mut World, EntityId, Shape, Pose, f64), WorldError> {
        let id = self.id.ok_or(WorldError::IdNotProvided)?;
        let shape = self.shape.ok_or(WorldError::ShapeNotProvided)?;
        let pose = Pose::from_position_rotation(self.position, self.rotation);
        Ok((self.world, id, shape, pose, self.mass))
    }

    /// Build an immovable body.
    pub fn build_static(self) -> Result<BodyHandle, WorldError> {
        let (world, id, shape, pose, _) = self.take_parts()?;
        world.create_static_body(id, shape, pose)
    }

    /// Build a caller-driven body.
    pub fn build_kinematic(self) -> Result<BodyHandle, WorldError> {
        let (world, id, shape, pose, _) = self.take_parts()?;
        world.create_kinematic_body(id, shape, pose)
    }

    /// Build a fully simulated body.
    pub fn build_dynamic(self) -> Result<BodyHandle, WorldError> {
        let (world, id, shape, pose, mass) = self.take_parts()?;
        world.create_dynamic_body(id, shape, pose, mass)
    }

    /// Build a non-solid detection volume.
    pub fn build_ghost(self) -> Result<GhostHandle, WorldError> {
        let (world, id, shape, pose, _) = self.take_parts()?;
        world.create_ghost(id, shape, pose)
    }
}
