//! Discrete physics world layer.
//!
//! This crate owns the simulation: rigid bodies, ghost detection volumes,
//! fixed-sub-step stepping, collision reporting, and ray queries. It speaks
//! in the pure data types of [`phys_types`]; entities carry caller-assigned
//! [`EntityId`]s and every report echoes those values back.
//!
//! # Architecture
//!
//! - [`World`] - Entity lifecycle, stepping, queries. The only public entry
//!   point for most embedders.
//! - [`registry`] - Generational arenas; stale handles fail loudly instead
//!   of resolving to a slot's new occupant.
//! - [`body`] - Rigid bodies with a tagged motion discipline (static,
//!   kinematic, dynamic) and ghost volumes.
//! - [`broad_phase`] / [`narrow_phase`] - Bounding-box sweep and analytic
//!   contact generation for spheres and boxes.
//! - [`engine`] - Integration, contact resolution, sleep management.
//! - [`raycast`] - Segment intersection against posed shapes.
//!
//! # Example
//!
//! ```
//! use phys_world::World;
//! use phys_types::{EntityId, Pose, Shape};
//! use nalgebra::Point3;
//!
//! let mut world = World::with_defaults().unwrap();
//! let floor = Shape::box_shape(20.0, 1.0, 20.0).unwrap();
//! world
//!     .create_static_body(EntityId::new(1), floor, Pose::identity())
//!     .unwrap();
//! let ball = Shape::sphere(0.5).unwrap();
//! world
//!     .create_dynamic_body(
//!         EntityId::new(2),
//!         ball,
//!         Pose::from_position(Point3::new(0.0, 5.0, 0.0)),
//!         1.0,
//!     )
//!     .unwrap();
//!
//! // 16ms frames until the ball lands on the floor.
//! let mut contacts = Vec::new();
//! for _ in 0..120 {
//!     contacts = world.update(16.0);
//! }
//! assert!(contacts[0].matches(EntityId::new(1), EntityId::new(2)));
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::missing_errors_doc,       // Error docs added where non-obvious
    clippy::suboptimal_flops          // mul_add style changes aren't always clearer
)]

pub mod body;
pub mod broad_phase;
pub mod engine;
pub mod narrow_phase;
pub mod raycast;
pub mod registry;
mod world;

pub use body::{Activation, Body, Ghost, Motion};
pub use registry::{BodyHandle, GhostHandle};
pub use world::{ObjectBuilder, RayCastResult, World};

// Re-export the shared data types so embedders need only one dependency.
pub use phys_types::{
    ContactPair, EntityId, GhostOverlap, Pose, Shape, WorldConfig, WorldError,
};
